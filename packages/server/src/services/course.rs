use chrono::Utc;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::cache::{ViewStore, course_view_path};
use crate::entity::{attachment, category, chapter, course};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::course::{CourseDetailResponse, CourseField};
use crate::models::shared::validate_title;

use super::guard::authorize_course;

/// Course creation, single-field edits, and course reads.
pub struct CourseService<'a, C: ConnectionTrait> {
    conn: &'a C,
    views: &'a dyn ViewStore,
}

impl<'a, C: ConnectionTrait> CourseService<'a, C> {
    pub fn new(conn: &'a C, views: &'a dyn ViewStore) -> Self {
        Self { conn, views }
    }

    /// Create a course owned by `caller` with only a title set.
    pub async fn create_course(
        &self,
        caller: &AuthUser,
        title: &str,
    ) -> Result<course::Model, AppError> {
        let title = validate_title(title)?;

        let now = Utc::now();
        let model = course::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(caller.user_id.clone()),
            title: Set(title),
            description: Set(None),
            image_url: Set(None),
            price: Set(None),
            category_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(course_id = %model.id, owner = %caller.user_id, "Created course");
        Ok(model)
    }

    /// Apply one validated field change to a course the caller owns.
    pub async fn update_field(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        field: CourseField,
    ) -> Result<course::Model, AppError> {
        let field = field.validate()?;
        let existing = authorize_course(self.conn, caller, course_id).await?;

        if let CourseField::CategoryId(category_id) = &field {
            category::Entity::find_by_id(*category_id)
                .one(self.conn)
                .await?
                .ok_or_else(|| AppError::Validation("Category not found".into()))?;
        }

        let field_name = field.name();
        let mut active: course::ActiveModel = existing.into();
        field.apply(&mut active);
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        self.views.invalidate_path(&course_view_path(course_id));

        info!(%course_id, field = field_name, "Updated course field");
        Ok(model)
    }

    /// The caller's own courses, newest first.
    pub async fn list_courses(&self, caller: &AuthUser) -> Result<Vec<course::Model>, AppError> {
        let courses = course::Entity::find()
            .filter(course::Column::OwnerId.eq(&caller.user_id))
            .order_by_desc(course::Column::CreatedAt)
            .order_by_desc(course::Column::Id)
            .all(self.conn)
            .await?;
        Ok(courses)
    }

    /// Course edit page data. Served from the view cache when fresh.
    pub async fn get_course(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
    ) -> Result<CourseDetailResponse, AppError> {
        let path = course_view_path(course_id);
        // Taken before any store read so a concurrent invalidation wins.
        let generation = self.views.generation(&path);

        // Ownership is checked even for cached views.
        let course = authorize_course(self.conn, caller, course_id).await?;

        if let Some(view) = self.views.get(&path) {
            return Ok(view);
        }

        let chapters = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(course_id))
            .order_by_asc(chapter::Column::Position)
            .all(self.conn)
            .await?;

        let attachments = attachment::Entity::find()
            .filter(attachment::Column::CourseId.eq(course_id))
            .order_by_desc(attachment::Column::CreatedAt)
            .order_by_desc(attachment::Column::Id)
            .all(self.conn)
            .await?;

        let view = CourseDetailResponse {
            course: course.into(),
            chapters: chapters.into_iter().map(Into::into).collect(),
            attachments: attachments.into_iter().map(Into::into).collect(),
        };
        self.views.put(path, view.clone(), generation);

        Ok(view)
    }
}

/// Category options, alphabetically.
pub async fn list_categories<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<category::Model>, AppError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    Ok(categories)
}
