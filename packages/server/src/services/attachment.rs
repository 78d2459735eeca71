use chrono::Utc;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::cache::{ViewStore, course_view_path};
use crate::entity::attachment;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::attachment::parse_attachment_url;

use super::guard::authorize_course;

/// File references attached to a course.
pub struct AttachmentService<'a, C: ConnectionTrait> {
    conn: &'a C,
    views: &'a dyn ViewStore,
}

impl<'a, C: ConnectionTrait> AttachmentService<'a, C> {
    pub fn new(conn: &'a C, views: &'a dyn ViewStore) -> Self {
        Self { conn, views }
    }

    /// Record an uploaded file's URL against a course the caller owns.
    pub async fn create_attachment(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        url: &str,
    ) -> Result<attachment::Model, AppError> {
        let (url, name) = parse_attachment_url(url)?;
        authorize_course(self.conn, caller, course_id).await?;

        let now = Utc::now();
        let model = attachment::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
            url: Set(url.to_string()),
            course_id: Set(course_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        self.views.invalidate_path(&course_view_path(course_id));

        info!(%course_id, attachment_id = %model.id, name = %model.name, "Created attachment");
        Ok(model)
    }

    /// Remove an attachment, provided it belongs to `course_id` and the
    /// caller owns that course.
    pub async fn delete_attachment(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<(), AppError> {
        authorize_course(self.conn, caller, course_id).await?;

        let existing = attachment::Entity::find_by_id(attachment_id)
            .one(self.conn)
            .await?
            .filter(|a| a.course_id == course_id)
            .ok_or_else(|| AppError::NotFound("Attachment not found".into()))?;

        attachment::Entity::delete_many()
            .filter(attachment::Column::Id.eq(existing.id))
            .filter(attachment::Column::CourseId.eq(course_id))
            .exec(self.conn)
            .await?;

        self.views.invalidate_path(&course_view_path(course_id));

        info!(%course_id, %attachment_id, "Deleted attachment");
        Ok(())
    }
}
