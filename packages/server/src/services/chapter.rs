use std::collections::HashSet;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::cache::{ViewStore, course_view_path};
use crate::entity::chapter;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::chapter::{ChapterPosition, validate_reorder};
use crate::models::shared::validate_title;

use super::guard::{authorize_course, authorize_course_for_update};

/// Chapter sequence of a course: append, reorder, look up.
pub struct ChapterService<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
    views: &'a dyn ViewStore,
}

impl<'a, C: ConnectionTrait + TransactionTrait> ChapterService<'a, C> {
    pub fn new(conn: &'a C, views: &'a dyn ViewStore) -> Self {
        Self { conn, views }
    }

    /// Append a chapter at `max(position) + 1` (1 for an empty course).
    pub async fn create_chapter(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        title: &str,
    ) -> Result<chapter::Model, AppError> {
        let title = validate_title(title)?;

        let txn = self.conn.begin().await?;
        authorize_course_for_update(&txn, caller, course_id).await?;

        let position = next_position(&txn, course_id).await?;
        let now = Utc::now();
        let model = chapter::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(title),
            position: Set(position),
            course_id: Set(course_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        self.views.invalidate_path(&course_view_path(course_id));

        info!(%course_id, chapter_id = %model.id, position, "Created chapter");
        Ok(model)
    }

    /// Replace the chapter order of a course in one transaction.
    ///
    /// `list` must name every chapter of the course exactly once, with
    /// zero-based indexes forming `0..n`. Each chapter is stored at
    /// `index + 1`. Any failure leaves the previous order untouched.
    pub async fn reorder_chapters(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        list: &[ChapterPosition],
    ) -> Result<(), AppError> {
        validate_reorder(list)?;
        if list
            .iter()
            .any(|item| usize::try_from(item.position).map_or(true, |p| p >= list.len()))
        {
            return Err(AppError::Validation(format!(
                "Positions must be the indexes 0..{}",
                list.len()
            )));
        }

        let txn = self.conn.begin().await?;
        authorize_course_for_update(&txn, caller, course_id).await?;

        let existing: HashSet<Uuid> = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(course_id))
            .select_only()
            .column(chapter::Column::Id)
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?
            .into_iter()
            .collect();
        let submitted: HashSet<Uuid> = list.iter().map(|item| item.id).collect();
        if existing != submitted {
            return Err(AppError::Validation(
                "list must contain exactly the chapters currently in the course".into(),
            ));
        }

        let now = Utc::now();
        for item in list {
            let position = item
                .position
                .checked_add(1)
                .ok_or_else(|| AppError::Validation("Position overflow".into()))?;
            chapter::Entity::update_many()
                .col_expr(chapter::Column::Position, Expr::value(position))
                .col_expr(chapter::Column::UpdatedAt, Expr::value(now))
                .filter(chapter::Column::Id.eq(item.id))
                .filter(chapter::Column::CourseId.eq(course_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        self.views.invalidate_path(&course_view_path(course_id));

        info!(%course_id, chapters = list.len(), "Reordered chapters");
        Ok(())
    }

    /// A chapter of a course the caller owns.
    pub async fn get_chapter(
        &self,
        caller: &AuthUser,
        course_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<chapter::Model, AppError> {
        authorize_course(self.conn, caller, course_id).await?;

        chapter::Entity::find_by_id(chapter_id)
            .one(self.conn)
            .await?
            .filter(|chapter| chapter.course_id == course_id)
            .ok_or_else(|| AppError::NotFound("Chapter not found".into()))
    }
}

/// Position for a chapter appended to `course_id`.
async fn next_position<C: ConnectionTrait>(db: &C, course_id: Uuid) -> Result<i32, AppError> {
    let max_pos: Option<i32> = chapter::Entity::find()
        .filter(chapter::Column::CourseId.eq(course_id))
        .select_only()
        .column_as(chapter::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| AppError::Validation("Position overflow".into()))
}
