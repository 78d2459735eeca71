use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::chapter;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateChapterRequest {
    /// Chapter title (1-256 characters).
    #[schema(example = "Getting started")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ChapterResponse {
    pub id: Uuid,
    #[schema(example = "Getting started")]
    pub title: String,
    /// 1-based position within the course.
    #[schema(example = 1)]
    pub position: i32,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<chapter::Model> for ChapterResponse {
    fn from(m: chapter::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            position: m.position,
            course_id: m.course_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChapterMutationResponse {
    #[schema(example = "Chapter created!")]
    pub message: String,
    pub chapter: ChapterResponse,
}

/// One entry of a drag-and-drop result.
#[derive(Debug, Clone, Copy, Deserialize, utoipa::ToSchema)]
pub struct ChapterPosition {
    pub id: Uuid,
    /// Zero-based index in the new order. Stored as `position + 1`.
    #[schema(example = 0)]
    pub position: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReorderChaptersRequest {
    pub list: Vec<ChapterPosition>,
}

/// Validate a reorder batch: non-empty, unique ids, unique non-negative indexes.
///
/// Whether the batch covers exactly the course's chapters is checked against
/// the store inside the reorder transaction.
pub fn validate_reorder(list: &[ChapterPosition]) -> Result<(), AppError> {
    if list.is_empty() {
        return Err(AppError::Validation("Reorder list must not be empty".into()));
    }
    let mut ids = HashSet::with_capacity(list.len());
    let mut positions = HashSet::with_capacity(list.len());
    for item in list {
        if item.position < 0 {
            return Err(AppError::Validation("Position must be >= 0".into()));
        }
        if !ids.insert(item.id) {
            return Err(AppError::Validation(format!(
                "Duplicate chapter {} in reorder list",
                item.id
            )));
        }
        if !positions.insert(item.position) {
            return Err(AppError::Validation(format!(
                "Duplicate position {} in reorder list",
                item.position
            )));
        }
    }
    Ok(())
}
