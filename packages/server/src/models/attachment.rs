use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::entity::attachment;
use crate::error::AppError;

use super::shared::validate_http_url;

/// Request body for attaching an uploaded file to a course.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAttachmentRequest {
    /// URL returned by the file host after upload.
    #[schema(example = "https://utfs.io/f/syllabus.pdf")]
    pub url: String,
}

/// Response DTO for a single attachment.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AttachmentResponse {
    pub id: Uuid,
    /// Display name derived from the URL.
    #[schema(example = "syllabus.pdf")]
    pub name: String,
    #[schema(example = "https://utfs.io/f/syllabus.pdf")]
    pub url: String,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(model: attachment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            course_id: model.course_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttachmentMutationResponse {
    #[schema(example = "Attachment created!")]
    pub message: String,
    pub attachment: AttachmentResponse,
}

/// Validate an attachment URL and derive its display name.
///
/// The name is the final path segment, so the URL must point at a file
/// rather than a directory.
pub fn parse_attachment_url(raw: &str) -> Result<(Url, String), AppError> {
    let url = validate_http_url(raw, "Attachment URL")?;
    let name = attachment_name(&url)
        .ok_or_else(|| AppError::Validation("Attachment URL must point to a file".into()))?;
    Ok((url, name))
}

/// Final non-empty path segment of `url`, if any.
pub fn attachment_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
