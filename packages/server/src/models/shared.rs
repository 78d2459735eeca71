use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::error::AppError;

/// Upper bound for stored URLs (cover images and attachments).
pub const MAX_URL_LENGTH: usize = 2048;

/// Body of mutations that return nothing but a confirmation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Chapters reordered!")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validate a trimmed title (1-256 Unicode characters) and return it trimmed.
pub fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(title.to_string())
}

/// Parse a path identifier, reporting `name` in the validation message.
pub fn parse_id(raw: &str, name: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation(format!("Invalid {name} ID")))
}

/// Validate an absolute http(s) URL of bounded length.
pub fn validate_http_url(raw: &str, name: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "{name} must be 1-{MAX_URL_LENGTH} characters"
        )));
    }
    let url =
        Url::parse(raw).map_err(|_| AppError::Validation(format!("{name} is not a valid URL")))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(AppError::Validation(format!(
            "{name} must be an http or https URL"
        )));
    }
    Ok(url)
}
