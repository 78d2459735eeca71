use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::course;
use crate::error::AppError;

use super::attachment::AttachmentResponse;
use super::chapter::ChapterResponse;
use super::shared::{validate_http_url, validate_title};

/// Upper bound for course descriptions, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    /// Course title (1-256 characters).
    #[schema(example = "Advanced Web Development")]
    pub title: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateCourseResponse {
    #[schema(example = "Course created successfully!")]
    pub message: String,
    /// ID of the new course.
    pub id: Uuid,
}

/// A single course field change. Exactly one field is touched per request.
///
/// Wire form: `{"field": "price", "value": 19.99}`.
#[derive(Debug, Clone, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CourseField {
    Title(String),
    Description(String),
    Price(f64),
    CategoryId(i32),
    ImageUrl(String),
}

impl CourseField {
    /// Column name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CourseField::Title(_) => "title",
            CourseField::Description(_) => "description",
            CourseField::Price(_) => "price",
            CourseField::CategoryId(_) => "category_id",
            CourseField::ImageUrl(_) => "image_url",
        }
    }

    /// Check the value against its field's rules and return it normalized.
    ///
    /// Category existence needs the store and is checked by the service.
    pub fn validate(self) -> Result<Self, AppError> {
        match self {
            CourseField::Title(title) => Ok(CourseField::Title(validate_title(&title)?)),
            CourseField::Description(text) => {
                if text.chars().count() > MAX_DESCRIPTION_LENGTH {
                    return Err(AppError::Validation(format!(
                        "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
                    )));
                }
                Ok(CourseField::Description(text))
            }
            CourseField::Price(price) => {
                if !price.is_finite() || price < 0.0 {
                    return Err(AppError::Validation(
                        "Price must be a non-negative number".into(),
                    ));
                }
                Ok(CourseField::Price(price))
            }
            CourseField::CategoryId(id) => {
                if id <= 0 {
                    return Err(AppError::Validation("Invalid category ID".into()));
                }
                Ok(CourseField::CategoryId(id))
            }
            CourseField::ImageUrl(url) => {
                let url = validate_http_url(&url, "Image URL")?;
                Ok(CourseField::ImageUrl(url.to_string()))
            }
        }
    }

    /// Copy this value onto `active`, leaving every other column unchanged.
    pub fn apply(self, active: &mut course::ActiveModel) {
        use sea_orm::Set;
        match self {
            CourseField::Title(title) => active.title = Set(title),
            CourseField::Description(text) => active.description = Set(Some(text)),
            CourseField::Price(price) => active.price = Set(Some(price)),
            CourseField::CategoryId(id) => active.category_id = Set(Some(id)),
            CourseField::ImageUrl(url) => active.image_url = Set(Some(url)),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    #[schema(example = "Advanced Web Development")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "https://utfs.io/f/cover.png")]
    pub image_url: Option<String>,
    #[schema(example = 19.99)]
    pub price: Option<f64>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(m: course::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image_url: m.image_url,
            price: m.price,
            category_id: m.category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseMutationResponse {
    #[schema(example = "Course updated!")]
    pub message: String,
    pub course: CourseResponse,
}

/// Everything the course edit page shows.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    /// Ordered by position.
    pub chapters: Vec<ChapterResponse>,
    /// Newest first.
    pub attachments: Vec<AttachmentResponse>,
}
