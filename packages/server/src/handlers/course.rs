use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::shared::parse_id;
use crate::services::CourseService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Courses",
    operation_id = "createCourse",
    summary = "Create a new course",
    description = "Creates a course owned by the caller with only a title set. The response carries the new course ID to navigate to.",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CreateCourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = CourseService::new(&state.db, &*state.views)
        .create_course(&auth_user, &payload.title)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCourseResponse {
            message: "Course created successfully!".into(),
            id: course.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List the caller's courses",
    description = "Returns every course owned by the caller, newest first.",
    responses(
        (status = 200, description = "Courses owned by the caller", body = Vec<CourseResponse>),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_courses(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = CourseService::new(&state.db, &*state.views)
        .list_courses(&auth_user)
        .await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get a course with its chapters and attachments",
    description = "Returns the course edit view: course fields, chapters ordered by position, and attachments newest first. Only the owner may read it.",
    params(("id" = String, Path, description = "Course ID (UUID)")),
    responses(
        (status = 200, description = "Course details", body = CourseDetailResponse),
        (status = 400, description = "Malformed course ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseDetailResponse>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let view = CourseService::new(&state.db, &*state.views)
        .get_course(&auth_user, course_id)
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Courses",
    operation_id = "updateCourseField",
    summary = "Update one course field",
    description = "Changes exactly one of `title`, `description`, `price`, `category_id`, or `image_url`. Body shape: `{\"field\": \"price\", \"value\": 19.99}`. Re-submitting the same value is harmless.",
    params(("id" = String, Path, description = "Course ID (UUID)")),
    request_body = CourseField,
    responses(
        (status = 200, description = "Course updated", body = CourseMutationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CourseField>,
) -> Result<Json<CourseMutationResponse>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let course = CourseService::new(&state.db, &*state.views)
        .update_field(&auth_user, course_id, payload)
        .await?;

    Ok(Json(CourseMutationResponse {
        message: "Course updated!".into(),
        course: course.into(),
    }))
}
