use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::chapter::*;
use crate::models::shared::{MessageResponse, parse_id};
use crate::services::ChapterService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/chapters",
    tag = "Chapters",
    operation_id = "createChapter",
    summary = "Append a chapter to a course",
    description = "Creates a chapter at the end of the course's sequence (`max(position) + 1`, or 1 for the first chapter).",
    params(("id" = String, Path, description = "Course ID (UUID)")),
    request_body = CreateChapterRequest,
    responses(
        (status = 201, description = "Chapter created", body = ChapterMutationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_chapter(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CreateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course_id = parse_id(&id, "course")?;
    let chapter = ChapterService::new(&state.db, &*state.views)
        .create_chapter(&auth_user, course_id, &payload.title)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChapterMutationResponse {
            message: "Chapter created!".into(),
            chapter: chapter.into(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}/chapters/reorder",
    tag = "Chapters",
    operation_id = "reorderChapters",
    summary = "Reorder the chapters of a course",
    description = "Applies a drag-and-drop result atomically. `list` must contain every chapter of the course once, with zero-based `position` values forming 0..n; each chapter is stored at `position + 1`.",
    params(("id" = String, Path, description = "Course ID (UUID)")),
    request_body = ReorderChaptersRequest,
    responses(
        (status = 200, description = "Chapters reordered", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn reorder_chapters(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ReorderChaptersRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let course_id = parse_id(&id, "course")?;
    ChapterService::new(&state.db, &*state.views)
        .reorder_chapters(&auth_user, course_id, &payload.list)
        .await?;

    Ok(Json(MessageResponse::new("Chapters reordered!")))
}

#[utoipa::path(
    get,
    path = "/{id}/chapters/{chapter_id}",
    tag = "Chapters",
    operation_id = "getChapter",
    summary = "Get a chapter of a course",
    params(
        ("id" = String, Path, description = "Course ID (UUID)"),
        ("chapter_id" = String, Path, description = "Chapter ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Chapter", body = ChapterResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Chapter not in this course (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_chapter(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, chapter_id)): Path<(String, String)>,
) -> Result<Json<ChapterResponse>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let chapter_id = parse_id(&chapter_id, "chapter")?;
    let chapter = ChapterService::new(&state.db, &*state.views)
        .get_chapter(&auth_user, course_id, chapter_id)
        .await?;
    Ok(Json(chapter.into()))
}
