use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::attachment::{
    AttachmentMutationResponse, AttachmentResponse, CreateAttachmentRequest,
};
use crate::models::shared::{MessageResponse, parse_id};
use crate::services::AttachmentService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/attachments",
    tag = "Attachments",
    operation_id = "createAttachment",
    summary = "Attach an uploaded file to a course",
    description = "Records the URL produced by the file host. The attachment name is the URL's final path segment.",
    params(("id" = String, Path, description = "Course ID (UUID)")),
    request_body = CreateAttachmentRequest,
    responses(
        (status = 201, description = "Attachment created", body = AttachmentMutationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_attachment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CreateAttachmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course_id = parse_id(&id, "course")?;
    let attachment = AttachmentService::new(&state.db, &*state.views)
        .create_attachment(&auth_user, course_id, &payload.url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AttachmentMutationResponse {
            message: "Attachment created!".into(),
            attachment: AttachmentResponse::from(attachment),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}/attachments/{attachment_id}",
    tag = "Attachments",
    operation_id = "deleteAttachment",
    summary = "Delete an attachment",
    description = "Removes the attachment record. The attachment must belong to the course in the path.",
    params(
        ("id" = String, Path, description = "Course ID (UUID)"),
        ("attachment_id" = String, Path, description = "Attachment ID (UUID)"),
    ),
    responses(
        (status = 200, description = "Attachment deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthenticated (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner, or no such course (UNAUTHORIZED)", body = ErrorBody),
        (status = 404, description = "Attachment not in this course (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_attachment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, attachment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let attachment_id = parse_id(&attachment_id, "attachment")?;
    AttachmentService::new(&state.db, &*state.views)
        .delete_attachment(&auth_user, course_id, attachment_id)
        .await?;

    Ok(Json(MessageResponse::new("Attachment deleted!")))
}
