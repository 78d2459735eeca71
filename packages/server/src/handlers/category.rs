use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::category::CategoryResponse;
use crate::services::list_categories as load_categories;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List course categories",
    description = "Returns every category a course can be filed under, sorted by name. No authentication required.",
    responses(
        (status = 200, description = "Category options", body = Vec<CategoryResponse>),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = load_categories(&state.db).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}
