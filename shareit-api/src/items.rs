use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shareit_core::ItemView;

use crate::error::AppError;
use crate::identity::Caller;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_owner_items))
        .route("/items/{item_id}", get(get_item))
        .route("/items/{item_id}/comment-eligibility", get(comment_eligibility))
}

/// GET /items/{item_id}
/// The header is optional here; only the owner gets last/next bookings.
async fn get_item(
    State(state): State<AppState>,
    viewer: Option<Caller>,
    item_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ItemView>, AppError> {
    let Path(item_id) = item_id?;
    let viewer_id = viewer.map(|Caller(id)| id);
    let view = state.projection.project_item(item_id, viewer_id).await?;
    Ok(Json(view))
}

/// GET /items
async fn list_owner_items(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<Vec<ItemView>>, AppError> {
    let views = state.projection.project_owner_items(user_id).await?;
    Ok(Json(views))
}

/// GET /items/{item_id}/comment-eligibility
async fn comment_eligibility(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    item_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(item_id) = item_id?;
    state.engine.check_comment_eligibility(user_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
