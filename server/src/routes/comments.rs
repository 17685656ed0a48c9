use axum::{Json, extract::State};
use topgoal_storage::{Comment, NewComment};

use super::AppState;
use crate::error::ApiError;

pub(super) async fn list(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, ApiError> {
    let store = state.store.clone();
    let comments = tokio::task::spawn_blocking(move || store.comments()).await??;
    Ok(Json(comments))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Json(comment): Json<NewComment>,
) -> Result<Json<Comment>, ApiError> {
    let store = state.store.clone();
    let stored = tokio::task::spawn_blocking(move || store.create_comment(comment)).await??;
    Ok(Json(stored))
}
