use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use topgoal_storage::StatsStore;

use super::{AppState, find_track};
use crate::error::ApiError;

pub(super) async fn record_play(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    bump(state, &id, StatsStore::increment_play).await
}

pub(super) async fn record_finish(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    bump(state, &id, StatsStore::increment_finish).await
}

async fn bump(
    state: AppState,
    id: &str,
    counter: fn(&StatsStore, &str) -> Result<(), topgoal_storage::StorageError>,
) -> Result<Json<Value>, ApiError> {
    let file_id = find_track(&state.library.snapshot(), id)?.id.to_hex();
    let store = state.store.clone();

    let stats = tokio::task::spawn_blocking(move || {
        counter(&store, &file_id)?;
        store.stats(&file_id)
    })
    .await??;

    Ok(Json(json!({
        "status": "ok",
        "play_count": stats.play_count,
        "finish_count": stats.finish_count,
    })))
}
