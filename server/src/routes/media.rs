use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use topgoal_library::streaming;
use tracing::warn;

use super::{AppState, find_track};
use crate::error::ApiError;

/// Always answers 206, with the whole file when no usable range was sent.
pub(super) async fn stream_track(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let snapshot = state.library.snapshot();
    let track = find_track(&snapshot, &id)?;
    let range = headers.get(header::RANGE).and_then(|value| value.to_str().ok());

    let content = streaming::open_partial(track, range).await?;

    let track_id = track.id;
    let content_range = content.content_range();
    let content_length = content.content_length();
    let body = content.body.inspect_err(move |e| {
        warn!(track = %track_id, error = %e, "el stream se cortó a mitad del cuerpo");
    });

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_RANGE, content_range)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CONTENT_TYPE, content.content_type)
        .body(Body::from_stream(body))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub(super) async fn cover(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let track = find_track(&state.library.snapshot(), &id)?.clone();
    let covers = Arc::clone(&state.covers);

    let image = tokio::task::spawn_blocking(move || covers.resolve(&track)).await?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
}
