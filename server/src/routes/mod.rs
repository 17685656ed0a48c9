//! HTTP surface. Every handler works on the snapshot it grabbed at the start
//! of the request.

mod comments;
mod library;
mod media;
mod stats;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use topgoal_library::{CoverResolver, Library, LibraryIndex, Track, TrackId};
use topgoal_storage::StatsStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;

pub use library::{ScanReport, TrackSummary};

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
    pub store: Arc<StatsStore>,
    pub covers: Arc<CoverResolver>,
}

impl AppState {
    pub fn new(library: Library, store: StatsStore, covers: CoverResolver) -> Self {
        AppState {
            library: Arc::new(library),
            store: Arc::new(store),
            covers: Arc::new(covers),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/library", get(library::list_tracks))
        .route("/api/library/scan", post(library::scan))
        .route("/api/stream/{id}", get(media::stream_track))
        .route("/api/cover/{id}", get(media::cover))
        .route("/api/track/{id}/play", post(stats::record_play))
        .route("/api/track/{id}/finish", post(stats::record_finish))
        .route("/api/comments", get(comments::list).post(comments::create))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unparsable ids are just ids we do not know.
fn find_track<'a>(index: &'a LibraryIndex, id: &str) -> Result<&'a Track, ApiError> {
    let id: TrackId = id.parse().map_err(|_| ApiError::NotFound)?;
    index.lookup(&id).ok_or(ApiError::NotFound)
}
