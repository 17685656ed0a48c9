use axum::{Json, extract::State};
use serde::Serialize;
use topgoal_library::{Track, TrackId};
use topgoal_storage::TrackStats;

use super::AppState;
use crate::error::ApiError;

/// Public view of a track; the file path never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: f64,
    pub has_cover: bool,
    pub play_count: u64,
    pub finish_count: u64,
}

impl TrackSummary {
    fn new(track: &Track, stats: TrackStats) -> Self {
        TrackSummary {
            id: track.id,
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            duration: track.duration,
            has_cover: track.has_cover,
            play_count: stats.play_count,
            finish_count: stats.finish_count,
        }
    }

    fn sort_key(&self) -> (String, String, String) {
        (
            self.artist.to_lowercase(),
            self.album.to_lowercase(),
            self.title.to_lowercase(),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub message: &'static str,
    pub tracks: usize,
}

pub(super) async fn list_tracks(State(state): State<AppState>) -> Result<Json<Vec<TrackSummary>>, ApiError> {
    let snapshot = state.library.snapshot();
    let store = state.store.clone();
    let stats = tokio::task::spawn_blocking(move || store.all_stats()).await??;

    let mut tracks: Vec<TrackSummary> = snapshot
        .all()
        .map(|track| {
            let counters = stats.get(&track.id.to_hex()).copied().unwrap_or_default();
            TrackSummary::new(track, counters)
        })
        .collect();
    tracks.sort_by_cached_key(TrackSummary::sort_key);

    Ok(Json(tracks))
}

/// Runs a full rescan and waits for it.
pub(super) async fn scan(State(state): State<AppState>) -> Result<Json<ScanReport>, ApiError> {
    let index = state.library.rescan().await?;
    Ok(Json(ScanReport {
        message: "Scan completed",
        tracks: index.len(),
    }))
}
