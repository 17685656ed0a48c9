use serde::{Deserialize, Serialize};

/// Play / finish counters for one track id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackStats {
    pub play_count: u64,
    pub finish_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub nickname: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub nickname: String,
    pub content: String,
    /// ISO-8601, UTC.
    pub created_at: String,
}
