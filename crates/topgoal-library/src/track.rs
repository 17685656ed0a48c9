use std::path::{Path, PathBuf};

use crate::extensions::SupportedExtension;
use crate::identity::TrackId;
use crate::metadata::ExtractedMetadata;

/// One indexed audio file. Built during a scan and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Seconds, `0.0` when the container does not report a length.
    pub duration: f64,
    /// Absolute path on disk. Stays on the server side.
    pub path: PathBuf,
    pub has_cover: bool,
    pub format: SupportedExtension,
}

impl Track {
    pub fn new(path: PathBuf, format: SupportedExtension, meta: ExtractedMetadata) -> Self {
        Track {
            id: TrackId::generate(&path),
            title: meta.title,
            artist: meta.artist,
            album: meta.album,
            duration: meta.duration,
            path,
            has_cover: meta.has_cover,
            format,
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.path.parent()
    }
}
