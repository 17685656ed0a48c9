pub mod covers;

use std::borrow::Cow;
use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;
use tracing::warn;

use crate::error::MetadataError;
use crate::extensions::SupportedExtension;

pub use covers::{COVER_CANDIDATES, CoverImage, CoverResolver, find_folder_cover};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Whatever the container told us, before any fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<f64>,
    pub embedded_picture: bool,
}

/// Reads container tags for one file.
///
/// The scanner calls this from worker threads, so implementations must be
/// shareable. Returning an error is fine: the extractor falls back to
/// path-derived values.
pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path, format: SupportedExtension) -> Result<RawTags, MetadataError>;
}

/// `lofty` backed reader covering every [`SupportedExtension`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyReader;

impl TagReader for LoftyReader {
    fn read(&self, path: &Path, _format: SupportedExtension) -> Result<RawTags, MetadataError> {
        let tagged = Probe::open(path)?.guess_file_type()?.read()?;

        let duration = tagged.properties().duration().as_secs_f64();
        let embedded_picture = tagged.tags().iter().any(|tag| !tag.pictures().is_empty());

        let mut raw = RawTags {
            duration: Some(duration),
            embedded_picture,
            ..RawTags::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            raw.title = tag.title().map(Cow::into_owned);
            raw.artist = tag.artist().map(Cow::into_owned);
            raw.album = tag.album().map(Cow::into_owned);
        }

        Ok(raw)
    }
}

/// Normalized record stored on a [`crate::Track`]. Every string is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: f64,
    pub has_cover: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor<R = LoftyReader> {
    reader: R,
}

impl<R: TagReader> MetadataExtractor<R> {
    pub fn new(reader: R) -> Self {
        MetadataExtractor { reader }
    }

    /// Never fails: a broken container just means every fallback applies.
    pub fn extract(&self, path: &Path, format: SupportedExtension) -> ExtractedMetadata {
        let raw = match self.reader.read(path, format) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no se pudieron leer las etiquetas, se usan valores por defecto");
                RawTags::default()
            }
        };

        apply_fallbacks(path, raw)
    }
}

fn apply_fallbacks(path: &Path, raw: RawTags) -> ExtractedMetadata {
    let title = non_blank(raw.title).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    });

    let artist = non_blank(raw.artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let album = non_blank(raw.album).unwrap_or_else(|| {
        path.parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ALBUM.to_string())
    });

    let duration = raw
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(0.0);

    // Only existence is checked here; bytes are read per cover request.
    let has_cover = raw.embedded_picture || path.parent().and_then(find_folder_cover).is_some();

    ExtractedMetadata {
        title,
        artist,
        album,
        duration,
        has_cover,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
