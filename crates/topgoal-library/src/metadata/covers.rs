use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::track::Track;

/// Folder images we look for, in priority order.
pub const COVER_CANDIDATES: [&str; 4] = ["cover.jpg", "folder.jpg", "cover.png", "folder.png"];

/// Bundled fallback image.
pub const PLACEHOLDER_PNG: &[u8] = include_bytes!("../../assets/placeholder.png");

/// First existing cover candidate inside `folder`, without reading it.
pub fn find_folder_cover(folder: &Path) -> Option<PathBuf> {
    COVER_CANDIDATES
        .iter()
        .map(|name| folder.join(name))
        .find(|candidate| candidate.is_file())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

impl CoverImage {
    fn placeholder(bytes: &Bytes) -> Self {
        CoverImage {
            bytes: bytes.clone(),
            content_type: "image/png",
        }
    }
}

/// Turns the scan-time `has_cover` flag into image bytes.
///
/// Embedded pictures are only detected, never extracted: a track whose only
/// art is embedded resolves to the placeholder.
#[derive(Debug, Clone)]
pub struct CoverResolver {
    placeholder: Bytes,
}

impl CoverResolver {
    pub fn new() -> Self {
        CoverResolver {
            placeholder: Bytes::from_static(PLACEHOLDER_PNG),
        }
    }

    /// Uses the image at `path` as placeholder instead of the bundled one.
    pub fn with_placeholder_file(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(CoverResolver {
            placeholder: Bytes::from(data),
        })
    }

    /// Blocking: reads the cover file. Always yields an image.
    pub fn resolve(&self, track: &Track) -> CoverImage {
        if !track.has_cover {
            return CoverImage::placeholder(&self.placeholder);
        }

        let Some(candidate) = track.folder().and_then(find_folder_cover) else {
            debug!(track = %track.id, "sin imagen en la carpeta, se sirve el placeholder");
            return CoverImage::placeholder(&self.placeholder);
        };

        match std::fs::read(&candidate) {
            Ok(data) => CoverImage {
                bytes: Bytes::from(data),
                content_type: image_content_type(&candidate),
            },
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, "no se pudo leer la portada");
                CoverImage::placeholder(&self.placeholder)
            }
        }
    }
}

impl Default for CoverResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn image_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}
