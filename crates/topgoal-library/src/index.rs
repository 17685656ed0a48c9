use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{Level, info, instrument, warn};

use crate::error::LibraryError;
use crate::identity::TrackId;
use crate::metadata::{LoftyReader, TagReader};
use crate::scanner::LibraryScanner;
use crate::track::Track;

/// Immutable result of one indexing pass.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: HashMap<TrackId, Track>,
}

impl LibraryIndex {
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let tracks = tracks.into_iter().map(|t| (t.id, t)).collect();
        LibraryIndex { tracks }
    }

    pub fn lookup(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Unordered.
    pub fn all(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TrackId> {
        self.tracks.keys()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Owns the published snapshot and serializes rescans of one root.
///
/// Readers grab an `Arc` with [`Library::snapshot`] and keep it for the whole
/// request. A rescan builds a new index off to the side and swaps the pointer
/// in one step, so nobody ever sees a half-built map.
pub struct Library<R = LoftyReader> {
    root: PathBuf,
    scanner: Arc<LibraryScanner<R>>,
    current: Arc<RwLock<Arc<LibraryIndex>>>,
    scanning: Arc<AsyncMutex<()>>,
}

impl<R> Library<R>
where
    R: TagReader + 'static,
{
    /// Starts out with an empty snapshot; call [`Library::rescan`] to fill it.
    pub fn new(root: impl Into<PathBuf>, scanner: LibraryScanner<R>) -> Self {
        Library {
            root: root.into(),
            scanner: Arc::new(scanner),
            current: Arc::new(RwLock::new(Arc::new(LibraryIndex::default()))),
            scanning: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot(&self) -> Arc<LibraryIndex> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.try_lock().is_err()
    }

    /// Rebuilds the index on the blocking pool and publishes it.
    ///
    /// Rejects the call with [`LibraryError::ScanInProgress`] while another
    /// rescan is running. On failure the previous snapshot stays published.
    ///
    /// The scan guard lives inside the blocking task: dropping this future
    /// does not stop the walk, and the root stays locked (and the result is
    /// still published) until it ends.
    #[instrument(level = Level::INFO, skip(self), fields(root = %self.root.display()))]
    pub async fn rescan(&self) -> Result<Arc<LibraryIndex>, LibraryError> {
        let guard = Arc::clone(&self.scanning)
            .try_lock_owned()
            .map_err(|_| LibraryError::ScanInProgress)?;

        let scanner = Arc::clone(&self.scanner);
        let current = Arc::clone(&self.current);
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            match scanner.scan(&root) {
                Ok(index) => {
                    let index = Arc::new(index);
                    publish(&current, Arc::clone(&index));
                    info!(root = %root.display(), tracks = index.len(), "snapshot publicado");
                    Ok(index)
                }
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "el escaneo falló, se mantiene el snapshot anterior");
                    Err(e)
                }
            }
        })
        .await?
    }
}

fn publish(current: &RwLock<Arc<LibraryIndex>>, index: Arc<LibraryIndex>) {
    let mut guard = current.write().unwrap_or_else(PoisonError::into_inner);
    *guard = index;
}
