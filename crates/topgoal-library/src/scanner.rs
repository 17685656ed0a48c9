use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{Level, debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::error::LibraryError;
use crate::extensions::{ExtensionFilter, SupportedExtension};
use crate::index::LibraryIndex;
use crate::metadata::{LoftyReader, MetadataExtractor, TagReader};
use crate::track::Track;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub follow_links: bool,
    /// Worker threads used for tag extraction.
    pub threads: usize,
    pub extensions: ExtensionFilter,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            follow_links: false,
            threads: num_cpus::get(),
            extensions: ExtensionFilter::default(),
        }
    }
}

/// Walks a music directory and builds a fresh [`LibraryIndex`].
///
/// Blocking; run it off the async worker threads.
pub struct LibraryScanner<R = LoftyReader> {
    config: ScannerConfig,
    extractor: MetadataExtractor<R>,
}

impl LibraryScanner<LoftyReader> {
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_reader(config, LoftyReader)
    }
}

impl<R: TagReader> LibraryScanner<R> {
    pub fn with_reader(config: ScannerConfig, reader: R) -> Self {
        LibraryScanner {
            config,
            extractor: MetadataExtractor::new(reader),
        }
    }

    /// Fails only when no snapshot can be produced at all (root unreadable,
    /// walk error). Broken files are logged and skipped.
    #[instrument(level = Level::INFO, skip_all, fields(root = %root.display()))]
    pub fn scan(&self, root: &Path) -> Result<LibraryIndex, LibraryError> {
        let started = Instant::now();

        let root = dunce::canonicalize(root).map_err(|source| LibraryError::ScanIo {
            path: root.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(LibraryError::ScanIo {
                path: root,
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let candidates = self.collect_candidates(&root)?;
        debug!(candidates = candidates.len(), "recorrido del directorio terminado");

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads.max(1))
            .thread_name(|i| format!("topgoal-scan-{i}"))
            .build()?;

        let tracks: Vec<Track> = pool.install(|| {
            candidates
                .into_par_iter()
                .filter_map(|(path, format)| self.index_file(path, format))
                .collect()
        });

        let index = LibraryIndex::from_tracks(tracks);
        info!(
            tracks = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "escaneo completado"
        );
        Ok(index)
    }

    fn collect_candidates(&self, root: &Path) -> Result<Vec<(PathBuf, SupportedExtension)>, LibraryError> {
        let mut found = Vec::new();

        for entry in WalkDir::new(root).follow_links(self.config.follow_links) {
            let entry = entry?;
            let path = entry.path();

            let Some(format) = self.config.extensions.admit(path) else {
                continue;
            };
            // Follows symlinked files; directories named like audio files drop out here.
            if !path.is_file() {
                continue;
            }

            found.push((path.to_path_buf(), format));
        }

        Ok(found)
    }

    /// Any panic while handling one file only costs that file.
    fn index_file(&self, path: PathBuf, format: SupportedExtension) -> Option<Track> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let meta = self.extractor.extract(&path, format);
            Track::new(path.clone(), format, meta)
        }));

        match outcome {
            Ok(track) => Some(track),
            Err(payload) => {
                warn!(
                    path = %path.display(),
                    reason = panic_message(payload.as_ref()),
                    "no se pudo indexar el archivo, se omite"
                );
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::metadata::{RawTags, UNKNOWN_ARTIST};
    use std::fs;
    use tempfile::tempdir;

    fn scanner() -> LibraryScanner {
        LibraryScanner::new(ScannerConfig {
            threads: 2,
            ..ScannerConfig::default()
        })
    }

    #[test]
    fn empty_directory_yields_empty_index() {
        let dir = tempdir().unwrap();
        let index = scanner().scan(dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn missing_root_is_a_scan_error() {
        let dir = tempdir().unwrap();
        let err = scanner().scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LibraryError::ScanIo { .. }));
    }

    #[test]
    fn file_as_root_is_a_scan_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(scanner().scan(&file), Err(LibraryError::ScanIo { .. })));
    }

    #[test]
    fn recurses_and_filters_extensions() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("top.MP3"), b"junk").unwrap();
        fs::write(nested.join("deep.flac"), b"junk").unwrap();
        fs::write(nested.join("notes.txt"), b"junk").unwrap();
        fs::create_dir(dir.path().join("fake.ogg")).unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 2);

        let mut titles: Vec<_> = index.all().map(|t| t.title.clone()).collect();
        titles.sort();
        assert_eq!(titles, vec!["deep", "top"]);
        assert!(index.all().all(|t| t.path.is_absolute()));
    }

    #[test]
    fn untagged_file_is_indexed_with_fallbacks() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("Some Album");
        fs::create_dir(&album).unwrap();
        fs::write(album.join("Intro.wav"), b"RIFF....garbage").unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        let track = index.all().next().unwrap();
        assert_eq!(track.title, "Intro");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.album, "Some Album");
        assert_eq!(track.duration, 0.0);
    }

    #[test]
    fn dot_only_name_is_indexed_under_its_full_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".mp3"), b"x").unwrap();

        let index = scanner().scan(dir.path()).unwrap();
        assert_eq!(index.len(), 1);
        let track = index.all().next().unwrap();
        assert_eq!(track.title, ".mp3");
        assert_eq!(track.format, SupportedExtension::Mp3);
    }

    struct PanicsOn(&'static str);

    impl TagReader for PanicsOn {
        fn read(&self, path: &Path, _: SupportedExtension) -> Result<RawTags, MetadataError> {
            if path.file_stem().is_some_and(|s| s == self.0) {
                panic!("decoder blew up");
            }
            Ok(RawTags::default())
        }
    }

    #[test]
    fn panicking_file_is_skipped_others_survive() {
        let dir = tempdir().unwrap();
        for name in ["one.mp3", "bad.mp3", "two.ogg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let scanner = LibraryScanner::with_reader(ScannerConfig::default(), PanicsOn("bad"));
        let index = scanner.scan(dir.path()).unwrap();

        let mut titles: Vec<_> = index.all().map(|t| t.title.clone()).collect();
        titles.sort();
        assert_eq!(titles, vec!["one", "two"]);
    }
}
