use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that prevent an indexing pass from producing a snapshot.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("music directory {path} is not readable: {source}")]
    ScanIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("a library scan is already running")]
    ScanInProgress,

    #[error("could not build the scan worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("scan worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Per-file tag read failure. Never leaves the metadata module: the extractor
/// logs it and applies the fallbacks.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("tag read failed: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("track not found")]
    NotFound,

    #[error("requested range starts beyond the end of a {file_size} byte file")]
    RangeNotSatisfiable { file_size: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
