mod range;

use std::io::SeekFrom;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{Level, debug, instrument};

use crate::error::StreamError;
use crate::track::Track;

pub use range::ByteRange;

/// Upper bound for a single body chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

pub type ChunkStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// A resolved span of a track's file, ready to be sent as 206 content.
pub struct PartialContent {
    pub range: ByteRange,
    pub file_size: u64,
    pub content_type: &'static str,
    /// Lazily reads the span. Owns the file handle; dropping the stream
    /// closes it.
    pub body: ChunkStream,
}

impl PartialContent {
    pub fn content_length(&self) -> u64 {
        self.range.content_length()
    }

    pub fn content_range(&self) -> String {
        self.range.content_range(self.file_size)
    }
}

impl std::fmt::Debug for PartialContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialContent")
            .field("range", &self.range)
            .field("file_size", &self.file_size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Opens the track's file and prepares the requested span.
///
/// The file is opened per call and positioned at the span start; at most
/// `content_length` bytes are read, in chunks of up to [`CHUNK_SIZE`].
#[instrument(level = Level::DEBUG, skip_all, fields(track = %track.id))]
pub async fn open_partial(track: &Track, range_header: Option<&str>) -> Result<PartialContent, StreamError> {
    let file_size = tokio::fs::metadata(&track.path).await?.len();
    let range = ByteRange::resolve(range_header, file_size)?;

    let mut file = File::open(&track.path).await?;
    file.seek(SeekFrom::Start(range.start)).await?;

    debug!(start = range.start, end = range.end, file_size, "enviando rango");

    let body = ReaderStream::with_capacity(file.take(range.content_length()), CHUNK_SIZE);

    Ok(PartialContent {
        range,
        file_size,
        content_type: track.format.mime_type(),
        body: Box::pin(body),
    })
}
