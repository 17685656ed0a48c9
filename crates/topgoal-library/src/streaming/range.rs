use tracing::debug;

use crate::error::StreamError;

/// Inclusive byte span of a file, always inside `0..file_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Resolves an optional `Range` header value against a file size.
    ///
    /// Only a single `bytes=<start>-<end>` span is understood. Anything else
    /// (missing header, other units, several spans, garbage, start after
    /// end) falls back to the whole file. An omitted start means 0, an
    /// omitted end means the last byte, and `end` is clamped to the file.
    /// A start at or past the end of the file cannot be served.
    pub fn resolve(header: Option<&str>, file_size: u64) -> Result<Self, StreamError> {
        if file_size == 0 {
            return Err(StreamError::RangeNotSatisfiable { file_size });
        }
        let last = file_size - 1;

        let (start, end) = match header.map(parse_span) {
            Some(Some(span)) => span,
            Some(None) => {
                debug!(header = ?header, "cabecera Range inválida, se sirve el archivo completo");
                (None, None)
            }
            None => (None, None),
        };

        let start = start.unwrap_or(0);
        let end = end.unwrap_or(last).min(last);

        if start > last {
            return Err(StreamError::RangeNotSatisfiable { file_size });
        }

        Ok(ByteRange { start, end })
    }

    /// Never zero.
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

/// `Some((start, end))` for a well-formed single span, `None` otherwise.
fn parse_span(header: &str) -> Option<(Option<u64>, Option<u64>)> {
    let span = header.trim().strip_prefix("bytes=")?;
    let (start, end) = span.split_once('-')?;

    let start = parse_bound(start)?;
    let end = parse_bound(end)?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return None;
        }
    }

    Some((start, end))
}

/// Empty is a valid (omitted) bound; anything non-numeric is not.
fn parse_bound(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse().ok().map(Some)
}
