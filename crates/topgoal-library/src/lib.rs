//! Music library indexing and byte-range delivery for TopGoal.
//!
//! [`Library`] holds the published [`LibraryIndex`] snapshot and rebuilds it
//! with a [`LibraryScanner`]. Tracks are addressed by a path-derived
//! [`TrackId`]; [`streaming::open_partial`] and [`CoverResolver`] serve their
//! bytes.

pub mod error;
pub mod extensions;
pub mod identity;
pub mod index;
pub mod metadata;
pub mod scanner;
pub mod streaming;
pub mod track;

pub use error::{LibraryError, StreamError};
pub use extensions::{ExtensionFilter, SupportedExtension};
pub use identity::TrackId;
pub use index::{Library, LibraryIndex};
pub use metadata::{CoverImage, CoverResolver, LoftyReader, MetadataExtractor, TagReader};
pub use scanner::{LibraryScanner, ScannerConfig};
pub use streaming::{ByteRange, PartialContent};
pub use track::Track;
