use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use sha2::{Digest, Sha256};

/// Stable content identifier of a track, derived from its absolute path.
///
/// Same path, same id, in every process run. Moving or renaming the file
/// yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId([u8; 32]);

impl TrackId {
    /// Hashes the path with SHA-256.
    ///
    /// Paths that are not valid UTF-8 are converted lossily (invalid
    /// sequences become U+FFFD) so this never fails for a path the
    /// filesystem can hand us.
    pub fn generate(path: &Path) -> Self {
        let text = path.to_string_lossy();
        let digest = Sha256::digest(text.as_bytes());
        TrackId(digest.into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTrackId(pub String);

impl fmt::Display for InvalidTrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid track id: {}", self.0)
    }
}

impl std::error::Error for InvalidTrackId {}

impl FromStr for TrackId {
    type Err = InvalidTrackId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(s, &mut out).map_err(|_| InvalidTrackId(s.to_string()))?;
        Ok(TrackId(out))
    }
}

impl Serialize for TrackId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
