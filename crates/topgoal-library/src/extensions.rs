use std::path::Path;

use serde::{Deserialize, Serialize};

/// Audio containers admitted into the library.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SupportedExtension {
    Mp3,
    Wav,
    Flac,
    M4a,
    Ogg,
}

impl SupportedExtension {
    pub const ALL: &'static [SupportedExtension] = &[
        SupportedExtension::Mp3,
        SupportedExtension::Wav,
        SupportedExtension::Flac,
        SupportedExtension::M4a,
        SupportedExtension::Ogg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedExtension::Mp3 => "mp3",
            SupportedExtension::Wav => "wav",
            SupportedExtension::Flac => "flac",
            SupportedExtension::M4a => "m4a",
            SupportedExtension::Ogg => "ogg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SupportedExtension::Mp3 => "audio/mpeg",
            SupportedExtension::Wav => "audio/x-wav",
            SupportedExtension::Flac => "audio/flac",
            SupportedExtension::M4a => "audio/mp4",
            SupportedExtension::Ogg => "audio/ogg",
        }
    }

    /// Case-insensitive match on the end of the file name, so a file called
    /// just `.mp3` counts too.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl std::str::FromStr for SupportedExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('.').to_ascii_lowercase();
        SupportedExtension::ALL
            .iter()
            .find(|ext| ext.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Extension not supported: {}", s))
    }
}

impl std::fmt::Display for SupportedExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Enabled subset of [`SupportedExtension::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    enabled: Vec<SupportedExtension>,
}

impl ExtensionFilter {
    pub fn new(enabled: impl IntoIterator<Item = SupportedExtension>) -> Self {
        let mut unique = Vec::new();
        for ext in enabled {
            if !unique.contains(&ext) {
                unique.push(ext);
            }
        }
        ExtensionFilter { enabled: unique }
    }

    pub fn admit(&self, path: &Path) -> Option<SupportedExtension> {
        SupportedExtension::from_path(path).filter(|ext| self.enabled.contains(ext))
    }

    pub fn enabled(&self) -> &[SupportedExtension] {
        &self.enabled
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        ExtensionFilter::new(SupportedExtension::ALL.iter().copied())
    }
}
