use std::net::SocketAddr;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use topgoal_library::{ExtensionFilter, ScannerConfig, SupportedExtension};
use topgoal_storage::DB_FILE_NAME;

/// Points at an optional TOML settings file.
pub const CONFIG_FILE_VAR: &str = "TOPGOAL_CONFIG";
const ENV_PREFIX: &str = "TOPGOAL";

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Configuration parse error: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub scan_threads: usize,
    pub follow_links: bool,
    pub extensions: Vec<SupportedExtension>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        let scanner = ScannerConfig::default();
        LibrarySettings {
            scan_threads: scanner.threads,
            follow_links: scanner.follow_links,
            extensions: SupportedExtension::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub music_dir: PathBuf,
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    pub scan_on_startup: bool,
    /// Replaces the bundled cover placeholder.
    pub placeholder_path: Option<PathBuf>,
    pub library: LibrarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            music_dir: PathBuf::from("/music"),
            data_dir: PathBuf::from("/data"),
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            scan_on_startup: true,
            placeholder_path: None,
            library: LibrarySettings::default(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Layers, lowest first: defaults, the `TOPGOAL_CONFIG` file,
    /// `TOPGOAL__*` variables, then plain `MUSIC_DIR` / `DATA_DIR`.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(path) = vars.get(CONFIG_FILE_VAR) {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        let music_dir = vars.get("MUSIC_DIR").cloned();
        let data_dir = vars.get("DATA_DIR").cloned();

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("library.extensions")
                    .source(Some(vars)),
            )
            .set_override_option("music_dir", music_dir)?
            .set_override_option("data_dir", data_dir)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.library.scan_threads == 0 {
            return Err(SettingsError::Invalid {
                key: "library.scan_threads",
                reason: "must be at least 1",
            });
        }
        if self.library.extensions.is_empty() {
            return Err(SettingsError::Invalid {
                key: "library.extensions",
                reason: "at least one extension must be enabled",
            });
        }
        Ok(())
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            follow_links: self.library.follow_links,
            threads: self.library.scan_threads,
            extensions: ExtensionFilter::new(self.library.extensions.iter().copied()),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
