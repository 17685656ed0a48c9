//! TopGoal server: settings, routing and the HTTP error mapping around the
//! library and storage crates.

pub mod config;
pub mod error;
pub mod routes;

pub use crate::config::{Settings, SettingsError};
pub use error::ApiError;
pub use routes::{AppState, router};

/// `RUST_LOG` falls back to this.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
