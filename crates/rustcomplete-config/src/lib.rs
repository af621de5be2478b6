//! rustcomplete settings store
//!
//! Holds the tool paths and search paths every other rustcomplete component
//! reads. Settings come from an optional file (TOML, JSON or YAML by
//! extension) overridden by `RUSTCOMPLETE_*` environment variables, and are
//! reloaded wholesale whenever the file changes.

pub mod error;
pub mod manager;
pub mod types;
pub mod watcher;

pub use error::{ConfigError, Result};
pub use manager::{validate, SettingsStore, ENV_PREFIX};
pub use types::{Settings, DEFAULT_CARGO_BIN, DEFAULT_RACER_BIN, DEFAULT_TIMEOUT_MS};
pub use watcher::SettingsWatcher;
