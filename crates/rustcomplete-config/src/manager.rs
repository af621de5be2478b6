//! Settings store implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    types::Settings,
};

/// Prefix for environment overrides, e.g. `RUSTCOMPLETE_RACER`
pub const ENV_PREFIX: &str = "RUSTCOMPLETE";

/// Owner of the current [`Settings`] snapshot
///
/// Built once at startup and handed to the components that need it. Every
/// change replaces the snapshot wholesale and is broadcast to subscribers.
pub struct SettingsStore {
    /// Settings file, `None` for purely in-memory stores
    path: Option<PathBuf>,
    /// Current snapshot
    current: RwLock<Arc<Settings>>,
    /// Change notification channel
    changes: watch::Sender<Arc<Settings>>,
}

impl SettingsStore {
    /// Create an in-memory store holding `settings`
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let (changes, _) = watch::channel(Arc::clone(&settings));
        Self {
            path: None,
            current: RwLock::new(settings),
            changes,
        }
    }

    /// Load settings from `path` layered under `RUSTCOMPLETE_*` environment variables
    ///
    /// A missing file is not an error; defaults fill every option not set.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = read_sources(Some(&path))?;
        let mut store = Self::new(settings);
        store.path = Some(path);
        Ok(store)
    }

    /// Load settings from [`SettingsStore::default_path`]
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Get default settings path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rustcomplete")
            .join("settings.toml")
    }

    /// Settings file backing this store, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current snapshot
    pub fn current(&self) -> Arc<Settings> {
        self.current.read().clone()
    }

    /// Receive every future snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<Settings>> {
        self.changes.subscribe()
    }

    /// Validate and install a new snapshot
    pub fn replace(&self, settings: Settings) -> Result<Arc<Settings>> {
        validate(&settings)?;

        let settings = Arc::new(settings);
        *self.current.write() = Arc::clone(&settings);
        self.changes.send_replace(Arc::clone(&settings));

        debug!(
            racer = %settings.racer,
            cargo = %settings.cargo,
            search_paths = ?settings.search_paths,
            timeout_ms = settings.timeout_ms,
            "Settings updated"
        );
        Ok(settings)
    }

    /// Rebuild the snapshot from its sources
    ///
    /// In-memory stores have no sources and keep their snapshot.
    pub fn reload(&self) -> Result<Arc<Settings>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(self.current());
        };

        let settings = read_sources(Some(path))?;
        info!(path = %path.display(), "Reloading settings");
        self.replace(settings)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Reject settings no component can work with
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be greater than 0".to_string(),
        ));
    }
    if settings.racer.trim().is_empty() {
        return Err(ConfigError::Validation(
            "racer executable must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn read_sources(path: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(":")
            .with_list_parse_key("search_paths"),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    validate(&settings)?;
    Ok(settings)
}
