//! Hot reload of the settings file

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::{
    error::{ConfigError, Result},
    manager::SettingsStore,
};

/// Keeps a settings store in sync with its file until dropped
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl SettingsWatcher {
    /// Settings file being watched
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore {
    /// Reload this store whenever its settings file is created or modified
    ///
    /// The parent directory is watched rather than the file itself so editors
    /// that save by renaming a temp file are still noticed. A reload that
    /// fails to parse keeps the previous snapshot.
    pub fn watch(self: &Arc<Self>) -> Result<SettingsWatcher> {
        let path = self.path().ok_or(ConfigError::NotFound)?.to_path_buf();
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| ConfigError::Validation(format!("not a file: {}", path.display())))?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let store = Arc::downgrade(self);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "Settings watcher error");
                    return;
                }
            };

            if !(event.kind.is_create() || event.kind.is_modify()) {
                return;
            }
            if !event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()))
            {
                return;
            }

            let Some(store) = store.upgrade() else {
                return;
            };
            if let Err(e) = store.reload() {
                warn!(error = %e, "Keeping previous settings");
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %path.display(), "Watching settings file");

        Ok(SettingsWatcher {
            _watcher: watcher,
            path,
        })
    }
}
