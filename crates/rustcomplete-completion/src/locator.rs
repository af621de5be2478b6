//! Project source directory lookup via `cargo locate-project`
//!
//! racer finds a crate's own modules through `RUST_SRC_PATH`, so every request
//! for a file inside a cargo project adds `<project root>/src` to the search
//! path. Resolving it costs a cargo invocation, so outcomes are memoized per
//! file until the editor reloads that file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustcomplete_config::{Settings, SettingsStore};
use rustcomplete_process::{ProcessConfig, ProcessManager};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CompletionError, CompletionResult};

/// Outcome of a project source lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLookup {
    /// The project's `src` directory
    Found(PathBuf),
    /// cargo ran, but there is no usable source directory
    NotFound,
    /// cargo could not be run at all
    Failed,
}

impl SourceLookup {
    /// Resolved directory, if any
    pub fn source_dir(&self) -> Option<&Path> {
        match self {
            SourceLookup::Found(dir) => Some(dir),
            SourceLookup::NotFound | SourceLookup::Failed => None,
        }
    }
}

/// Memo of file path -> [`SourceLookup`]
///
/// An absent entry means "not looked up yet".
#[derive(Debug, Default)]
pub struct SourcePathCache {
    entries: RwLock<HashMap<PathBuf, SourceLookup>>,
}

impl SourcePathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file: &Path) -> Option<SourceLookup> {
        self.entries.read().get(file).cloned()
    }

    pub fn insert(&self, file: impl Into<PathBuf>, lookup: SourceLookup) {
        self.entries.write().insert(file.into(), lookup);
    }

    /// Forget the entry for `file`, returning what was cached
    pub fn invalidate(&self, file: &Path) -> Option<SourceLookup> {
        self.entries.write().remove(file)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Deserialize)]
struct LocateProject {
    root: String,
}

/// Resolves and caches project source directories
pub struct ProjectLocator {
    settings: Arc<SettingsStore>,
    cache: Arc<SourcePathCache>,
    processes: ProcessManager,
}

impl ProjectLocator {
    /// Create a locator reading the cargo path from `settings`
    pub fn new(settings: Arc<SettingsStore>, cache: Arc<SourcePathCache>) -> Self {
        Self {
            settings,
            cache,
            processes: ProcessManager::new(),
        }
    }

    /// Cache backing this locator
    pub fn cache(&self) -> &Arc<SourcePathCache> {
        &self.cache
    }

    /// Resolve the source directory of the project containing `file`
    ///
    /// With no cargo configured this is [`SourceLookup::Failed`] and nothing is
    /// cached. Otherwise a cached outcome is returned as-is, or cargo is run
    /// and its outcome cached.
    pub async fn resolve(&self, file: &Path) -> SourceLookup {
        let settings = self.settings.current();
        if !settings.has_cargo() {
            debug!("No cargo configured, skipping project lookup");
            return SourceLookup::Failed;
        }

        if let Some(cached) = self.cache.get(file) {
            return cached;
        }

        let lookup = match self.locate(&settings, file).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "Project lookup failed");
                SourceLookup::Failed
            }
        };

        debug!(file = %file.display(), lookup = ?lookup, "Resolved project source");
        self.cache.insert(file, lookup.clone());
        lookup
    }

    /// Drop the cached outcome for `file` (called when the editor reloads it)
    pub fn invalidate(&self, file: &Path) {
        if self.cache.invalidate(file).is_some() {
            debug!(file = %file.display(), "Invalidated project source");
        }
    }

    async fn locate(&self, settings: &Settings, file: &Path) -> CompletionResult<SourceLookup> {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let config = ProcessConfig::new(&settings.cargo)
            .args(["locate-project"])
            .working_dir(dir)
            .timeout_ms(settings.timeout_ms);

        let output = self
            .processes
            .run(config, b"")
            .await
            .map_err(CompletionError::from_process)?;

        if !output.success() {
            debug!(
                code = ?output.code(),
                timed_out = output.timed_out,
                stderr = %output.stderr_lossy().trim(),
                "cargo locate-project found no project"
            );
            return Ok(SourceLookup::NotFound);
        }

        match manifest_root(&output.stdout) {
            Ok(root) => Ok(source_dir_for_manifest(&root)),
            Err(e) => {
                debug!(error = %e, "Unexpected cargo locate-project output");
                Ok(SourceLookup::NotFound)
            }
        }
    }
}

/// Extract `root` from `cargo locate-project` JSON output
pub fn manifest_root(stdout: &[u8]) -> CompletionResult<PathBuf> {
    let located: LocateProject = serde_json::from_slice(stdout)?;
    Ok(PathBuf::from(located.root))
}

/// `<manifest dir>/src` if it exists as a directory
pub fn source_dir_for_manifest(manifest: &Path) -> SourceLookup {
    let candidate = manifest
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("src");

    if candidate.is_dir() {
        SourceLookup::Found(candidate)
    } else {
        SourceLookup::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_root() {
        let root = manifest_root(br#"{"root":"/proj/Cargo.toml"}"#).unwrap();
        assert_eq!(root, PathBuf::from("/proj/Cargo.toml"));

        assert!(manifest_root(br#"{"manifest":"/proj/Cargo.toml"}"#).is_err());
        assert!(manifest_root(br#"{"root":42}"#).is_err());
        assert!(manifest_root(b"error: could not find `Cargo.toml`").is_err());
    }

    #[test]
    fn test_source_dir_for_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");

        assert_eq!(source_dir_for_manifest(&manifest), SourceLookup::NotFound);

        std::fs::create_dir(dir.path().join("src")).unwrap();
        assert_eq!(
            source_dir_for_manifest(&manifest),
            SourceLookup::Found(dir.path().join("src"))
        );
    }

    #[test]
    fn test_cache_invalidation() {
        let cache = SourcePathCache::new();
        let file = Path::new("/proj/src/main.rs");
        assert!(cache.get(file).is_none());

        cache.insert(file, SourceLookup::Found(PathBuf::from("/proj/src")));
        assert_eq!(
            cache.get(file),
            Some(SourceLookup::Found(PathBuf::from("/proj/src")))
        );

        assert!(cache.invalidate(file).is_some());
        assert!(cache.get(file).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_no_cargo_is_failed_and_uncached() {
        let settings = Arc::new(SettingsStore::new(Settings {
            cargo: String::new(),
            ..Settings::default()
        }));
        let locator = ProjectLocator::new(settings, Arc::new(SourcePathCache::new()));

        let file = Path::new("/proj/src/main.rs");
        assert_eq!(locator.resolve(file).await, SourceLookup::Failed);
        assert!(locator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_missing_cargo_is_failed_and_cached() {
        let settings = Arc::new(SettingsStore::new(Settings {
            cargo: "definitely-not-cargo-9f3e".to_string(),
            ..Settings::default()
        }));
        let locator = ProjectLocator::new(settings, Arc::new(SourcePathCache::new()));
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.rs");

        assert_eq!(locator.resolve(&file).await, SourceLookup::Failed);
        assert_eq!(locator.cache().get(&file), Some(SourceLookup::Failed));
    }
}
