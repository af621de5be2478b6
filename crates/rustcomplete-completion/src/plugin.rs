//! Plugin lifecycle: everything an editor needs, built once at startup

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rustcomplete_config::{SettingsStore, SettingsWatcher};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::info;

use crate::definition::GotoDefinition;
use crate::error::CompletionResult;
use crate::host::EditorHost;
use crate::locator::{ProjectLocator, SourcePathCache};
use crate::runner::RacerRunner;
use crate::session::{CompletionList, CompletionSession};
use crate::types::{BufferSnapshot, ViewId};

/// Owns the settings store, the source path cache and the request handlers
///
/// # Example
///
/// ```ignore
/// let settings = Arc::new(SettingsStore::load_default()?);
/// let plugin = Plugin::new(settings, Arc::new(MyEditor::new()), runtime.handle().clone());
/// plugin.watch_settings()?;
///
/// // editor hooks
/// let list = plugin.on_query_completions(&snapshot);
/// plugin.goto_definition(&snapshot);
/// plugin.on_load(Path::new("/proj/src/main.rs"));
///
/// plugin.shutdown();
/// ```
pub struct Plugin<H: EditorHost> {
    settings: Arc<SettingsStore>,
    locator: Arc<ProjectLocator>,
    completions: Arc<CompletionSession<H>>,
    definitions: GotoDefinition<H>,
    watcher: Mutex<Option<SettingsWatcher>>,
}

impl<H: EditorHost> Plugin<H> {
    /// Wire up every component; background work runs on `handle`
    pub fn new(settings: Arc<SettingsStore>, host: Arc<H>, handle: Handle) -> Self {
        let cache = Arc::new(SourcePathCache::new());
        let locator = Arc::new(ProjectLocator::new(Arc::clone(&settings), cache));
        let runner = RacerRunner::new(Arc::clone(&settings), Arc::clone(&locator), handle);

        Self {
            settings,
            locator,
            completions: Arc::new(CompletionSession::new(Arc::clone(&host), runner.clone())),
            definitions: GotoDefinition::new(host, runner),
            watcher: Mutex::new(None),
        }
    }

    /// Reload settings whenever the settings file changes
    pub fn watch_settings(&self) -> CompletionResult<()> {
        let watcher = self.settings.watch()?;
        *self.watcher.lock() = Some(watcher);
        Ok(())
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn locator(&self) -> &Arc<ProjectLocator> {
        &self.locator
    }

    pub fn completions(&self) -> &Arc<CompletionSession<H>> {
        &self.completions
    }

    /// Editor hook: completions requested
    pub fn on_query_completions(&self, snapshot: &BufferSnapshot) -> Option<CompletionList> {
        self.completions.on_query_completions(snapshot)
    }

    /// Editor command: go to definition
    pub fn goto_definition(&self, snapshot: &BufferSnapshot) -> JoinHandle<()> {
        self.definitions.run(snapshot)
    }

    /// Editor hook: a file was (re)loaded from disk
    pub fn on_load(&self, file: &Path) {
        self.locator.invalidate(file);
    }

    /// Editor hook: a view was closed
    pub fn on_view_closed(&self, view: ViewId) {
        self.completions.on_view_closed(view);
    }

    /// Stop watching settings and drop cached lookups
    pub fn shutdown(&self) {
        self.watcher.lock().take();
        self.locator.cache().clear();
        info!("rustcomplete shut down");
    }
}
