//! The editor as seen from rustcomplete

use crate::types::{Location, RequestId, ViewId};

/// Options for re-opening the completion popup once results arrive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCompleteOptions {
    /// Do not insert a lone candidate automatically
    pub disable_auto_insert: bool,
    /// Show only completions supplied by rustcomplete
    pub api_completions_only: bool,
    /// Refresh the popup if it is already showing
    pub next_completion_if_showing: bool,
}

impl Default for AutoCompleteOptions {
    fn default() -> Self {
        Self {
            disable_auto_insert: true,
            api_completions_only: true,
            next_completion_if_showing: true,
        }
    }
}

/// Called with the chosen index, or `None` when the chooser is dismissed
pub type ChooserCallback = Box<dyn FnOnce(Option<usize>) + Send + 'static>;

/// Editor services rustcomplete relies on
///
/// Methods may be called from runtime worker threads; implementations are
/// expected to marshal onto their UI thread as needed.
pub trait EditorHost: Send + Sync + 'static {
    /// Identity of the active view's cursor right now
    fn current_request_id(&self) -> Option<RequestId>;

    /// Re-open the completion popup for `view`
    fn trigger_completion(&self, view: ViewId, options: AutoCompleteOptions);

    /// Open a file at a position
    fn open_location(&self, location: &Location);

    /// Show a list of labels and report the user's pick
    fn show_chooser(&self, labels: Vec<String>, on_select: ChooserCallback);
}
