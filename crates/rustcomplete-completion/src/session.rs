//! Completion request state per editor view
//!
//! Editors ask for completions synchronously, but racer answers later. The
//! first query for a cursor starts racer and returns nothing; when racer
//! answers for the cursor the user is still at, the results are cached and
//! the popup is re-triggered, and the follow-up query is served from the
//! cache.
//!
//! ```text
//! Idle --query--> Pending(id) --deliver, id current--> Resolved(id)
//!                     |
//!                     +--deliver, id stale--> Idle
//! ```
//!
//! Deliveries for a view that is not `Pending` on that exact id are ignored.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::host::{AutoCompleteOptions, EditorHost};
use crate::presenter::{dedup_entries, format_completions, CompletionEntry};
use crate::runner::{RacerRequest, RacerRunner};
use crate::types::{BufferSnapshot, MatchResult, RacerCommand, RequestId, ViewId};

/// Completions handed back to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionList {
    pub entries: Vec<CompletionEntry>,
    /// Suppress the editor's buffer-word completions
    pub inhibit_word_completions: bool,
    /// Suppress the editor's snippet/explicit completions
    pub inhibit_explicit_completions: bool,
}

impl CompletionList {
    fn new(entries: Vec<CompletionEntry>) -> Self {
        Self {
            entries,
            inhibit_word_completions: true,
            inhibit_explicit_completions: true,
        }
    }
}

#[derive(Debug, Clone)]
enum ViewState {
    Pending(RequestId),
    Resolved {
        id: RequestId,
        entries: Vec<CompletionEntry>,
    },
}

/// Whether results for `requested` may still be shown
///
/// Results are only current while the editor's cursor identity is exactly the
/// one the request was issued for.
pub fn is_current(requested: &RequestId, current: Option<&RequestId>) -> bool {
    current == Some(requested)
}

/// Drives completion requests for every view of one editor
pub struct CompletionSession<H: EditorHost> {
    host: Arc<H>,
    runner: RacerRunner,
    views: Mutex<HashMap<ViewId, ViewState>>,
}

impl<H: EditorHost> CompletionSession<H> {
    pub fn new(host: Arc<H>, runner: RacerRunner) -> Self {
        Self {
            host,
            runner,
            views: Mutex::new(HashMap::new()),
        }
    }

    /// Answer an editor completion query
    ///
    /// Returns cached entries when racer already answered for this exact
    /// cursor, otherwise starts racer (unless it is already running for this
    /// cursor) and returns `None`.
    pub fn on_query_completions(self: &Arc<Self>, snapshot: &BufferSnapshot) -> Option<CompletionList> {
        if !snapshot.is_rust_source {
            return None;
        }

        let id = snapshot.request_id();
        {
            let mut views = self.views.lock();
            match views.get(&id.view) {
                Some(ViewState::Resolved { id: resolved, entries }) if *resolved == id => {
                    return Some(CompletionList::new(dedup_entries(entries)));
                }
                Some(ViewState::Pending(pending)) if *pending == id => {
                    debug!(view = %id.view, "racer already running for this cursor");
                    return None;
                }
                _ => {}
            }
            views.insert(id.view, ViewState::Pending(id));
        }

        let session = Arc::clone(self);
        let request = RacerRequest::new(RacerCommand::CompleteWithSnippet, snapshot);
        self.runner.run(request, move |results| {
            session.deliver(id, results);
        });
        None
    }

    /// Accept racer results for `id`
    ///
    /// Results are only taken while `view` is still waiting on exactly this
    /// request. Stale results (the cursor moved on) and results for a view
    /// that was closed or re-queried meanwhile are dropped without caching or
    /// displaying anything. Returns whether the results were accepted.
    pub fn deliver(&self, id: RequestId, results: Vec<MatchResult>) -> bool {
        let current = self.host.current_request_id();

        {
            let mut views = self.views.lock();
            if !matches!(views.get(&id.view), Some(ViewState::Pending(pending)) if *pending == id) {
                debug!(view = %id.view, requested = ?id, "No request waiting for these completions");
                return false;
            }

            if !is_current(&id, current.as_ref()) {
                views.remove(&id.view);
                debug!(
                    view = %id.view,
                    requested = ?id,
                    current = ?current,
                    "Discarding stale completions"
                );
                return false;
            }

            let entries = format_completions(&results);
            debug!(view = %id.view, count = entries.len(), "Caching completions");
            views.insert(id.view, ViewState::Resolved { id, entries });
        }

        self.host
            .trigger_completion(id.view, AutoCompleteOptions::default());
        true
    }

    /// Forget everything about `view`
    pub fn on_view_closed(&self, view: ViewId) {
        self.views.lock().remove(&view);
    }

    /// Identity whose results are cached for `view`
    pub fn resolved_id(&self, view: ViewId) -> Option<RequestId> {
        match self.views.lock().get(&view) {
            Some(ViewState::Resolved { id, .. }) => Some(*id),
            _ => None,
        }
    }

    /// Whether racer is running for `view`
    pub fn is_pending(&self, view: ViewId) -> bool {
        matches!(self.views.lock().get(&view), Some(ViewState::Pending(_)))
    }
}
