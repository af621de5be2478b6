//! Go to definition

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::host::EditorHost;
use crate::presenter::{resolve_definition, DefinitionChoice};
use crate::runner::{RacerRequest, RacerRunner};
use crate::types::{BufferSnapshot, MatchResult, RacerCommand};

/// One-shot `find-definition` command
///
/// Unlike completions, definition results are acted on whenever they arrive:
/// no check is made that the cursor is still where the command was issued.
pub struct GotoDefinition<H: EditorHost> {
    host: Arc<H>,
    runner: RacerRunner,
}

impl<H: EditorHost> GotoDefinition<H> {
    pub fn new(host: Arc<H>, runner: RacerRunner) -> Self {
        Self { host, runner }
    }

    /// Look up the definition under the cursor and jump to it
    pub fn run(&self, snapshot: &BufferSnapshot) -> JoinHandle<()> {
        let host = Arc::clone(&self.host);
        let request = RacerRequest::new(RacerCommand::FindDefinition, snapshot);
        self.runner
            .run(request, move |results| present_definition(&host, &results))
    }
}

/// Jump to a lone candidate, or let the user pick among several
pub fn present_definition<H: EditorHost>(host: &Arc<H>, results: &[MatchResult]) {
    match resolve_definition(results) {
        DefinitionChoice::None => debug!("No definition found"),
        DefinitionChoice::Jump(location) => host.open_location(&location),
        DefinitionChoice::Choose { labels, locations } => {
            let target = Arc::clone(host);
            host.show_chooser(
                labels,
                Box::new(move |choice| {
                    if let Some(location) = choice.and_then(|idx| locations.get(idx)) {
                        target.open_location(location);
                    }
                }),
            );
        }
    }
}
