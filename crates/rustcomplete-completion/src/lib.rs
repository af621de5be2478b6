//! rustcomplete completion engine
//!
//! Editor-side driver for [racer](https://github.com/racer-rust/racer): the
//! buffer is piped to a fresh racer process, racer's `MATCH` lines become
//! [`MatchResult`]s, and the results are turned into aligned completion
//! entries or a go-to-definition jump.
//!
//! # Architecture
//!
//! 1. **Project lookup** ([`ProjectLocator`]): `cargo locate-project` finds the
//!    project's `src` directory, memoized per file in a [`SourcePathCache`]
//! 2. **Invocation** ([`RacerRunner`]): racer runs with `RUST_SRC_PATH` built
//!    from the environment, the settings and the project lookup, under a
//!    deadline
//! 3. **Parsing** ([`parser`]): `MATCH` lines into [`MatchResult`]s
//! 4. **Presentation** ([`presenter`]): column-aligned labels, deduplication,
//!    definition disambiguation
//! 5. **Editor glue** ([`CompletionSession`], [`GotoDefinition`], [`Plugin`]):
//!    correlates late results with the cursor they were requested for
//!
//! The editor itself is reached only through the [`EditorHost`] trait.
//!
//! # Example
//!
//! ```ignore
//! use rustcomplete_completion::*;
//!
//! let plugin = Plugin::new(settings, host, handle);
//! let snapshot = BufferSnapshot::new(ViewId(1), text, Position::new(3, 8))
//!     .with_file_name("/proj/src/main.rs");
//!
//! // None the first time; the host's trigger_completion fires when racer answers
//! assert!(plugin.on_query_completions(&snapshot).is_none());
//! ```

pub mod definition;
pub mod error;
pub mod host;
pub mod locator;
pub mod parser;
pub mod plugin;
pub mod presenter;
pub mod runner;
pub mod search_path;
pub mod session;
pub mod types;

pub use definition::{present_definition, GotoDefinition};
pub use error::{CompletionError, CompletionResult};
pub use host::{AutoCompleteOptions, ChooserCallback, EditorHost};
pub use locator::{ProjectLocator, SourceLookup, SourcePathCache};
pub use parser::{parse_line, parse_output, MATCH_PREFIX, STDIN_PATH};
pub use plugin::Plugin;
pub use presenter::{
    dedup_entries, definition_label, format_completions, resolve_definition, CompletionEntry,
    DefinitionChoice,
};
pub use runner::{RacerRequest, RacerRunner};
pub use search_path::{build_search_path, RUST_SRC_PATH};
pub use session::{is_current, CompletionList, CompletionSession};
pub use types::*;
