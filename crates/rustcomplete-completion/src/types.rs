//! Core types shared by the runner, presenter and editor glue

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Cursor position in a buffer (0-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 0-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Editor view (tab/pane) identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// The cursor a request was issued for: (view, line, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId {
    pub view: ViewId,
    pub line: u32,
    pub column: u32,
}

impl RequestId {
    /// Create a request identity
    pub fn new(view: ViewId, position: Position) -> Self {
        Self {
            view,
            line: position.line,
            column: position.column,
        }
    }
}

/// Everything a tool invocation needs from the editor, captured at request time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSnapshot {
    /// View the buffer is shown in
    pub view: ViewId,
    /// File backing the buffer, `None` for unsaved buffers
    pub file_name: Option<PathBuf>,
    /// Full buffer text
    pub content: String,
    /// Cursor position
    pub cursor: Position,
    /// Whether the cursor sits in Rust source
    pub is_rust_source: bool,
}

impl BufferSnapshot {
    /// Snapshot an unsaved buffer; it counts as Rust source until told otherwise
    pub fn new(view: ViewId, content: impl Into<String>, cursor: Position) -> Self {
        Self {
            view,
            file_name: None,
            content: content.into(),
            cursor,
            is_rust_source: true,
        }
    }

    /// Attach the backing file; Rust-ness follows the `.rs` extension
    pub fn with_file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        let file_name = file_name.into();
        self.is_rust_source = file_name.extension().is_some_and(|ext| ext == "rs");
        self.file_name = Some(file_name);
        self
    }

    /// Override the Rust source check (e.g. from the editor's syntax scope)
    pub fn with_rust_source(mut self, is_rust_source: bool) -> Self {
        self.is_rust_source = is_rust_source;
        self
    }

    /// Identity of a request issued from this snapshot
    pub fn request_id(&self) -> RequestId {
        RequestId::new(self.view, self.cursor)
    }
}

/// Which racer subcommand to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RacerCommand {
    /// `complete-with-snippet`: `;`-delimited output including a snippet field
    CompleteWithSnippet,
    /// `complete`: `,`-delimited output without snippets
    Complete,
    /// `find-definition`: `,`-delimited output without snippets
    FindDefinition,
}

impl RacerCommand {
    /// Subcommand name on the racer command line
    pub fn as_str(&self) -> &'static str {
        match self {
            RacerCommand::CompleteWithSnippet => "complete-with-snippet",
            RacerCommand::Complete => "complete",
            RacerCommand::FindDefinition => "find-definition",
        }
    }

    /// Whether output lines carry a snippet field
    pub fn with_snippet(&self) -> bool {
        matches!(self, RacerCommand::CompleteWithSnippet)
    }
}

impl fmt::Display for RacerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate parsed from a racer `MATCH` line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchResult {
    /// Text to insert
    pub completion: String,
    /// Snippet template, empty when the command has none
    pub snippet: String,
    /// 1-based row of the declaration
    pub row: u32,
    /// 0-based column of the declaration
    pub column: u32,
    /// File declaring the match
    pub path: PathBuf,
    /// Kind label, e.g. `Function` or `Struct`
    #[serde(rename = "type")]
    pub kind: String,
    /// Declaration line
    pub context: String,
}

impl MatchResult {
    /// Where the declaration lives
    pub fn location(&self) -> Location {
        Location {
            path: self.path.clone(),
            row: self.row,
            column: self.column,
        }
    }

    /// File name of the declaring path, empty when there is none
    pub fn basename(&self) -> String {
        basename(&self.path)
    }
}

/// A jump target: file plus 1-based row and column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub row: u32,
    pub column: u32,
}

impl Location {
    /// `path:row:column`, the encoded form editors accept for positioned opens
    pub fn encoded(&self) -> String {
        format!("{}:{}:{}", self.path.display(), self.row, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

pub(crate) fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
