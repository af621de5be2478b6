//! Settings snapshot

use serde::{Deserialize, Serialize};

/// Default analysis tool binary
pub const DEFAULT_RACER_BIN: &str = "racer";
/// Default build tool binary
pub const DEFAULT_CARGO_BIN: &str = "cargo";
/// Default deadline for a single tool invocation
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Immutable snapshot of every rustcomplete option
///
/// A snapshot is never patched in place: any change to the underlying
/// sources produces a fresh `Settings` value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Path or name of the `racer` executable
    pub racer: String,
    /// Path or name of the `cargo` executable; empty disables project lookup
    pub cargo: String,
    /// Extra entries appended to `RUST_SRC_PATH`
    pub search_paths: Vec<String>,
    /// Deadline for one tool invocation, in milliseconds
    pub timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            racer: DEFAULT_RACER_BIN.to_string(),
            cargo: DEFAULT_CARGO_BIN.to_string(),
            search_paths: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Settings {
    /// Whether a build tool is configured for project lookups
    pub fn has_cargo(&self) -> bool {
        !self.cargo.trim().is_empty()
    }
}
