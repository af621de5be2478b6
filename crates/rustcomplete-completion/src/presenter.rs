//! Turning match results into editor-facing entries

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Location, MatchResult};

/// One completion row: aligned label plus the snippet to insert
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionEntry {
    pub label: String,
    pub snippet: String,
}

/// Format results as column-aligned completion entries
///
/// Each label reads `completion  type (file.rs) : context`, with the
/// `type (file.rs)` column right-aligned and the context column padded so
/// rows line up. Trailing spaces and `{` are trimmed.
pub fn format_completions(results: &[MatchResult]) -> Vec<CompletionEntry> {
    let middles: Vec<String> = results
        .iter()
        .map(|result| format!("{} ({})", result.kind, result.basename()))
        .collect();

    let lalign = results
        .iter()
        .zip(&middles)
        .map(|(result, middle)| width(&result.completion) + width(middle))
        .max()
        .unwrap_or(0);
    let ralign = results
        .iter()
        .map(|result| width(&result.context))
        .max()
        .unwrap_or(0);

    results
        .iter()
        .zip(middles)
        .map(|(result, middle)| {
            let label = format!(
                "{} {:>middle_width$} : {:<context_width$}",
                result.completion,
                middle,
                result.context,
                middle_width = lalign - width(&result.completion),
                context_width = ralign,
            );
            CompletionEntry {
                label: label.trim_end_matches(|c| c == ' ' || c == '{').to_string(),
                snippet: result.snippet.clone(),
            }
        })
        .collect()
}

/// Drop exact duplicates, keeping the first occurrence
pub fn dedup_entries(entries: &[CompletionEntry]) -> Vec<CompletionEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(*entry))
        .cloned()
        .collect()
}

/// What a go-to-definition request should do with its candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionChoice {
    /// Nothing to jump to
    None,
    /// Exactly one candidate: jump straight there
    Jump(Location),
    /// Several candidates: let the user pick
    Choose {
        labels: Vec<String>,
        locations: Vec<Location>,
    },
}

/// Decide how to present definition candidates
pub fn resolve_definition(results: &[MatchResult]) -> DefinitionChoice {
    match results {
        [] => DefinitionChoice::None,
        [only] => DefinitionChoice::Jump(only.location()),
        many => DefinitionChoice::Choose {
            labels: many.iter().map(definition_label).collect(),
            locations: many.iter().map(MatchResult::location).collect(),
        },
    }
}

/// `<snippet> - <file name>`
///
/// `find-definition` output carries no snippet, so the completion text stands
/// in for an empty one.
pub fn definition_label(result: &MatchResult) -> String {
    let name = if result.snippet.is_empty() {
        &result.completion
    } else {
        &result.snippet
    };
    format!("{} - {}", name, result.basename())
}

fn width(text: &str) -> usize {
    text.chars().count()
}
