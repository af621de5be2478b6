//! `RUST_SRC_PATH` construction

use std::collections::HashSet;
use std::path::Path;

/// Environment variable racer reads its search path from
pub const RUST_SRC_PATH: &str = "RUST_SRC_PATH";

/// Build the `RUST_SRC_PATH` value for a racer invocation
///
/// Entries come, in order, from the pre-existing value, the configured
/// search paths, and the project's source directory. `~` is expanded to the
/// home directory, empty entries are dropped, and duplicates are removed
/// keeping the first occurrence.
pub fn build_search_path(
    existing: Option<&str>,
    configured: &[String],
    project_source: Option<&Path>,
) -> String {
    build_search_path_with_home(
        existing,
        configured,
        project_source,
        dirs::home_dir().as_deref(),
    )
}

pub(crate) fn build_search_path_with_home(
    existing: Option<&str>,
    configured: &[String],
    project_source: Option<&Path>,
    home: Option<&Path>,
) -> String {
    let project = project_source.map(|path| path.to_string_lossy().into_owned());

    let candidates = existing
        .unwrap_or_default()
        .split(':')
        .chain(configured.iter().map(String::as_str))
        .chain(project.as_deref())
        .filter(|entry| !entry.is_empty())
        .map(|entry| expand_tilde(entry, home));

    let mut seen = HashSet::new();
    candidates
        .filter(|entry| seen.insert(entry.clone()))
        .collect::<Vec<_>>()
        .join(":")
}

/// Expand a leading `~` or `~/` to `home`; other entries pass through
pub(crate) fn expand_tilde(entry: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return entry.to_string();
    };

    if entry == "~" {
        return home.to_string_lossy().into_owned();
    }
    match entry.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => entry.to_string(),
    }
}
