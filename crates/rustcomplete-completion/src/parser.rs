//! racer output parsing
//!
//! racer prints one candidate per line:
//!
//! ```text
//! MATCH foo;foo(${1:x});3;4;/dev/stdin;Function;fn foo(x: u32)      (complete-with-snippet)
//! MATCH foo,3,4,/dev/stdin,Function,fn foo(x: u32)                  (complete, find-definition)
//! ```
//!
//! Everything else (`PREFIX`, `END`, diagnostics) is ignored, as are lines
//! that do not carry enough fields.

use std::path::{Path, PathBuf};

use crate::types::MatchResult;

/// Prefix of every line carrying a candidate
pub const MATCH_PREFIX: &str = "MATCH ";

/// Path racer reports for the buffer piped on stdin
pub const STDIN_PATH: &str = "/dev/stdin";

const SNIPPET_FIELDS: usize = 7;
const PLAIN_FIELDS: usize = 6;

/// Parse a single output line, `None` if it is not a well-formed `MATCH` line
///
/// `;`-delimited lines take their first seven fields; anything racer appends
/// after the context (e.g. a docs field) is ignored. In the `,`-delimited
/// format the context is last and keeps any further commas, so
/// `fn foo(a, b)` survives.
pub fn parse_line(line: &str, with_snippet: bool) -> Option<MatchResult> {
    let body = line.strip_prefix(MATCH_PREFIX)?;

    let mut fields: Vec<&str> = if with_snippet {
        body.split(';').take(SNIPPET_FIELDS).collect()
    } else {
        body.splitn(PLAIN_FIELDS, ',').collect()
    };

    if !with_snippet {
        if fields.len() != PLAIN_FIELDS {
            return None;
        }
        fields.insert(1, "");
    }
    if fields.len() != SNIPPET_FIELDS {
        return None;
    }

    Some(MatchResult {
        completion: fields[0].to_string(),
        snippet: fields[1].to_string(),
        row: fields[2].trim().parse().ok()?,
        column: fields[3].trim().parse().ok()?,
        path: PathBuf::from(fields[4]),
        kind: fields[5].to_string(),
        context: fields[6].to_string(),
    })
}

/// Parse racer stdout into ordered results for a request on `file_name`
///
/// Candidates declared in `file_name` itself are dropped; candidates declared
/// in the piped buffer (`/dev/stdin`) are attributed to `file_name`.
pub fn parse_output(output: &str, with_snippet: bool, file_name: Option<&Path>) -> Vec<MatchResult> {
    output
        .lines()
        .filter_map(|line| parse_line(line, with_snippet))
        .filter_map(|mut result| {
            if let Some(file_name) = file_name {
                if result.path == file_name {
                    return None;
                }
                if result.path == Path::new(STDIN_PATH) {
                    result.path = file_name.to_path_buf();
                }
            }
            Some(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_line() {
        let result = parse_line("MATCH foo;snip;3;4;/dev/stdin;Fn;fn foo()", true).unwrap();
        assert_eq!(result.completion, "foo");
        assert_eq!(result.snippet, "snip");
        assert_eq!(result.row, 3);
        assert_eq!(result.column, 4);
        assert_eq!(result.path, PathBuf::from(STDIN_PATH));
        assert_eq!(result.kind, "Fn");
        assert_eq!(result.context, "fn foo()");
    }

    #[test]
    fn test_plain_line_gets_empty_snippet() {
        let result = parse_line(
            "MATCH new,12,11,/rust/src/libstd/vec.rs,Function,pub fn new() -> Vec<T>",
            false,
        )
        .unwrap();
        assert_eq!(result.completion, "new");
        assert_eq!(result.snippet, "");
        assert_eq!(result.row, 12);
        assert_eq!(result.column, 11);
        assert_eq!(result.kind, "Function");
        assert_eq!(result.context, "pub fn new() -> Vec<T>");
    }

    #[test]
    fn test_context_keeps_delimiters() {
        let result = parse_line("MATCH add,1,0,/a.rs,Function,fn add(a: u8, b: u8)", false).unwrap();
        assert_eq!(result.context, "fn add(a: u8, b: u8)");
    }

    #[test]
    fn test_trailing_snippet_fields_are_ignored() {
        let result = parse_line(
            "MATCH foo;foo();3;4;/a.rs;Function;fn foo();\"docs here\"",
            true,
        )
        .unwrap();
        assert_eq!(result.context, "fn foo()");
        assert_eq!(result.kind, "Function");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        assert!(parse_line("PREFIX 4,4,", true).is_none());
        assert!(parse_line("END", true).is_none());
        assert!(parse_line("MATCH foo;snip;3", true).is_none());
        assert!(parse_line("MATCH foo;snip;x;4;/a.rs;Fn;ctx", true).is_none());
        assert!(parse_line("MATCH foo,1,2,/a.rs", false).is_none());
        assert!(parse_line("match foo;snip;3;4;/a.rs;Fn;ctx", true).is_none());
    }

    #[test]
    fn test_output_rewrites_stdin_and_drops_self() {
        let output = "\
PREFIX 0,2,fo
MATCH foo;foo();3;4;/dev/stdin;Function;fn foo()
MATCH fold;fold();7;1;/proj/src/main.rs;Function;fn fold()
MATCH for_each;for_each();9;2;/rust/src/iter.rs;Function;fn for_each()
END
";
        let file = Path::new("/proj/src/main.rs");
        let results = parse_output(output, true, Some(file));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].completion, "foo");
        assert_eq!(results[0].path, file);
        assert_eq!(results[1].completion, "for_each");
    }

    #[test]
    fn test_output_without_file_name() {
        let output = "MATCH foo;foo();3;4;/dev/stdin;Function;fn foo()\r\n";
        let results = parse_output(output, true, None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, PathBuf::from(STDIN_PATH));
        assert_eq!(results[0].context, "fn foo()");
    }
}
