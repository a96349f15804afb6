//! Whitespace normalization for extracted page text.

use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid horizontal whitespace regex"));

/// A line break plus any whitespace around it, blank lines included.
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]*\n\s*").expect("valid line break regex"));

/// Collapses whitespace runs to a single space, line breaks with their
/// surrounding whitespace and blank lines to a single newline, and trims
/// both ends.
///
/// Idempotent: `normalize_text(&normalize_text(x)) == normalize_text(x)`.
pub fn normalize_text(text: &str) -> String {
    let collapsed = HORIZONTAL_RUN.replace_all(text, " ");
    let single_lines = LINE_BREAK.replace_all(&collapsed, "\n");
    single_lines.trim().to_string()
}
