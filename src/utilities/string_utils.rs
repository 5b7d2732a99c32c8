//! String utility functions.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:python|bash|json)?").expect("static regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Remove markdown code fences and trim.
///
/// Strips ` ```python `, ` ```bash `, ` ```json ` and bare ` ``` ` markers,
/// leaving the fenced content in place.
pub fn clean_markdown(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Light whitespace simplification.
///
/// Four-space runs and tabs become two spaces, the text is trimmed and runs
/// of three or more newlines collapse to one blank line.
pub fn simplify_whitespace(text: &str) -> String {
    let spaced = text.replace("    ", "  ").replace('\t', "  ");
    BLANK_RUN.replace_all(spaced.trim(), "\n\n").to_string()
}
