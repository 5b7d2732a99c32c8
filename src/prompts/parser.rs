//! Marker extraction from model output.

/// Token the council pass is asked to put before its fused recommendation.
pub const COUNCIL_MARKER: &str = "ROMANAI_SUMMARY";

/// Token the self-evaluation pass is asked to put before its improved answer.
pub const FINAL_MARKER: &str = "ROMANAI_FINAL";

/// Pull the improved answer out of a self-evaluation response.
///
/// Takes everything after the *first* [`FINAL_MARKER`], strips leading and
/// trailing spaces, colons and newlines, then any remaining surrounding
/// whitespace. The remainder is not validated; a truncated answer is
/// returned as-is.
///
/// # Returns
/// `None` when the marker is absent or nothing follows it.
pub fn extract_final_answer(eval_text: &str) -> Option<String> {
    let idx = eval_text.find(FINAL_MARKER)?;
    let rest = &eval_text[idx + FINAL_MARKER.len()..];
    let improved = rest.trim_matches(|c| c == ' ' || c == ':' || c == '\n').trim();
    if improved.is_empty() {
        None
    } else {
        Some(improved.to_string())
    }
}
