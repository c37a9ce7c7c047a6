//! Excerpt extraction around a match span.

/// Number of characters of context kept on each side of a match.
pub const CONTEXT_WINDOW: usize = 50;

/// Returns a bounded excerpt of `text` around the byte range `[start, end)`:
/// up to [`CONTEXT_WINDOW`] characters before the span and after it, clamped
/// to the text bounds. `start` and `end` must lie on char boundaries.
pub fn extract(text: &str, start: usize, end: usize) -> String {
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());

    let ctx_start = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_WINDOW - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let ctx_end = text[end..]
        .char_indices()
        .nth(CONTEXT_WINDOW)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[ctx_start..ctx_end].to_string()
}
