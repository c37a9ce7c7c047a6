//! Highlight overlay for the plain-text buffer.
//!
//! The overlay is layered behind the editable text, so its geometry (line
//! breaks, character positions) must stay identical to the buffer. The
//! editable text itself is never touched; each pass rewrites the overlay
//! from the source text.

use crate::finder::MatchSpan;

/// Marker wrapped around every match in the overlay.
pub const MARK_OPEN: &str = "<mark class=\"search-match\">";
/// Marker wrapped around the match under the cursor.
pub const MARK_OPEN_ACTIVE: &str = "<mark class=\"search-match active\">";
/// Closing marker.
pub const MARK_CLOSE: &str = "</mark>";

/// Caret placement for the active match, as a byte range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretPlacement {
    pub start: usize,
    pub end: usize,
}

/// Result of one overlay pass: the overlay text plus the side effects the
/// host applies to the editable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayUpdate {
    /// Source text with match markers spliced in.
    pub overlay: String,
    /// Selection to place on the active match, if any.
    pub caret: Option<CaretPlacement>,
    /// First visible line that puts the active match in the upper third of
    /// the viewport, if there is an active match.
    pub scroll_line: Option<usize>,
}

/// Renders the overlay for `source` with the given matches. `cursor_index`
/// is 1-based over `results`; 0 means no active match. `visible_lines` is
/// the viewport height in lines, used for scroll targeting.
pub fn render(
    source: &str,
    results: &[MatchSpan],
    cursor_index: usize,
    visible_lines: usize,
) -> OverlayUpdate {
    let mut overlay = source.to_string();

    // Splice from the last match backward so earlier span offsets are
    // never invalidated by text already inserted.
    for pos in (0..results.len()).rev() {
        let span = &results[pos];
        if span.start > span.end || span.end > source.len() {
            continue;
        }
        let open = if pos + 1 == cursor_index {
            MARK_OPEN_ACTIVE
        } else {
            MARK_OPEN
        };
        overlay.insert_str(span.end, MARK_CLOSE);
        overlay.insert_str(span.start, open);
    }

    let active = if cursor_index == 0 {
        None
    } else {
        results.get(cursor_index - 1)
    };
    let caret = active.map(|span| CaretPlacement {
        start: span.start,
        end: span.end,
    });
    let scroll_line = active.map(|span| scroll_target_line(source, span.start, visible_lines));

    OverlayUpdate {
        overlay,
        caret,
        scroll_line,
    }
}

/// Returns the 0-indexed line containing the byte offset `start`, counted
/// by line breaks before it.
pub fn line_of_offset(source: &str, start: usize) -> usize {
    let start = start.min(source.len());
    source[..start].matches('\n').count()
}

/// First visible line that places the match's line roughly in the upper
/// third of a viewport `visible_lines` tall.
pub fn scroll_target_line(source: &str, start: usize, visible_lines: usize) -> usize {
    line_of_offset(source, start).saturating_sub(visible_lines / 3)
}
