//! Query matching over plain text.
//!
//! `find` is a pure function from (query, text, options) to an ordered list
//! of match spans; all search state lives in the store.

use crate::context;
use regex::{Regex, RegexBuilder};

/// Match rule configuration. Immutable per search invocation; changing any
/// option invalidates prior results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Match letter case exactly.
    pub case_sensitive: bool,
    /// Require word boundaries on both sides (ignored in regex mode).
    pub whole_word: bool,
    /// Interpret the query as a regular expression.
    pub use_regex: bool,
}

/// One search hit: a half-open byte range `[start, end)` into the scanned
/// text, the matched text itself, and an excerpt around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// The text covered by the span.
    pub matched_text: String,
    /// Surrounding excerpt for display and debugging.
    pub context: String,
}

impl MatchSpan {
    /// Returns the length of the match in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Finds all occurrences of `query` in `text` under `options`.
///
/// Spans come back in ascending start order and never overlap: the scan
/// resumes at a match's end. Empty query or text yields an empty list.
/// Deterministic for identical inputs.
pub fn find(query: &str, text: &str, options: &SearchOptions) -> Vec<MatchSpan> {
    if query.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let re = build_matcher(query, options);
    let mut spans = Vec::new();
    let mut at = 0;

    while at <= text.len() {
        let m = match re.find_at(text, at) {
            Some(m) => m,
            None => break,
        };
        if m.end() > m.start() {
            spans.push(MatchSpan {
                start: m.start(),
                end: m.end(),
                matched_text: m.as_str().to_string(),
                context: context::extract(text, m.start(), m.end()),
            });
            at = m.end();
        } else {
            // Zero-width match (unconstrained regex mode): not a reportable
            // span, and the scan must step one character to terminate.
            match text[m.start()..].chars().next() {
                Some(c) => at = m.start() + c.len_utf8(),
                None => break,
            }
        }
    }

    spans
}

/// Builds the matching predicate for the given options. An invalid pattern
/// in regex mode falls back to literal substring matching instead of
/// surfacing a compile error.
fn build_matcher(query: &str, options: &SearchOptions) -> Regex {
    let pattern = if options.use_regex {
        query.to_string()
    } else if options.whole_word {
        format!(r"\b{}\b", regex::escape(query))
    } else {
        regex::escape(query)
    };

    let compile = |p: &str| {
        RegexBuilder::new(p)
            .case_insensitive(!options.case_sensitive)
            .build()
    };

    match compile(&pattern) {
        Ok(re) => re,
        Err(err) => {
            log::debug!(
                "invalid search pattern {:?}, falling back to literal: {}",
                query,
                err
            );
            compile(&regex::escape(query)).expect("escaped literal pattern compiles")
        }
    }
}
