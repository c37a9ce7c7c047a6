//! Search state store.
//!
//! Owns the query, match options, result list and cursor. Views never
//! mutate this state directly; they call the operations here and react to
//! the change notifications, delivered in invocation order.

use crate::debounce::{Debouncer, Settled};
use crate::finder::{self, MatchSpan, SearchOptions};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Instant;

/// Which view(s) participate in a search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewScope {
    /// The editable plain-text buffer only.
    Buffer,
    /// The rendered markup view only.
    Rendered,
    /// Both views side by side.
    #[default]
    Both,
}

/// Which representation a search target's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Buffer,
    Rendered,
}

/// One searchable content snapshot. The caller decides which views are
/// visible and supplies a target per visible view.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    pub kind: TargetKind,
    pub content: String,
}

/// A match span tagged with the target it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: TargetKind,
    pub span: MatchSpan,
}

/// Change notification emitted after every mutating store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    Opened,
    Closed,
    QueryChanged,
    OptionsChanged,
    ResultsUpdated,
    CursorMoved,
    ScopeChanged,
}

/// Snapshot of the current search.
///
/// Invariants: `cursor_index` is 1-based with 0 meaning "no selection" and
/// never exceeds `total_matches()`; when `is_active` is false the result
/// list is empty and the cursor is 0.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub is_active: bool,
    pub results: Vec<SearchHit>,
    pub cursor_index: usize,
    pub view_scope: ViewScope,
}

impl SearchState {
    /// Returns the number of matches in the current result list.
    pub fn total_matches(&self) -> usize {
        self.results.len()
    }

    /// Returns the hit under the cursor, if any.
    pub fn active_hit(&self) -> Option<&SearchHit> {
        if self.cursor_index == 0 {
            None
        } else {
            self.results.get(self.cursor_index - 1)
        }
    }
}

/// The store. Results are recomputed wholesale on every search pass and
/// never mutated in place.
pub struct SearchStore {
    state: SearchState,
    options: SearchOptions,
    debouncer: Debouncer,
    subscribers: Vec<Sender<SearchEvent>>,
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStore {
    /// Creates a store in the inactive state.
    pub fn new() -> Self {
        Self {
            state: SearchState::default(),
            options: SearchOptions::default(),
            debouncer: Debouncer::default(),
            subscribers: Vec::new(),
        }
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Returns the current match options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Registers a listener for change notifications.
    pub fn subscribe(&mut self) -> Receiver<SearchEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Activates search. Existing results are kept.
    pub fn open(&mut self) {
        self.state.is_active = true;
        self.emit(SearchEvent::Opened);
    }

    /// Deactivates search and resets to the canonical empty state. Any
    /// in-flight debounced query is cancelled.
    pub fn close(&mut self) {
        self.state.query.clear();
        self.state.results.clear();
        self.state.cursor_index = 0;
        self.state.is_active = false;
        self.debouncer.cancel();
        self.emit(SearchEvent::Closed);
    }

    /// Updates the query synchronously (for immediate UI feedback) and
    /// schedules a debounced re-search trigger. The trigger surfaces
    /// through [`SearchStore::poll`].
    pub fn set_query(&mut self, query: &str, now: Instant) {
        self.state.query = query.to_string();
        self.state.cursor_index = 0;
        self.debouncer.push(query, now);
        self.emit(SearchEvent::QueryChanged);
    }

    /// Replaces the match options. Any change invalidates all prior
    /// results; the caller re-runs `search` to repopulate them.
    pub fn set_options(&mut self, options: SearchOptions) {
        if self.options == options {
            return;
        }
        self.options = options;
        self.state.results.clear();
        self.state.cursor_index = 0;
        self.emit(SearchEvent::OptionsChanged);
    }

    /// Returns the settled debounced query once its quiet period elapses.
    /// Called from the host loop tick; a `Some` return means "re-run
    /// search against current targets now". When the settled query is a
    /// suppressed duplicate of the last fired one, the existing results
    /// are still valid but `set_query` has parked the cursor at 0, so it
    /// is re-seated on the first match instead of re-searching.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.debouncer.poll(now)? {
            Settled::Value(query) => Some(query),
            Settled::Duplicate => {
                if self.state.is_active
                    && self.state.cursor_index == 0
                    && !self.state.results.is_empty()
                {
                    self.state.cursor_index = 1;
                    self.emit(SearchEvent::CursorMoved);
                }
                None
            }
        }
    }

    /// Runs the match finder over each target and replaces the result
    /// list: target order first, then offset order within a target. The
    /// cursor lands on the first match if there is one.
    pub fn search(&mut self, targets: &[SearchTarget]) {
        if !self.state.is_active {
            return;
        }
        let mut results = Vec::new();
        for target in targets {
            for span in finder::find(&self.state.query, &target.content, &self.options) {
                results.push(SearchHit {
                    kind: target.kind,
                    span,
                });
            }
        }
        log::debug!(
            "search {:?}: {} matches across {} targets",
            self.state.query,
            results.len(),
            targets.len()
        );
        self.state.cursor_index = if results.is_empty() { 0 } else { 1 };
        self.state.results = results;
        self.emit(SearchEvent::ResultsUpdated);
    }

    /// Advances the cursor to the next match, wrapping to the first.
    pub fn next(&mut self) {
        let total = self.state.total_matches();
        if total == 0 {
            return;
        }
        self.state.cursor_index = self.state.cursor_index % total + 1;
        self.emit(SearchEvent::CursorMoved);
    }

    /// Moves the cursor to the previous match, wrapping to the last.
    pub fn previous(&mut self) {
        let total = self.state.total_matches();
        if total == 0 {
            return;
        }
        self.state.cursor_index = if self.state.cursor_index <= 1 {
            total
        } else {
            self.state.cursor_index - 1
        };
        self.emit(SearchEvent::CursorMoved);
    }

    /// Changes which views participate in subsequent `search` calls.
    /// Does not itself re-run the search.
    pub fn set_view_scope(&mut self, scope: ViewScope) {
        self.state.view_scope = scope;
        self.emit(SearchEvent::ScopeChanged);
    }

    fn emit(&mut self, event: SearchEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn buffer_target(content: &str) -> SearchTarget {
        SearchTarget {
            kind: TargetKind::Buffer,
            content: content.to_string(),
        }
    }

    fn run_search(store: &mut SearchStore, query: &str, content: &str) {
        let now = Instant::now();
        store.open();
        store.set_query(query, now);
        store.search(&[buffer_target(content)]);
    }

    #[test]
    fn test_search_populates_results_and_cursor() {
        let mut store = SearchStore::new();
        run_search(&mut store, "at", "The cat sat on the mat");
        assert_eq!(store.state().total_matches(), 3);
        assert_eq!(store.state().cursor_index, 1);
        let active = store.state().active_hit().unwrap();
        assert_eq!((active.span.start, active.span.end), (5, 7));
    }

    #[test]
    fn test_no_match_is_zero_of_zero() {
        let mut store = SearchStore::new();
        run_search(&mut store, "xyz", "The cat sat");
        assert_eq!(store.state().total_matches(), 0);
        assert_eq!(store.state().cursor_index, 0);
    }

    #[test]
    fn test_cyclic_navigation() {
        let mut store = SearchStore::new();
        run_search(&mut store, "at", "The cat sat on the mat");
        store.next();
        assert_eq!(store.state().cursor_index, 2);
        store.next();
        assert_eq!(store.state().cursor_index, 3);
        store.next();
        assert_eq!(store.state().cursor_index, 1); // wraps
        store.previous();
        assert_eq!(store.state().cursor_index, 3); // wraps back
    }

    #[test]
    fn test_navigation_noop_without_matches() {
        let mut store = SearchStore::new();
        store.open();
        store.next();
        store.previous();
        assert_eq!(store.state().cursor_index, 0);
    }

    #[test]
    fn test_target_order_precedes_offset_order() {
        let mut store = SearchStore::new();
        store.open();
        store.set_query("a", Instant::now());
        store.search(&[
            SearchTarget {
                kind: TargetKind::Buffer,
                content: "xa".to_string(),
            },
            SearchTarget {
                kind: TargetKind::Rendered,
                content: "ax".to_string(),
            },
        ]);
        let kinds: Vec<_> = store.state().results.iter().map(|h| h.kind).collect();
        assert_eq!(kinds, vec![TargetKind::Buffer, TargetKind::Rendered]);
        assert_eq!(store.state().results[0].span.start, 1);
        assert_eq!(store.state().results[1].span.start, 0);
    }

    #[test]
    fn test_close_resets_and_cancels_debounce() {
        let start = Instant::now();
        let mut store = SearchStore::new();
        store.open();
        store.set_query("cat", start);
        store.close();
        // The debounced trigger never fires after close.
        assert_eq!(store.poll(start + Duration::from_secs(1)), None);
        assert!(!store.state().is_active);
        assert!(store.state().query.is_empty());
        assert_eq!(store.state().cursor_index, 0);
    }

    #[test]
    fn test_search_ignored_while_inactive() {
        let mut store = SearchStore::new();
        store.set_query("cat", Instant::now());
        store.search(&[buffer_target("cat cat")]);
        assert_eq!(store.state().total_matches(), 0);
    }

    #[test]
    fn test_debounced_query_settles() {
        let start = Instant::now();
        let mut store = SearchStore::new();
        store.open();
        store.set_query("c", start);
        store.set_query("ca", start + Duration::from_millis(100));
        store.set_query("cat", start + Duration::from_millis(200));
        assert_eq!(store.poll(start + Duration::from_millis(300)), None);
        assert_eq!(
            store.poll(start + Duration::from_millis(500)),
            Some("cat".to_string())
        );
    }

    #[test]
    fn test_reentered_query_reseats_cursor() {
        let start = Instant::now();
        let mut store = SearchStore::new();
        store.open();
        store.set_query("cat", start);
        assert_eq!(
            store.poll(start + Duration::from_millis(300)),
            Some("cat".to_string())
        );
        store.search(&[buffer_target("cat cat")]);
        assert_eq!(store.state().cursor_index, 1);

        // Edit the query and put it back within one quiet period. The
        // settled value is a suppressed duplicate: no re-search fires,
        // but the cursor must not stay parked at 0 over valid results.
        store.set_query("ca", start + Duration::from_millis(400));
        store.set_query("cat", start + Duration::from_millis(450));
        assert_eq!(store.state().cursor_index, 0);
        assert_eq!(store.poll(start + Duration::from_secs(1)), None);
        assert_eq!(store.state().cursor_index, 1);
        assert_eq!(store.state().total_matches(), 2);
    }

    #[test]
    fn test_options_change_invalidates_results() {
        let mut store = SearchStore::new();
        run_search(&mut store, "at", "The cat sat");
        assert_eq!(store.state().total_matches(), 2);
        store.set_options(SearchOptions {
            whole_word: true,
            ..Default::default()
        });
        assert_eq!(store.state().total_matches(), 0);
        assert_eq!(store.state().cursor_index, 0);
    }

    #[test]
    fn test_events_delivered_in_invocation_order() {
        let mut store = SearchStore::new();
        let rx = store.subscribe();
        store.open();
        store.set_query("at", Instant::now());
        store.search(&[buffer_target("cat")]);
        store.next();
        store.set_view_scope(ViewScope::Rendered);
        store.close();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                SearchEvent::Opened,
                SearchEvent::QueryChanged,
                SearchEvent::ResultsUpdated,
                SearchEvent::CursorMoved,
                SearchEvent::ScopeChanged,
                SearchEvent::Closed,
            ]
        );
    }
}
