//! Editor session: wires the buffer, search store, highlighters and
//! scroll sync together.
//!
//! Control flow: user input reaches the session, the session mutates the
//! search store (query writes are synchronous, the re-search trigger is
//! debounced and surfaces through `tick`), and the highlight getters
//! project the store's state onto whichever views are visible. The
//! rendered tree is rebuilt in full on every content change; the tree
//! highlighter only ever sees a fresh copy of it.

use crate::buffer::DocumentBuffer;
use crate::buffer_highlight::{self, OverlayUpdate};
use crate::finder::MatchSpan;
use crate::markup::{MarkupRenderer, MarkupTree};
use crate::scroll::{ScrollSync, SharedPane};
use crate::storage::DocumentStorage;
use crate::store::{SearchStore, SearchTarget, TargetKind, ViewScope};
use crate::tree_highlight::{self, TreeHighlight};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Which pane(s) the host is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Editable plain text only.
    Source,
    /// Rendered markup only.
    Rendered,
    /// Both panes side by side, scroll-synchronized.
    #[default]
    Split,
}

impl ViewMode {
    fn scope(self) -> ViewScope {
        match self {
            ViewMode::Source => ViewScope::Buffer,
            ViewMode::Rendered => ViewScope::Rendered,
            ViewMode::Split => ViewScope::Both,
        }
    }
}

/// One open document and everything operating on it.
pub struct EditorSession {
    buffer: DocumentBuffer,
    renderer: Box<dyn MarkupRenderer>,
    /// Authoritative rendered form; highlight passes work on copies.
    tree: Option<MarkupTree>,
    search: SearchStore,
    scroll: ScrollSync,
    panes: Option<(SharedPane, SharedPane)>,
    view_mode: ViewMode,
    file_path: Option<PathBuf>,
    modified: bool,
    /// Viewport height in lines, for scroll targeting.
    visible_lines: usize,
}

impl EditorSession {
    /// Creates a session with no document loaded.
    pub fn new(renderer: Box<dyn MarkupRenderer>) -> Self {
        Self {
            buffer: DocumentBuffer::new(),
            renderer,
            tree: None,
            search: SearchStore::new(),
            scroll: ScrollSync::new(),
            panes: None,
            view_mode: ViewMode::default(),
            file_path: None,
            modified: false,
            visible_lines: 40,
        }
    }

    /// Returns the buffer.
    pub fn buffer(&self) -> &DocumentBuffer {
        &self.buffer
    }

    /// Returns the authoritative (unhighlighted) rendered tree, if one has
    /// been built.
    pub fn tree(&self) -> Option<&MarkupTree> {
        self.tree.as_ref()
    }

    /// Returns the search store, for state reads and event subscription.
    pub fn search(&mut self) -> &mut SearchStore {
        &mut self.search
    }

    /// Returns the scroll sync engine, for host scroll event forwarding.
    pub fn scroll_sync(&mut self) -> &mut ScrollSync {
        &mut self.scroll
    }

    /// Returns the current file path.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns whether the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns the current view mode.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Sets the viewport height in lines.
    pub fn set_visible_lines(&mut self, lines: usize) {
        self.visible_lines = lines.max(1);
    }

    /// Loads a document. Search and scroll state reset on document switch.
    pub fn open_document(&mut self, storage: &dyn DocumentStorage, path: &Path) {
        let text = storage.read(path);
        self.buffer.set_text(&text);
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        self.search.close();
        self.render_tree();
    }

    /// Saves the buffer through storage. Returns success.
    pub fn save(&mut self, storage: &dyn DocumentStorage) -> bool {
        let path = match &self.file_path {
            Some(path) => path.clone(),
            None => {
                log::warn!("save requested with no file path set");
                return false;
            }
        };
        let ok = storage.write(&path, &self.buffer.to_string());
        if ok {
            self.modified = false;
        }
        ok
    }

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        self.buffer.insert(char_idx, text);
        self.content_changed();
    }

    /// Removes a character range.
    pub fn remove(&mut self, start: usize, end: usize) {
        self.buffer.remove(start, end);
        self.content_changed();
    }

    /// Replaces the whole document content.
    pub fn set_content(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.content_changed();
    }

    /// Switches the visible pane(s). The search scope follows the visible
    /// views, and scroll sync is attached exactly while both panes show.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.search.set_view_scope(mode.scope());
        if mode == ViewMode::Split {
            if let Some((source, rendered)) = &self.panes {
                self.scroll.attach(source.clone(), rendered.clone());
            }
        } else {
            self.scroll.detach();
        }
        if mode != ViewMode::Source && self.tree.is_none() {
            self.render_tree();
        }
    }

    /// Registers the two scrollable panes with the session. In split view
    /// they are attached to the sync engine immediately.
    pub fn set_panes(&mut self, source: SharedPane, rendered: SharedPane) {
        self.panes = Some((source, rendered));
        if self.view_mode == ViewMode::Split {
            if let Some((source, rendered)) = &self.panes {
                self.scroll.attach(source.clone(), rendered.clone());
            }
        }
    }

    /// Opens the search panel.
    pub fn open_search(&mut self) {
        self.search.open();
    }

    /// Closes search; both views fall back to their unhighlighted state.
    pub fn close_search(&mut self) {
        self.search.close();
    }

    /// Records a keystroke in the search field. The query state updates
    /// immediately; the search itself runs once the debounce settles, via
    /// `tick`.
    pub fn search_input(&mut self, query: &str, now: Instant) {
        self.search.set_query(query, now);
    }

    /// Cycles the search scope: buffer-only, rendered-only, both. Takes
    /// effect on the next search pass.
    pub fn toggle_scope(&mut self) {
        let next = match self.search.state().view_scope {
            ViewScope::Buffer => ViewScope::Rendered,
            ViewScope::Rendered => ViewScope::Both,
            ViewScope::Both => ViewScope::Buffer,
        };
        self.search.set_view_scope(next);
    }

    /// Host loop tick: fires a settled debounced query and expires scroll
    /// guard cool-downs.
    pub fn tick(&mut self, now: Instant) {
        if self.search.poll(now).is_some() {
            self.run_search();
        }
        self.scroll.tick(now);
    }

    /// Advances to the next match, wrapping.
    pub fn next_match(&mut self) {
        self.search.next();
    }

    /// Moves to the previous match, wrapping.
    pub fn previous_match(&mut self) {
        self.search.previous();
    }

    /// Re-runs the search against the targets the current scope selects.
    pub fn run_search(&mut self) {
        let targets = self.targets_for_scope();
        self.search.search(&targets);
    }

    /// Renders the highlight overlay for the source pane, including caret
    /// and scroll side effects for the active match.
    pub fn overlay(&self) -> OverlayUpdate {
        let source = self.buffer.to_string();
        let (spans, cursor) = self.partition_hits(TargetKind::Buffer);
        buffer_highlight::render(&source, &spans, cursor, self.visible_lines)
    }

    /// Renders a highlighted copy of the markup tree for the rendered
    /// pane. The store's rendered-target spans drive the pass, so the
    /// tree's marker ordinals and the store's cursor agree. Returns None
    /// (logged) when no tree exists yet.
    pub fn highlighted_tree(&self) -> Option<TreeHighlight> {
        let (spans, cursor) = self.partition_hits(TargetKind::Rendered);
        tree_highlight::render(self.tree.as_ref(), &spans, cursor)
    }

    fn content_changed(&mut self) {
        self.modified = true;
        self.render_tree();
        // Results are recomputed wholesale against the new content.
        if self.search.state().is_active && !self.search.state().query.is_empty() {
            self.run_search();
        }
    }

    fn render_tree(&mut self) {
        self.tree = Some(self.renderer.render(&self.buffer.to_string()));
    }

    fn targets_for_scope(&self) -> Vec<SearchTarget> {
        let scope = self.search.state().view_scope;
        let mut targets = Vec::new();
        if matches!(scope, ViewScope::Buffer | ViewScope::Both) {
            targets.push(SearchTarget {
                kind: TargetKind::Buffer,
                content: self.buffer.to_string(),
            });
        }
        if matches!(scope, ViewScope::Rendered | ViewScope::Both) {
            if let Some(tree) = &self.tree {
                targets.push(SearchTarget {
                    kind: TargetKind::Rendered,
                    content: tree.text_content(),
                });
            }
        }
        targets
    }

    /// Extracts the spans belonging to one target kind and the cursor's
    /// 1-based position within them (0 when the active match lies in the
    /// other view or there is none).
    fn partition_hits(&self, kind: TargetKind) -> (Vec<MatchSpan>, usize) {
        let state = self.search.state();
        let mut spans = Vec::new();
        let mut cursor = 0;
        for (i, hit) in state.results.iter().enumerate() {
            if hit.kind == kind {
                spans.push(hit.span.clone());
                if i + 1 == state.cursor_index {
                    cursor = spans.len();
                }
            }
        }
        (spans, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::QUIET_PERIOD;
    use crate::markup::{ElementKind, MarkupNode};
    use std::collections::HashMap;
    use std::time::Duration;

    /// Line-per-paragraph stand-in for the external markdown renderer.
    struct StubRenderer;

    impl MarkupRenderer for StubRenderer {
        fn render(&self, text: &str) -> MarkupTree {
            let roots = text
                .lines()
                .map(|line| {
                    MarkupNode::element(ElementKind::Paragraph, vec![MarkupNode::text(line)])
                })
                .collect();
            MarkupTree::new(roots)
        }
    }

    struct MemStorage {
        files: HashMap<PathBuf, String>,
    }

    impl DocumentStorage for MemStorage {
        fn read(&self, path: &Path) -> String {
            self.files.get(path).cloned().unwrap_or_default()
        }
        fn write(&self, _path: &Path, _text: &str) -> bool {
            true
        }
    }

    fn session_with(text: &str) -> EditorSession {
        let mut session = EditorSession::new(Box::new(StubRenderer));
        session.set_content(text);
        session
    }

    fn settle(session: &mut EditorSession, now: Instant) -> Instant {
        let settled = now + QUIET_PERIOD + Duration::from_millis(10);
        session.tick(settled);
        settled
    }

    #[test]
    fn test_debounced_search_flow() {
        let now = Instant::now();
        let mut session = session_with("the cat sat\non the mat");
        session.open_search();
        session.search_input("at", now);
        // Before the quiet period elapses nothing has run.
        session.tick(now + Duration::from_millis(50));
        assert_eq!(session.search().state().total_matches(), 0);
        settle(&mut session, now);
        // Buffer and rendered targets both match in split view.
        assert_eq!(session.search().state().total_matches(), 6);
        assert_eq!(session.search().state().cursor_index, 1);
    }

    #[test]
    fn test_close_before_debounce_elapses_runs_nothing() {
        let now = Instant::now();
        let mut session = session_with("cat");
        session.open_search();
        session.search_input("cat", now);
        session.close_search();
        settle(&mut session, now);
        let state = session.search().state();
        assert!(!state.is_active);
        assert_eq!(state.total_matches(), 0);
    }

    #[test]
    fn test_overlay_cursor_is_buffer_relative() {
        let now = Instant::now();
        let mut session = session_with("cat dog cat");
        session.open_search();
        session.search_input("cat", now);
        settle(&mut session, now);
        // 4 hits: 2 buffer then 2 rendered. Move to the second buffer hit.
        session.next_match();
        let overlay = session.overlay();
        assert_eq!(overlay.caret.map(|c| (c.start, c.end)), Some((8, 11)));
        // Moving into the rendered hits leaves the buffer with no active
        // match but keeps the plain markers.
        session.next_match();
        let overlay = session.overlay();
        assert_eq!(overlay.caret, None);
        let hl = session.highlighted_tree().unwrap();
        assert_eq!(hl.active_ordinal, Some(1));
    }

    #[test]
    fn test_rendered_hit_spanning_leaves_gets_highlighted() {
        let now = Instant::now();
        let mut session = session_with("ab\ncd");
        session.open_search();
        // "bc" only exists in the rendered text content, across the
        // boundary between the two paragraph leaves.
        session.search_input("bc", now);
        settle(&mut session, now);
        assert_eq!(session.search().state().total_matches(), 1);
        assert_eq!(session.search().state().cursor_index, 1);
        let hl = session.highlighted_tree().unwrap();
        assert_eq!(hl.marker_count, 1);
        assert_eq!(hl.active_ordinal, Some(1));
    }

    #[test]
    fn test_edit_rerenders_and_researches() {
        let now = Instant::now();
        let mut session = session_with("cat");
        session.open_search();
        session.search_input("cat", now);
        settle(&mut session, now);
        assert_eq!(session.search().state().total_matches(), 2);
        session.insert(0, "cat ");
        assert_eq!(session.search().state().total_matches(), 4);
        assert_eq!(session.tree().unwrap().text_content(), "cat cat");
    }

    #[test]
    fn test_scope_toggle_narrows_targets() {
        let now = Instant::now();
        let mut session = session_with("cat");
        session.open_search();
        // Split scope is Both; one toggle lands on Buffer.
        session.toggle_scope();
        assert_eq!(session.search().state().view_scope, ViewScope::Buffer);
        session.search_input("cat", now);
        settle(&mut session, now);
        assert_eq!(session.search().state().total_matches(), 1);
    }

    #[test]
    fn test_split_mode_attaches_scroll_sync() {
        use crate::scroll::ScrollPane;
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Pane(f64);
        impl ScrollPane for Pane {
            fn scroll_offset(&self) -> f64 {
                self.0
            }
            fn set_scroll_offset(&mut self, offset: f64) {
                self.0 = offset;
            }
            fn content_extent(&self) -> f64 {
                1000.0
            }
            fn viewport_extent(&self) -> f64 {
                100.0
            }
        }

        let mut session = session_with("text");
        session.set_panes(Rc::new(RefCell::new(Pane(0.0))), Rc::new(RefCell::new(Pane(0.0))));
        assert!(session.scroll_sync().is_active());
        session.set_view_mode(ViewMode::Source);
        assert!(!session.scroll_sync().is_active());
        session.set_view_mode(ViewMode::Split);
        assert!(session.scroll_sync().is_active());
    }

    #[test]
    fn test_view_mode_drives_search_scope() {
        let mut session = session_with("x");
        session.set_view_mode(ViewMode::Rendered);
        assert_eq!(session.search().state().view_scope, ViewScope::Rendered);
        session.set_view_mode(ViewMode::Split);
        assert_eq!(session.search().state().view_scope, ViewScope::Both);
    }

    #[test]
    fn test_document_switch_resets_search() {
        let now = Instant::now();
        let mut storage = MemStorage {
            files: HashMap::new(),
        };
        storage
            .files
            .insert(PathBuf::from("a.md"), "cat cat".to_string());
        storage.files.insert(PathBuf::from("b.md"), "dog".to_string());

        let mut session = EditorSession::new(Box::new(StubRenderer));
        session.open_document(&storage, Path::new("a.md"));
        session.open_search();
        session.search_input("cat", now);
        settle(&mut session, now);
        assert!(session.search().state().total_matches() > 0);

        session.open_document(&storage, Path::new("b.md"));
        let state = session.search().state();
        assert!(!state.is_active);
        assert_eq!(state.total_matches(), 0);
        assert_eq!(session.buffer().to_string(), "dog");
    }

    #[test]
    fn test_save_clears_modified_flag() {
        let storage = MemStorage {
            files: HashMap::new(),
        };
        let mut session = session_with("text");
        assert!(session.is_modified());
        // No path yet: save is a logged no-op.
        assert!(!session.save(&storage));
        session.open_document(&storage, Path::new("new.md"));
        session.insert(0, "hello");
        assert!(session.is_modified());
        assert!(session.save(&storage));
        assert!(!session.is_modified());
    }
}
