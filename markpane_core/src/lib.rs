//! Markpane core - search, highlight and scroll-sync engine.
//!
//! This crate contains the logic that keeps the editable source buffer
//! and the rendered markup view consistent with each other: match
//! finding, search state, highlight projection onto both views, and
//! percentage-based scroll synchronization. It has no dependencies on
//! windowing, rendering or dialog systems; those are host concerns
//! reached through the seams in `markup`, `storage` and `scroll`.

pub mod buffer;
pub mod buffer_highlight;
pub mod context;
pub mod debounce;
pub mod finder;
pub mod markup;
pub mod scroll;
pub mod session;
pub mod storage;
pub mod store;
pub mod tree_highlight;

pub use buffer::DocumentBuffer;
pub use buffer_highlight::{CaretPlacement, OverlayUpdate};
pub use debounce::{Debouncer, Settled};
pub use finder::{find, MatchSpan, SearchOptions};
pub use markup::{Element, ElementKind, MarkupNode, MarkupRenderer, MarkupTree};
pub use scroll::{PaneSide, ScrollPane, ScrollSync, SharedPane};
pub use session::{EditorSession, ViewMode};
pub use storage::{DocumentStorage, FsStorage};
pub use store::{
    SearchEvent, SearchHit, SearchState, SearchStore, SearchTarget, TargetKind, ViewScope,
};
pub use tree_highlight::TreeHighlight;
