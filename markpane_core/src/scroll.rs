//! Scroll synchronization between the source and rendered panes.
//!
//! The two panes are structurally different, so scroll position is
//! mirrored as a percentage of the scrollable range. A re-entrancy guard
//! flag keeps the mirrored write from re-triggering the handler it came
//! from; the guard is released on the next frame boundary rather than
//! synchronously, so the write to the other pane is allowed to complete
//! first. While attached, the engine is the only writer of either pane's
//! scroll offset.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Guard hold time covering a programmatic smooth-scroll animation.
pub const JUMP_COOLDOWN: Duration = Duration::from_millis(500);

/// A scrollable pane as the engine sees it. Offsets and extents are in
/// host units (pixels, lines); only their ratios matter here.
pub trait ScrollPane {
    fn scroll_offset(&self) -> f64;
    fn set_scroll_offset(&mut self, offset: f64);
    fn content_extent(&self) -> f64;
    fn viewport_extent(&self) -> f64;
}

/// Panes are shared with the host views on the single UI thread.
pub type SharedPane = Rc<RefCell<dyn ScrollPane>>;

/// Which pane a scroll event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneSide {
    Source,
    Rendered,
}

/// How the re-entrancy guard gets released.
#[derive(Debug, Clone, Copy)]
enum GuardRelease {
    /// Cleared by the next `on_frame` call.
    NextFrame,
    /// Cleared once the deadline passes (programmatic jump cool-down).
    At(Instant),
}

enum SyncState {
    Detached,
    Attached {
        source: SharedPane,
        rendered: SharedPane,
    },
}

/// Bidirectional percentage-based scroll mirroring.
pub struct ScrollSync {
    state: SyncState,
    guard: Option<GuardRelease>,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSync {
    /// Creates a detached engine.
    pub fn new() -> Self {
        Self {
            state: SyncState::Detached,
            guard: None,
        }
    }

    /// Attaches both panes. Idempotent: any prior attachment is released
    /// first.
    pub fn attach(&mut self, source: SharedPane, rendered: SharedPane) {
        self.detach();
        self.state = SyncState::Attached { source, rendered };
    }

    /// Releases both panes and clears the guard.
    pub fn detach(&mut self) {
        self.state = SyncState::Detached;
        self.guard = None;
    }

    /// Returns true while both panes are attached.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SyncState::Attached { .. })
    }

    /// Handles a scroll event from `origin`, mirroring its position onto
    /// the other pane. Events arriving while the guard is set are ignored;
    /// those are the engine's own writes echoing back.
    pub fn on_scroll(&mut self, origin: PaneSide, now: Instant) {
        self.expire_cooldown(now);
        if self.guard.is_some() {
            return;
        }
        let (from, to) = match &self.state {
            SyncState::Attached { source, rendered } => match origin {
                PaneSide::Source => (source, rendered),
                PaneSide::Rendered => (rendered, source),
            },
            SyncState::Detached => return,
        };

        self.guard = Some(GuardRelease::NextFrame);
        let percentage = scroll_percentage(&*from.borrow());
        let mut to = to.borrow_mut();
        let range = (to.content_extent() - to.viewport_extent()).max(0.0);
        to.set_scroll_offset(percentage * range);
    }

    /// Frame boundary callback: releases a guard set by `on_scroll`.
    pub fn on_frame(&mut self) {
        if matches!(self.guard, Some(GuardRelease::NextFrame)) {
            self.guard = None;
        }
    }

    /// Timer callback: releases a guard whose cool-down has elapsed.
    pub fn tick(&mut self, now: Instant) {
        self.expire_cooldown(now);
    }

    /// Jumps one pane to an absolute offset (used for "go to search
    /// result"), holding the guard for the cool-down window so the smooth
    /// scroll's intermediate events do not trigger mirroring. Detached or
    /// unknown pane: logged no-op.
    pub fn scroll_to_position(&mut self, side: PaneSide, offset: f64, now: Instant) {
        let pane = match &self.state {
            SyncState::Attached { source, rendered } => match side {
                PaneSide::Source => source,
                PaneSide::Rendered => rendered,
            },
            SyncState::Detached => {
                log::debug!("scroll_to_position ignored: sync engine is detached");
                return;
            }
        };
        self.guard = Some(GuardRelease::At(now + JUMP_COOLDOWN));
        pane.borrow_mut().set_scroll_offset(offset);
    }

    fn expire_cooldown(&mut self, now: Instant) {
        if let Some(GuardRelease::At(deadline)) = self.guard {
            if now >= deadline {
                self.guard = None;
            }
        }
    }
}

/// Scroll offset normalized by the scrollable range, clamped to [0, 1].
pub fn scroll_percentage(pane: &dyn ScrollPane) -> f64 {
    let range = (pane.content_extent() - pane.viewport_extent()).max(1.0);
    (pane.scroll_offset() / range).clamp(0.0, 1.0)
}
