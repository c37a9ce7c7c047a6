//! Debounced query stream with explicit timer state.
//!
//! The core runs on the host's event loop, so debouncing is modeled as one
//! pending value-plus-deadline that the loop polls on its tick, rather than
//! as a background timer. Each new value replaces the pending one, which
//! guarantees at most one in-flight trigger per stream.

use std::time::{Duration, Instant};

/// Quiet period a value must survive unchanged before it fires.
pub const QUIET_PERIOD: Duration = Duration::from_millis(275);

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

/// Outcome of a settled quiet period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// A new value finished its quiet period.
    Value(String),
    /// The settled value equals the last fired one and was suppressed;
    /// consumers may still need to refresh derived state (the results it
    /// fired for are still valid).
    Duplicate,
}

/// A single-slot debouncer for the search query stream.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<Pending>,
    last_fired: Option<String>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(QUIET_PERIOD)
    }
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_fired: None,
        }
    }

    /// Schedules `value` to fire after the quiet period, superseding any
    /// pending value.
    pub fn push(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            value: value.into(),
            deadline: now + self.quiet,
        });
    }

    /// Returns the settled outcome once the deadline has passed, at most
    /// once per pushed value. A value equal to the last fired one settles
    /// as [`Settled::Duplicate`] instead of firing again.
    pub fn poll(&mut self, now: Instant) -> Option<Settled> {
        let due = matches!(&self.pending, Some(p) if now >= p.deadline);
        if !due {
            return None;
        }
        let value = self.pending.take().map(|p| p.value)?;
        if self.last_fired.as_deref() == Some(value.as_str()) {
            return Some(Settled::Duplicate);
        }
        self.last_fired = Some(value.clone());
        Some(Settled::Value(value))
    }

    /// Drops any pending value and forgets the duplicate-suppression state.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_fired = None;
    }

    /// Returns true if a value is waiting out its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
