//! One-shot bypass for self-issued navigation.
//!
//! When the coordinator re-issues a paused transition (or the handler
//! navigates through the API) the routing subsystem fires a fresh
//! before-transition event for it. Without a bypass that event would reach
//! the handler again and pause forever. The coordinator [`arm`](LoopGuard::arm)s
//! the guard right before navigating; the interceptor
//! [`consume`](LoopGuard::consume)s it on the very next event and lets that
//! event through.
//!
//! If the self-issued navigation never produces an event (another listener
//! vetoed it first), the guard stays armed and lets the next event through
//! instead.

use std::cell::Cell;

/// Single-use "let the next transition through" flag.
#[derive(Debug, Default)]
pub struct LoopGuard {
    armed: Cell<bool>,
}

impl LoopGuard {
    /// Create a disarmed guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow exactly one subsequent interception to pass.
    pub fn arm(&self) {
        self.armed.set(true);
    }

    /// Test-and-clear. Returns `true` at most once per [`arm`](Self::arm).
    pub fn consume(&self) -> bool {
        self.armed.replace(false)
    }

    /// Peek without consuming.
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }
}
