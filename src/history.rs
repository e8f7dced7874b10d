//! Routing subsystem seam.
//!
//! The interceptor never navigates on its own; it talks to a [`History`]:
//! read the current location, register a before-transition listener that can
//! veto, and re-issue navigation through `go_back` / `push_to` /
//! `replace_with`.
//!
//! [`MemoryHistory`] is a complete in-memory implementation: an entry stack
//! with a cursor, forward entries dropped on push, and listeners consulted
//! before every transition.
//!
//! # Examples
//!
//! ```
//! use navigator_pause::{Action, History, Location, MemoryHistory};
//! use std::rc::Rc;
//!
//! let history = MemoryHistory::new();
//! let _sub = history.on_before_transition(Rc::new(|location: &Location, _action: Action| location.path != "/admin"));
//!
//! assert!(history.push(Location::new("/home")));
//! assert!(!history.push(Location::new("/admin")));
//! assert_eq!(history.current_location().path, "/home");
//! ```

use crate::location::{Action, Location};
use crate::logging::trace_log;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Listener fired before a transition; returning `false` vetoes it.
pub type TransitionListener = Rc<dyn Fn(&Location, Action) -> bool>;

/// Closure that removes a previously registered listener.
pub type Unblock = Box<dyn FnOnce()>;

// ============================================================================
// History trait
// ============================================================================

/// Capabilities required from the routing subsystem.
///
/// Implementations may invoke listeners synchronously from inside
/// `push_to`, `replace_with` and `go_back`, including while a listener is
/// itself running.
pub trait History {
    /// The location currently shown.
    fn current_location(&self) -> Location;

    /// Register a before-transition listener.
    ///
    /// Dropping or releasing the returned [`Subscription`] removes it.
    fn on_before_transition(&self, listener: TransitionListener) -> Subscription;

    /// Go back a single entry.
    fn go_back(&self);

    /// Push a new entry. The location carries its own history state.
    fn push_to(&self, location: Location);

    /// Replace the current entry.
    fn replace_with(&self, location: Location);
}

// ============================================================================
// Subscription
// ============================================================================

/// Owns a listener registration.
///
/// [`release`](Self::release) runs the unblock closure at most once; later
/// calls are no-ops. Dropping an active subscription releases it.
#[derive(Default)]
pub struct Subscription {
    unblock: Option<Unblock>,
}

impl Subscription {
    /// Wrap an unblock closure.
    pub fn new(unblock: impl FnOnce() + 'static) -> Self {
        Self {
            unblock: Some(Box::new(unblock)),
        }
    }

    /// A subscription that owns nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.unblock.is_some()
    }

    /// Remove the listener. Idempotent.
    pub fn release(&mut self) {
        if let Some(unblock) = self.unblock.take() {
            unblock();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

// ============================================================================
// MemoryHistory
// ============================================================================

/// In-memory history stack.
///
/// Cloning yields another handle to the same stack.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<MemoryInner>,
}

struct MemoryInner {
    /// Navigation history stack
    entries: RefCell<Vec<Location>>,
    /// Current position in history
    current: Cell<usize>,
    listeners: RefCell<Vec<(u64, TransitionListener)>>,
    next_listener_id: Cell<u64>,
}

impl MemoryHistory {
    /// Start at `/`.
    pub fn new() -> Self {
        Self::with_initial(Location::new("/"))
    }

    /// Start at `initial`.
    pub fn with_initial(initial: Location) -> Self {
        Self {
            inner: Rc::new(MemoryInner {
                entries: RefCell::new(vec![initial]),
                current: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<Location> {
        self.inner.entries.borrow().clone()
    }

    /// Index of the current entry.
    pub fn index(&self) -> usize {
        self.inner.current.get()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Always `false`; the stack holds at least the initial entry.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Whether a previous entry exists.
    pub fn can_go_back(&self) -> bool {
        self.index() > 0
    }

    /// Whether a forward entry exists.
    pub fn can_go_forward(&self) -> bool {
        self.index() + 1 < self.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Push `location`, dropping forward entries. Returns `false` if vetoed.
    pub fn push(&self, location: Location) -> bool {
        if !self.confirm(&location, Action::Push) {
            return false;
        }
        let mut entries = self.inner.entries.borrow_mut();
        let current = self.inner.current.get();
        // Remove forward history when pushing
        entries.truncate(current + 1);
        entries.push(location);
        self.inner.current.set(current + 1);
        true
    }

    /// Replace the current entry. Returns `false` if vetoed.
    pub fn replace(&self, location: Location) -> bool {
        if !self.confirm(&location, Action::Replace) {
            return false;
        }
        let mut entries = self.inner.entries.borrow_mut();
        let current = self.inner.current.get();
        entries[current] = location;
        true
    }

    /// Step back one entry. Returns `false` at the start or if vetoed.
    pub fn back(&self) -> bool {
        self.step(-1)
    }

    /// Step forward one entry. Returns `false` at the end or if vetoed.
    pub fn forward(&self) -> bool {
        self.step(1)
    }

    fn step(&self, delta: isize) -> bool {
        let Some(target_index) = self.index().checked_add_signed(delta) else {
            return false;
        };
        let Some(target) = self.inner.entries.borrow().get(target_index).cloned() else {
            return false;
        };
        if !self.confirm(&target, Action::Pop) {
            return false;
        }
        self.inner.current.set(target_index);
        true
    }

    /// Ask every listener; the first veto wins.
    fn confirm(&self, location: &Location, action: Action) -> bool {
        // Snapshot so listeners may (un)register or navigate re-entrantly
        let listeners: Vec<TransitionListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            if !listener(location, action) {
                trace_log!("Transition {} '{}' vetoed by listener", action, location);
                return false;
            }
        }
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("entries", &self.inner.entries.borrow())
            .field("current", &self.inner.current.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl History for MemoryHistory {
    fn current_location(&self) -> Location {
        self.inner.entries.borrow()[self.inner.current.get()].clone()
    }

    fn on_before_transition(&self, listener: TransitionListener) -> Subscription {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, listener));

        let weak: Weak<MemoryInner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    fn go_back(&self) {
        self.back();
    }

    fn push_to(&self, location: Location) {
        self.push(location);
    }

    fn replace_with(&self, location: Location) {
        self.replace(location);
    }
}
