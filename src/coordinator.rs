//! The pause coordinator.
//!
//! [`PauseCoordinator`] owns the single pending transition. For each attempt
//! handed over by the interceptor it runs the handler, classifies the answer
//! and either lets the transition through, blocks it, or blocks it and keeps
//! it as the [`PendingTransition`] that the handler can later resume or
//! cancel through the [`NavigationApi`].
//!
//! # State machine
//!
//! ```text
//!              decide()                  verdict = Defer
//!   Idle ───────────────▶ AwaitingDecision ───────────────▶ Deferred
//!    ▲                        │  allow / deny / invalid        │
//!    └────────────────────────┘                                │
//!    └──────────────── resume() / cancel() / push / replace ───┘
//! ```
//!
//! While a new attempt is being decided the previous pending transition is
//! still visible: the handler sees it through `is_paused()` /
//! `paused_location()` and may resume or cancel it. It is dropped or
//! replaced once the new verdict is known; only the most recent deferred
//! attempt is resumable.
//!
//! Pending transitions are owned by identity. A deferred future that settles
//! after its transition was replaced, resumed or cancelled does nothing.
//!
//! The coordinator always clears its state before navigating, so a handler
//! re-entered by the resulting transition never observes a stale pause.

use crate::decision::{classify, Response, Settlement, Verdict};
use crate::error::PauseError;
use crate::handler::Handler;
use crate::history::History;
use crate::location::{Action, Location, TransitionAttempt};
use crate::logging::{debug_log, trace_log, warn_log};
use crate::loop_guard::LoopGuard;
use crate::spawn::Spawner;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

// ============================================================================
// State
// ============================================================================

/// A deferred transition waiting for resume or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    id: u64,
    attempt: TransitionAttempt,
}

impl PendingTransition {
    /// Identity used to match late settlements against the current pause.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The attempt that was paused.
    pub fn attempt(&self) -> &TransitionAttempt {
        &self.attempt
    }
}

/// Coarse phase of the coordinator, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending, no decision running.
    Idle,
    /// A handler is deciding right now.
    AwaitingDecision,
    /// A transition is paused.
    Deferred,
}

/// Book-keeping for the decision currently running.
#[derive(Debug)]
struct DecisionCycle {
    id: u64,
    /// Pending transition from before this decision started.
    previous: Option<PendingTransition>,
    /// Handler called `pause()`.
    pause_requested: bool,
    /// Handler navigated on its own; the attempt being decided is moot.
    redirected: bool,
}

#[derive(Debug)]
enum PauseState {
    Idle,
    AwaitingDecision(DecisionCycle),
    Deferred(PendingTransition),
}

struct Inner {
    history: Rc<dyn History>,
    spawner: Rc<dyn Spawner>,
    state: RefCell<PauseState>,
    guard: LoopGuard,
    next_id: Cell<u64>,
}

fn owns(owner: Option<u64>, pending: &PendingTransition) -> bool {
    owner.map_or(true, |id| id == pending.id)
}

impl Inner {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn pending(&self) -> Option<PendingTransition> {
        match &*self.state.borrow() {
            PauseState::Idle => None,
            PauseState::AwaitingDecision(cycle) => cycle.previous.clone(),
            PauseState::Deferred(pending) => Some(pending.clone()),
        }
    }

    fn phase(&self) -> Phase {
        match &*self.state.borrow() {
            PauseState::Idle => Phase::Idle,
            PauseState::AwaitingDecision(_) => Phase::AwaitingDecision,
            PauseState::Deferred(_) => Phase::Deferred,
        }
    }

    /// Remove the pending transition if `owner` (or anyone, for `None`) owns it.
    ///
    /// With `redirect`, a running decision whose previous pause is taken is
    /// marked as superseded.
    fn take_pending(&self, owner: Option<u64>, redirect: bool) -> Option<PendingTransition> {
        let mut state = self.state.borrow_mut();
        if let PauseState::AwaitingDecision(cycle) = &mut *state {
            if !cycle.previous.as_ref().is_some_and(|p| owns(owner, p)) {
                return None;
            }
            cycle.redirected |= redirect;
            return cycle.previous.take();
        }
        match &*state {
            PauseState::Deferred(pending) if owns(owner, pending) => {}
            _ => return None,
        }
        match std::mem::replace(&mut *state, PauseState::Idle) {
            PauseState::Deferred(pending) => Some(pending),
            _ => None,
        }
    }

    fn mark_redirected(&self) {
        if let PauseState::AwaitingDecision(cycle) = &mut *self.state.borrow_mut() {
            cycle.redirected = true;
        }
    }

    fn resume(&self, owner: Option<u64>) {
        let Some(pending) = self.take_pending(owner, true) else {
            trace_log!("resume() with nothing to resume");
            return;
        };
        let TransitionAttempt { location, action } = pending.attempt;
        debug_log!("Resuming paused {} to '{}'", action, location);

        self.guard.arm();
        match action {
            // Only a single step back is possible: there is no way to map a
            // cached location back onto a history offset.
            Action::Pop => self.history.go_back(),
            Action::Push => self.history.push_to(location),
            Action::Replace => self.history.replace_with(location),
        }
    }

    fn cancel(&self, owner: Option<u64>) {
        match self.take_pending(owner, false) {
            Some(pending) => {
                debug_log!(
                    "Cancelled paused {} to '{}'",
                    pending.attempt.action,
                    pending.attempt.location
                );
            }
            None => {
                trace_log!("cancel() with nothing to cancel");
            }
        }
    }

    fn navigate(&self, action: Action, location: Location) {
        self.take_pending(None, false);
        self.mark_redirected();
        debug_log!("Manual {} to '{}'", action, location);

        self.guard.arm();
        match action {
            Action::Replace => self.history.replace_with(location),
            _ => self.history.push_to(location),
        }
    }

    fn pause(&self) {
        if let PauseState::AwaitingDecision(cycle) = &mut *self.state.borrow_mut() {
            cycle.pause_requested = true;
        } else {
            trace_log!("pause() outside of a decision is ignored");
        }
    }

    fn decide(self: &Rc<Self>, handler: &Handler, attempt: TransitionAttempt) -> bool {
        let id = self.next_id();
        let previous = match self.state.replace(PauseState::Idle) {
            PauseState::Idle => None,
            PauseState::Deferred(pending) => Some(pending),
            // Nested decision: the outer one will notice it was superseded
            PauseState::AwaitingDecision(outer) => outer.previous,
        };
        self.state.replace(PauseState::AwaitingDecision(DecisionCycle {
            id,
            previous,
            pause_requested: false,
            redirected: false,
        }));

        let api = NavigationApi {
            inner: Rc::clone(self),
        };
        let response = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.call(&api, &attempt.location, attempt.action)
        }))
        .unwrap_or_else(|payload| {
            warn_log!("{}", PauseError::from_panic(payload.as_ref()));
            Response::Unspecified
        });

        let cycle = match self.state.replace(PauseState::Idle) {
            PauseState::AwaitingDecision(cycle) if cycle.id == id => cycle,
            other => {
                self.state.replace(other);
                debug_log!(
                    "Decision for {} '{}' superseded by a nested decision",
                    attempt.action,
                    attempt.location
                );
                return false;
            }
        };

        if cycle.redirected {
            if let Some(previous) = cycle.previous {
                self.state.replace(PauseState::Deferred(previous));
            }
            debug_log!(
                "Handler navigated while deciding {} '{}'; blocking it",
                attempt.action,
                attempt.location
            );
            return false;
        }

        let verdict = if cycle.pause_requested {
            Verdict::Defer(None)
        } else {
            classify(response)
        };
        trace_log!(
            "Handler verdict for {} '{}': {:?}",
            attempt.action,
            attempt.location,
            verdict
        );

        match verdict {
            Verdict::Allow => true,
            Verdict::Deny => false,
            Verdict::Invalid(value) => {
                warn_log!("{}", PauseError::InvalidResponse { value });
                true
            }
            Verdict::Defer(deferred) => {
                debug_log!("Paused {} to '{}'", attempt.action, attempt.location);
                self.state
                    .replace(PauseState::Deferred(PendingTransition { id, attempt }));
                if let Some(deferred) = deferred {
                    let weak: Weak<Inner> = Rc::downgrade(self);
                    self.spawner.spawn_local(Box::pin(async move {
                        let settlement = deferred.await;
                        if let Some(inner) = weak.upgrade() {
                            match settlement {
                                Settlement::Resume => inner.resume(Some(id)),
                                Settlement::Cancel => inner.cancel(Some(id)),
                            }
                        }
                    }));
                }
                false
            }
        }
    }
}

fn with_state(location: impl Into<Location>, state: Option<Value>) -> Location {
    let mut location = location.into();
    if let Some(state) = state {
        location.state = state;
    }
    location
}

// ============================================================================
// NavigationApi
// ============================================================================

/// Capabilities handed to a navigation handler.
///
/// Cheap to clone; a handler may keep a clone (for instance in a dialog's
/// button callbacks) and call [`resume`](Self::resume) or
/// [`cancel`](Self::cancel) later. All methods are no-ops when there is
/// nothing to act on.
#[derive(Clone)]
pub struct NavigationApi {
    inner: Rc<Inner>,
}

impl NavigationApi {
    /// Whether a transition is paused.
    pub fn is_paused(&self) -> bool {
        self.inner.pending().is_some()
    }

    /// A copy of the paused location, if any.
    pub fn paused_location(&self) -> Option<Location> {
        self.inner.pending().map(|p| p.attempt.location)
    }

    /// Re-issue the paused transition.
    pub fn resume(&self) {
        self.inner.resume(None);
    }

    /// Drop the paused transition without navigating.
    pub fn cancel(&self) {
        self.inner.cancel(None);
    }

    /// Pause the transition currently being decided, whatever the handler
    /// returns. Ignored outside a decision.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Navigate to `location`, bypassing the handler once.
    ///
    /// `state`, when given, replaces the location's own state.
    pub fn push(&self, location: impl Into<Location>, state: Option<Value>) {
        self.inner.navigate(Action::Push, with_state(location, state));
    }

    /// Replace the current entry with `location`, bypassing the handler once.
    pub fn replace(&self, location: impl Into<Location>, state: Option<Value>) {
        self.inner
            .navigate(Action::Replace, with_state(location, state));
    }
}

impl fmt::Debug for NavigationApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationApi")
            .field("paused", &self.is_paused())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PauseCoordinator
// ============================================================================

/// Owner of the pending transition and the loop guard.
#[derive(Clone)]
pub struct PauseCoordinator {
    inner: Rc<Inner>,
}

impl PauseCoordinator {
    /// Create a coordinator that navigates through `history` and runs
    /// deferred decisions on `spawner`.
    pub fn new(history: Rc<dyn History>, spawner: Rc<dyn Spawner>) -> Self {
        Self {
            inner: Rc::new(Inner {
                history,
                spawner,
                state: RefCell::new(PauseState::Idle),
                guard: LoopGuard::new(),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Ask `handler` about `attempt`. Returns `true` to let it through.
    ///
    /// A panicking handler counts as having no opinion and the transition is
    /// allowed.
    pub fn decide(&self, handler: &Handler, attempt: TransitionAttempt) -> bool {
        self.inner.decide(handler, attempt)
    }

    /// See [`NavigationApi::resume`].
    pub fn resume(&self) {
        self.inner.resume(None);
    }

    /// See [`NavigationApi::cancel`].
    pub fn cancel(&self) {
        self.inner.cancel(None);
    }

    /// See [`NavigationApi::push`].
    pub fn push(&self, location: impl Into<Location>, state: Option<Value>) {
        self.inner.navigate(Action::Push, with_state(location, state));
    }

    /// See [`NavigationApi::replace`].
    pub fn replace(&self, location: impl Into<Location>, state: Option<Value>) {
        self.inner
            .navigate(Action::Replace, with_state(location, state));
    }

    /// Whether a transition is paused.
    pub fn is_paused(&self) -> bool {
        self.inner.pending().is_some()
    }

    /// A copy of the paused location, if any.
    pub fn paused_location(&self) -> Option<Location> {
        self.inner.pending().map(|p| p.attempt.location)
    }

    /// A copy of the pending transition, if any.
    pub fn pending(&self) -> Option<PendingTransition> {
        self.inner.pending()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    /// The guard armed before every self-issued navigation.
    pub fn loop_guard(&self) -> &LoopGuard {
        &self.inner.guard
    }

    /// A handle to the API passed to handlers.
    pub fn api(&self) -> NavigationApi {
        NavigationApi {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for PauseCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PauseCoordinator")
            .field("state", &self.inner.state.borrow())
            .field("guard", &self.inner.guard)
            .finish_non_exhaustive()
    }
}
