//! The navigation interceptor.
//!
//! [`NavigationInterceptor`] listens to the routing subsystem's
//! before-transition event and screens every attempt before the handler sees
//! it:
//!
//! 1. Re-entering the location already shown is always blocked, so a form
//!    being edited is not reloaded and its fields are not lost.
//! 2. A transition issued by the coordinator itself (resume, push, replace)
//!    passes once through the [`LoopGuard`](crate::LoopGuard).
//! 3. With [`allow_bookmarks`](crate::PauseConfig::allow_bookmarks), a jump
//!    to another anchor on the same page passes.
//! 4. Without a handler everything passes.
//! 5. Everything else goes to the [`PauseCoordinator`].
//!
//! The interceptor is meant to be driven from a render/update loop: call
//! [`update`](NavigationInterceptor::update) every cycle with the current
//! handler, enable flag and overrides; it subscribes, re-subscribes or
//! unsubscribes only when something actually changed.
//!
//! # Example
//!
//! ```
//! use navigator_pause::*;
//! use std::rc::Rc;
//!
//! let history = MemoryHistory::new();
//! let spawner: Rc<dyn Spawner> = Rc::new(|_task: LocalTask| {});
//! let interceptor = NavigationInterceptor::new(Rc::new(history.clone()), spawner);
//!
//! let unsaved = Handler::named("unsaved-form", |_api, _location, _action| Response::pause());
//! interceptor.update(Some(unsaved), true, &ConfigOverrides::default());
//!
//! assert!(!history.push(Location::new("/elsewhere")));
//! assert!(interceptor.api().is_paused());
//!
//! interceptor.api().resume();
//! assert_eq!(history.current_location().path, "/elsewhere");
//! ```

use crate::config::{ConfigOverrides, PauseConfig};
use crate::coordinator::{NavigationApi, PauseCoordinator};
use crate::fingerprint::fingerprint;
use crate::handler::Handler;
use crate::history::{History, Subscription};
use crate::location::{Action, Location, TransitionAttempt};
use crate::logging::{debug_log, trace_log};
use crate::spawn::Spawner;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

// ============================================================================
// Interception outcome
// ============================================================================

/// Why an intercepted transition was allowed or blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Same page and same anchor as the current location. Blocked.
    SameLocation,
    /// Self-issued navigation passing through the loop guard. Allowed.
    LoopGuard,
    /// Anchor-only change with bookmarks allowed. Allowed.
    Bookmark,
    /// No handler registered. Allowed.
    Unguarded,
    /// The coordinator decided.
    Decided(bool),
}

impl Interception {
    /// The strict boolean handed back to the routing subsystem.
    pub fn allows(self) -> bool {
        match self {
            Interception::SameLocation => false,
            Interception::LoopGuard | Interception::Bookmark | Interception::Unguarded => true,
            Interception::Decided(allowed) => allowed,
        }
    }
}

/// Apply the checks that run before any handler is consulted.
///
/// `consume_guard` is only called once the attempt is known to be a real
/// change, so an armed guard is never spent on a same-location event.
pub(crate) fn screen(
    current: &Location,
    location: &Location,
    config: PauseConfig,
    consume_guard: impl FnOnce() -> bool,
) -> Option<Interception> {
    let page_changed = fingerprint(location) != fingerprint(current);
    let anchor_changed = location.anchor != current.anchor;

    if !page_changed && !anchor_changed {
        Some(Interception::SameLocation)
    } else if consume_guard() {
        Some(Interception::LoopGuard)
    } else if !page_changed && config.allow_bookmarks {
        Some(Interception::Bookmark)
    } else {
        None
    }
}

// ============================================================================
// NavigationInterceptor
// ============================================================================

/// Subscribes a handler to the routing subsystem's before-transition event.
///
/// Dropping the interceptor unsubscribes it.
pub struct NavigationInterceptor {
    shared: Rc<Shared>,
}

struct Shared {
    history: Rc<dyn History>,
    coordinator: PauseCoordinator,
    /// `Some` exactly while `subscription` is active.
    handler: RefCell<Option<Handler>>,
    config: Cell<PauseConfig>,
    subscription: RefCell<Subscription>,
}

impl Shared {
    fn intercept(&self, location: &Location, action: Action) -> Interception {
        let current = self.history.current_location();
        let screened = screen(&current, location, self.config.get(), || {
            self.coordinator.loop_guard().consume()
        });

        let outcome = match screened {
            Some(outcome) => outcome,
            None => {
                let handler = self.handler.borrow().clone();
                match handler {
                    Some(handler) => Interception::Decided(self.coordinator.decide(
                        &handler,
                        TransitionAttempt::new(location.clone(), action),
                    )),
                    None => Interception::Unguarded,
                }
            }
        };
        trace_log!("{} '{}' -> {:?}", action, location, outcome);
        outcome
    }

    fn release(&self) {
        let mut subscription = std::mem::take(&mut *self.subscription.borrow_mut());
        let handler = self.handler.replace(None);
        if subscription.is_active() {
            debug_log!(
                "Unsubscribed navigation handler {:?}",
                handler.as_ref().and_then(Handler::name)
            );
        }
        subscription.release();
    }
}

impl NavigationInterceptor {
    /// Create an unsubscribed interceptor.
    pub fn new(history: Rc<dyn History>, spawner: Rc<dyn Spawner>) -> Self {
        let coordinator = PauseCoordinator::new(Rc::clone(&history), spawner);
        Self {
            shared: Rc::new(Shared {
                history,
                coordinator,
                handler: RefCell::new(None),
                config: Cell::new(PauseConfig::default()),
                subscription: RefCell::new(Subscription::empty()),
            }),
        }
    }

    /// Reconcile the subscription with the caller's current settings.
    ///
    /// - `enabled == false` or no handler: unsubscribe.
    /// - a handler that is not [`same_as`](Handler::same_as) the active one:
    ///   re-subscribe with it.
    /// - the same logical handler: keep the subscription and adopt the new
    ///   closure.
    ///
    /// The configuration is re-resolved from `overrides` on every call.
    pub fn update(&self, handler: Option<Handler>, enabled: bool, overrides: &ConfigOverrides) {
        self.shared.config.set(overrides.resolve());

        if !enabled {
            self.unsubscribe();
            return;
        }

        let current = self.shared.handler.borrow().clone();
        match (current, handler) {
            (None, None) => {}
            (Some(_), None) => self.unsubscribe(),
            (None, Some(next)) => self.block(next),
            (Some(current), Some(next)) => {
                if next.same_as(&current) {
                    self.shared.handler.replace(Some(next));
                } else {
                    self.block(next);
                }
            }
        }
    }

    /// Subscribe `handler`, following the same rules as [`update`](Self::update).
    pub fn subscribe(&self, handler: Handler, enabled: bool, overrides: &ConfigOverrides) {
        self.update(Some(handler), enabled, overrides);
    }

    /// Remove the listener from the routing subsystem. Idempotent.
    ///
    /// A transition that is already paused stays paused and can still be
    /// resumed or cancelled through the API.
    pub fn unsubscribe(&self) {
        self.shared.release();
    }

    fn block(&self, handler: Handler) {
        self.shared.release();
        debug_log!("Subscribing navigation handler {:?}", handler.name());
        self.shared.handler.replace(Some(handler));

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let subscription = self
            .shared
            .history
            .on_before_transition(Rc::new(move |location: &Location, action: Action| {
                weak.upgrade()
                    .map_or(true, |shared| shared.intercept(location, action).allows())
            }));
        *self.shared.subscription.borrow_mut() = subscription;
    }

    /// Whether a listener is registered with the routing subsystem.
    pub fn is_subscribed(&self) -> bool {
        self.shared.subscription.borrow().is_active()
    }

    /// The active handler.
    pub fn handler(&self) -> Option<Handler> {
        self.shared.handler.borrow().clone()
    }

    /// The resolved configuration.
    pub fn config(&self) -> PauseConfig {
        self.shared.config.get()
    }

    /// The coordinator owning the pending transition.
    pub fn coordinator(&self) -> &PauseCoordinator {
        &self.shared.coordinator
    }

    /// The API handed to handlers.
    pub fn api(&self) -> NavigationApi {
        self.shared.coordinator.api()
    }

    /// Screen one transition attempt and report why it passed or not.
    ///
    /// This is what the registered listener runs.
    pub fn intercept(&self, location: &Location, action: Action) -> Interception {
        self.shared.intercept(location, action)
    }

    /// Screen one transition attempt; `false` vetoes it.
    pub fn before_transition(&self, location: &Location, action: Action) -> bool {
        self.intercept(location, action).allows()
    }
}

impl Drop for NavigationInterceptor {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl fmt::Debug for NavigationInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationInterceptor")
            .field("handler", &self.shared.handler.borrow())
            .field("config", &self.shared.config.get())
            .field("subscribed", &self.is_subscribed())
            .field("coordinator", &self.shared.coordinator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(href: &str) -> Location {
        Location::parse(href)
    }

    #[test]
    fn test_screen_same_location() {
        let outcome = screen(&at("/a#x"), &at("/a#x"), PauseConfig::default(), || {
            panic!("guard must not be consumed for same-location events")
        });
        assert_eq!(outcome, Some(Interception::SameLocation));
    }

    #[test]
    fn test_screen_guard_beats_bookmark() {
        let outcome = screen(&at("/a"), &at("/a#x"), PauseConfig::default(), || true);
        assert_eq!(outcome, Some(Interception::LoopGuard));
    }

    #[test]
    fn test_screen_bookmark() {
        let config = PauseConfig::default();
        assert_eq!(
            screen(&at("/a"), &at("/a#x"), config, || false),
            Some(Interception::Bookmark)
        );
        let config = config.allow_bookmarks(false);
        assert_eq!(screen(&at("/a"), &at("/a#x"), config, || false), None);
    }

    #[test]
    fn test_screen_page_change_goes_to_handler() {
        assert_eq!(
            screen(&at("/a"), &at("/b"), PauseConfig::default(), || false),
            None
        );
        // Page change plus anchor change is still a page change
        assert_eq!(
            screen(&at("/a#x"), &at("/b#y"), PauseConfig::default(), || false),
            None
        );
    }

    #[test]
    fn test_interception_allows() {
        assert!(!Interception::SameLocation.allows());
        assert!(Interception::LoopGuard.allows());
        assert!(Interception::Bookmark.allows());
        assert!(Interception::Unguarded.allows());
        assert!(Interception::Decided(true).allows());
        assert!(!Interception::Decided(false).allows());
    }
}
