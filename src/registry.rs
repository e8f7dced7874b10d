//! Multi-subscriber blocker registry.
//!
//! A [`BlockerRegistry`] lets several independent parts of an application
//! guard navigation at once (say, an editor and a settings panel) while the
//! routing subsystem only ever sees one listener. The registry is an
//! ordinary value: construct it wherever multi-subscriber support is needed
//! and drop it to detach.
//!
//! Every subscriber gets its own [`PauseCoordinator`], so each owns its own
//! pending transition and loop guard.
//!
//! # Policy
//!
//! For each transition the same-location, loop-guard and bookmark checks run
//! once. Subscribers are then consulted **in registration order**; the first
//! one that does not allow (it denies or defers) decides the event and later
//! subscribers are not asked. First to defer wins.
//!
//! The registry holds at most one paused transition. When a subscriber blocks
//! an event, every other subscriber's paused transition is cancelled.
//!
//! # Example
//!
//! ```
//! use navigator_pause::*;
//! use std::rc::Rc;
//!
//! let history = MemoryHistory::new();
//! let registry = BlockerRegistry::new(Rc::new(history.clone()), Rc::new(|_task: LocalTask| {}));
//!
//! registry.add("editor", handler_fn(|_api, _location, _action| Response::pause())).unwrap();
//! registry.add("panel", handler_fn(|_api, _location, _action| true)).unwrap();
//! assert!(registry.add("editor", handler_fn(|_api, _location, _action| true)).is_err());
//!
//! assert!(!history.push(Location::new("/next")));
//! assert!(registry.api("editor").unwrap().is_paused());
//! assert!(!registry.api("panel").unwrap().is_paused());
//! ```

use crate::config::{ConfigOverrides, PauseConfig};
use crate::coordinator::{NavigationApi, PauseCoordinator};
use crate::error::{PauseError, Result};
use crate::handler::Handler;
use crate::history::{History, Subscription};
use crate::interceptor::{screen, Interception};
use crate::location::{Action, Location, TransitionAttempt};
use crate::logging::{debug_log, error_log, info_log, trace_log};
use crate::spawn::Spawner;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone)]
struct Subscriber {
    name: String,
    handler: Handler,
    coordinator: PauseCoordinator,
}

struct RegistryShared {
    history: Rc<dyn History>,
    spawner: Rc<dyn Spawner>,
    config: Cell<PauseConfig>,
    subscribers: RefCell<Vec<Subscriber>>,
    subscription: RefCell<Subscription>,
}

impl RegistryShared {
    fn intercept(&self, location: &Location, action: Action) -> Interception {
        // Snapshot so handlers may add or remove subscribers while deciding
        let subscribers = self.subscribers.borrow().clone();
        let current = self.history.current_location();
        let screened = screen(&current, location, self.config.get(), || {
            subscribers
                .iter()
                .any(|subscriber| subscriber.coordinator.loop_guard().consume())
        });
        if let Some(outcome) = screened {
            trace_log!("{} '{}' -> {:?}", action, location, outcome);
            return outcome;
        }
        if subscribers.is_empty() {
            return Interception::Unguarded;
        }

        for (index, subscriber) in subscribers.iter().enumerate() {
            let attempt = TransitionAttempt::new(location.clone(), action);
            if !subscriber.coordinator.decide(&subscriber.handler, attempt) {
                debug_log!(
                    "Subscriber '{}' blocked {} '{}'",
                    subscriber.name,
                    action,
                    location
                );
                // At most one paused transition across the registry
                for (other_index, other) in subscribers.iter().enumerate() {
                    if other_index != index {
                        other.coordinator.cancel();
                    }
                }
                return Interception::Decided(false);
            }
        }
        trace_log!("{} '{}' allowed by all subscribers", action, location);
        Interception::Decided(true)
    }

    fn release(&self) {
        let mut subscription = std::mem::take(&mut *self.subscription.borrow_mut());
        subscription.release();
    }
}

/// Explicitly owned registry of named navigation blockers.
///
/// Dropping the registry removes its listener.
pub struct BlockerRegistry {
    shared: Rc<RegistryShared>,
}

impl BlockerRegistry {
    /// Create an empty registry.
    pub fn new(history: Rc<dyn History>, spawner: Rc<dyn Spawner>) -> Self {
        Self {
            shared: Rc::new(RegistryShared {
                history,
                spawner,
                config: Cell::new(PauseConfig::default()),
                subscribers: RefCell::new(Vec::new()),
                subscription: RefCell::new(Subscription::empty()),
            }),
        }
    }

    /// Builder-style [`set_config`](Self::set_config).
    pub fn with_config(self, overrides: &ConfigOverrides) -> Self {
        self.set_config(overrides);
        self
    }

    /// Re-resolve the shared configuration.
    pub fn set_config(&self, overrides: &ConfigOverrides) {
        self.shared.config.set(overrides.resolve());
    }

    /// The resolved configuration.
    pub fn config(&self) -> PauseConfig {
        self.shared.config.get()
    }

    /// Register `handler` under `name`.
    ///
    /// Returns the API bound to the new subscriber's coordinator. The shared
    /// listener is installed with the first subscriber.
    pub fn add(&self, name: impl Into<String>, handler: Handler) -> Result<NavigationApi> {
        let name = name.into();
        if self.contains(&name) {
            error_log!("Subscriber '{}' is already registered", name);
            return Err(PauseError::DuplicateSubscriber { name });
        }

        let coordinator =
            PauseCoordinator::new(Rc::clone(&self.shared.history), Rc::clone(&self.shared.spawner));
        let api = coordinator.api();
        info_log!("Registered navigation blocker '{}'", name);
        self.shared.subscribers.borrow_mut().push(Subscriber {
            name,
            handler,
            coordinator,
        });

        if !self.is_subscribed() {
            let weak: Weak<RegistryShared> = Rc::downgrade(&self.shared);
            let subscription = self.shared.history.on_before_transition(Rc::new(
                move |location: &Location, action: Action| {
                    weak.upgrade()
                        .map_or(true, |shared| shared.intercept(location, action).allows())
                },
            ));
            *self.shared.subscription.borrow_mut() = subscription;
        }
        Ok(api)
    }

    /// Remove the subscriber registered as `name`.
    ///
    /// The shared listener is released with the last subscriber. A paused
    /// transition owned by the removed subscriber is dropped with it.
    pub fn remove(&self, name: &str) -> Result<()> {
        let removed = {
            let mut subscribers = self.shared.subscribers.borrow_mut();
            let index = subscribers.iter().position(|s| s.name == name);
            index.map(|index| subscribers.remove(index))
        };
        let Some(removed) = removed else {
            return Err(PauseError::UnknownSubscriber {
                name: name.to_string(),
            });
        };
        removed.coordinator.cancel();
        info_log!("Removed navigation blocker '{}'", name);

        if self.is_empty() {
            self.shared.release();
        }
        Ok(())
    }

    /// Whether a subscriber named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.shared
            .subscribers
            .borrow()
            .iter()
            .any(|s| s.name == name)
    }

    /// Subscriber names in consultation order.
    pub fn names(&self) -> Vec<String> {
        self.shared
            .subscribers
            .borrow()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.shared.subscribers.borrow().is_empty()
    }

    /// The API of the subscriber named `name`.
    pub fn api(&self, name: &str) -> Option<NavigationApi> {
        self.shared
            .subscribers
            .borrow()
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.coordinator.api())
    }

    /// Whether the shared listener is installed.
    pub fn is_subscribed(&self) -> bool {
        self.shared.subscription.borrow().is_active()
    }

    /// Screen one transition attempt against all subscribers.
    pub fn intercept(&self, location: &Location, action: Action) -> Interception {
        self.shared.intercept(location, action)
    }

    /// Screen one transition attempt; `false` vetoes it.
    pub fn before_transition(&self, location: &Location, action: Action) -> bool {
        self.intercept(location, action).allows()
    }
}

impl Drop for BlockerRegistry {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl fmt::Debug for BlockerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockerRegistry")
            .field("subscribers", &self.names())
            .field("config", &self.config())
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
