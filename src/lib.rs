//! # navigator-pause
//!
//! Intercept in-app navigation and hold **one** transition at a time while
//! something else decides whether it may go ahead, e.g. "don't leave this
//! page until the unsaved form is confirmed".
//!
//! The crate does not route. It sits between a routing subsystem (anything
//! implementing [`History`]) and a caller-supplied [`Handler`]:
//!
//! ```text
//! History ──before-transition──▶ NavigationInterceptor
//!                                   │ same location? loop guard? bookmark?
//!                                   ▼
//!                              PauseCoordinator ──▶ Handler ──▶ Response
//!                                   │                            │
//!                                   │◀──── classify (Verdict) ───┘
//!                                   ▼
//!                 allow / deny / defer (+ later resume or cancel)
//! ```
//!
//! ## Handler answers
//!
//! | Answer | Effect |
//! |--------|--------|
//! | `true` / `()` | allow |
//! | `false` | deny |
//! | [`Response::pause()`] | deny for now, keep it pending for [`NavigationApi::resume`] |
//! | [`Response::defer(future)`](Response::defer) | deny for now, resume or cancel when the future settles |
//!
//! ## Example
//!
//! ```
//! use navigator_pause::*;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let history = MemoryHistory::new();
//! let interceptor = NavigationInterceptor::new(
//!     Rc::new(history.clone()),
//!     Rc::new(|_task: LocalTask| {}),
//! );
//!
//! let dirty = Rc::new(Cell::new(true));
//! let form_dirty = Rc::clone(&dirty);
//! interceptor.update(
//!     Some(Handler::named("unsaved-form", move |_api, _location, _action| {
//!         if form_dirty.get() { Response::pause() } else { Response::allow() }
//!     })),
//!     true,
//!     &ConfigOverrides::default(),
//! );
//!
//! // The user clicks a link: blocked and remembered
//! assert!(!history.push(Location::new("/next")));
//! let api = interceptor.api();
//! assert_eq!(api.paused_location().map(|l| l.path), Some("/next".to_string()));
//!
//! // The user confirms the dialog
//! api.resume();
//! assert_eq!(history.current_location().path, "/next");
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Purpose |
//! |---------|---------|---------|
//! | `log` | yes | log through the `log` crate |
//! | `tracing` | no | log through the `tracing` crate |
//! | `registry` | yes | [`BlockerRegistry`] for several named subscribers |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod logging;

pub mod config;
pub mod coordinator;
pub mod decision;
pub mod error;
pub mod fingerprint;
pub mod handler;
pub mod history;
pub mod interceptor;
pub mod location;
pub mod loop_guard;
#[cfg(feature = "registry")]
#[cfg_attr(docsrs, doc(cfg(feature = "registry")))]
pub mod registry;
pub mod spawn;

pub use config::{ConfigOverrides, PauseConfig};
pub use coordinator::{NavigationApi, PauseCoordinator, PendingTransition, Phase};
pub use decision::{classify, Deferred, Response, Settlement, Verdict};
pub use error::{PauseError, Result};
pub use fingerprint::{fingerprint, Fingerprint};
pub use handler::{handler_fn, Handler};
pub use history::{History, MemoryHistory, Subscription, TransitionListener, Unblock};
pub use interceptor::{Interception, NavigationInterceptor};
pub use location::{Action, Location, ParseActionError, TransitionAttempt};
pub use loop_guard::LoopGuard;
#[cfg(feature = "registry")]
pub use registry::BlockerRegistry;
pub use spawn::{LocalTask, Spawner};
