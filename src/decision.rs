//! The decision protocol.
//!
//! A navigation handler answers with a [`Response`]. [`classify`] turns that
//! answer into a [`Verdict`]:
//!
//! | Response | Verdict |
//! |----------|---------|
//! | `Bool(true)` | [`Allow`](Verdict::Allow) |
//! | `Bool(false)` | [`Deny`](Verdict::Deny) |
//! | `Unspecified` | [`Allow`](Verdict::Allow) (no opinion) |
//! | `Pause` | [`Defer(None)`](Verdict::Defer) |
//! | `Deferred(future)` | [`Defer(Some(future))`](Verdict::Defer) |
//! | `Unrecognized(_)` | [`Invalid`](Verdict::Invalid), treated as allow |
//!
//! `Pause` is the synchronous "I'll decide later" answer: the handler keeps
//! the [`NavigationApi`](crate::NavigationApi) and calls `resume` or
//! `cancel` from a UI callback. `Deferred` carries a future whose
//! [`Settlement`] resumes or cancels the paused transition.
//!
//! # Examples
//!
//! ```
//! use navigator_pause::{classify, Response, Verdict};
//!
//! assert!(matches!(classify(Response::from(true)), Verdict::Allow));
//! assert!(matches!(classify(Response::from(false)), Verdict::Deny));
//! assert!(matches!(classify(Response::pause()), Verdict::Defer(None)));
//! assert!(matches!(
//!     classify(Response::defer(async { true })),
//!     Verdict::Defer(Some(_))
//! ));
//! ```

use crate::error::PauseError;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future produced by a handler that defers its decision.
pub type Deferred = Pin<Box<dyn Future<Output = Settlement>>>;

// ============================================================================
// Settlement
// ============================================================================

/// How a deferred decision finally settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Re-issue the paused transition.
    Resume,
    /// Drop the paused transition without navigating.
    Cancel,
}

impl From<bool> for Settlement {
    /// Only a literal `false` cancels.
    fn from(value: bool) -> Self {
        if value {
            Settlement::Resume
        } else {
            Settlement::Cancel
        }
    }
}

impl From<()> for Settlement {
    fn from((): ()) -> Self {
        Settlement::Resume
    }
}

impl<T: Into<Settlement>> From<Option<T>> for Settlement {
    fn from(value: Option<T>) -> Self {
        value.map_or(Settlement::Resume, Into::into)
    }
}

impl<T: Into<Settlement>, E: fmt::Display> From<Result<T, E>> for Settlement {
    /// An `Err` is a rejection and cancels.
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(v) => v.into(),
            Err(err) => {
                let err = PauseError::Rejected {
                    reason: err.to_string(),
                };
                crate::logging::debug_log!("{}", err);
                Settlement::Cancel
            }
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Raw answer returned by a navigation handler.
pub enum Response {
    /// `true` allows, `false` denies.
    Bool(bool),
    /// The handler expressed no opinion.
    Unspecified,
    /// Pause now; the handler will resume or cancel later.
    Pause,
    /// Pause until the future settles.
    Deferred(Deferred),
    /// Anything outside the protocol, kept for diagnostics.
    Unrecognized(String),
}

impl Response {
    /// Allow the transition.
    pub fn allow() -> Self {
        Response::Bool(true)
    }

    /// Deny the transition.
    pub fn deny() -> Self {
        Response::Bool(false)
    }

    /// Pause the transition without a future.
    pub fn pause() -> Self {
        Response::Pause
    }

    /// Pause the transition until `future` settles.
    pub fn defer<F>(future: F) -> Self
    where
        F: Future + 'static,
        F::Output: Into<Settlement>,
    {
        Response::Deferred(Box::pin(async move { future.await.into() }))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => f.debug_tuple("Response::Bool").field(b).finish(),
            Self::Unspecified => write!(f, "Response::Unspecified"),
            Self::Pause => write!(f, "Response::Pause"),
            Self::Deferred(_) => write!(f, "Response::Deferred(..)"),
            Self::Unrecognized(v) => f.debug_tuple("Response::Unrecognized").field(v).finish(),
        }
    }
}

impl From<bool> for Response {
    fn from(value: bool) -> Self {
        Response::Bool(value)
    }
}

impl From<()> for Response {
    fn from((): ()) -> Self {
        Response::Unspecified
    }
}

impl From<Deferred> for Response {
    fn from(future: Deferred) -> Self {
        Response::Deferred(future)
    }
}

impl From<Value> for Response {
    /// `Bool` and `Null` map onto the protocol; any other JSON value is
    /// unrecognized.
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Response::Bool(b),
            Value::Null => Response::Pause,
            other => Response::Unrecognized(other.to_string()),
        }
    }
}

impl<R: Into<Response>, E: fmt::Display> From<Result<R, E>> for Response {
    /// A handler error falls back to allowing the transition.
    fn from(value: Result<R, E>) -> Self {
        match value {
            Ok(r) => r.into(),
            Err(err) => {
                let err = PauseError::HandlerFailed {
                    message: err.to_string(),
                };
                crate::logging::warn_log!("{}", err);
                Response::Unspecified
            }
        }
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Classified outcome of a handler response.
pub enum Verdict {
    /// Let the transition through.
    Allow,
    /// Block the transition.
    Deny,
    /// Block the transition for now and remember it for a later resume.
    Defer(Option<Deferred>),
    /// Unrecognised response; callers treat it as [`Allow`](Self::Allow).
    Invalid(String),
}

impl Verdict {
    /// Whether the transition may proceed right now.
    ///
    /// `Invalid` fails open.
    pub fn permits(&self) -> bool {
        matches!(self, Verdict::Allow | Verdict::Invalid(_))
    }

    /// Whether this verdict creates a pending transition.
    pub fn is_defer(&self) -> bool {
        matches!(self, Verdict::Defer(_))
    }
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "Verdict::Allow"),
            Self::Deny => write!(f, "Verdict::Deny"),
            Self::Defer(None) => write!(f, "Verdict::Defer(None)"),
            Self::Defer(Some(_)) => write!(f, "Verdict::Defer(Some(..))"),
            Self::Invalid(v) => f.debug_tuple("Verdict::Invalid").field(v).finish(),
        }
    }
}

/// Map a handler response onto a verdict.
pub fn classify(response: Response) -> Verdict {
    match response {
        Response::Bool(true) | Response::Unspecified => Verdict::Allow,
        Response::Bool(false) => Verdict::Deny,
        Response::Pause => Verdict::Defer(None),
        Response::Deferred(future) => Verdict::Defer(Some(future)),
        Response::Unrecognized(value) => Verdict::Invalid(value),
    }
}
