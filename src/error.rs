//! Error types.
//!
//! Most operations in this crate are infallible by contract: resuming with
//! nothing paused, cancelling twice, or unsubscribing when not subscribed are
//! silent no-ops, and a failing handler falls back to allowing the
//! transition. [`PauseError`] therefore shows up in two places:
//!
//! - as the value logged when a handler misbehaves (panics, returns `Err`,
//!   returns something unrecognised, or has its deferred decision rejected);
//! - as the `Err` of registry management calls
//!   ([`BlockerRegistry::add`](crate::BlockerRegistry::add) and friends).
//!
//! # Examples
//!
//! ```
//! use navigator_pause::PauseError;
//!
//! let err = PauseError::DuplicateSubscriber { name: "form".into() };
//! assert_eq!(err.to_string(), "Subscriber already registered: form");
//! ```

use std::any::Any;
use std::fmt;

/// Errors produced while deciding or managing navigation blockers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseError {
    /// The handler panicked while deciding.
    HandlerPanicked { message: String },

    /// The handler returned an `Err`.
    HandlerFailed { message: String },

    /// The handler returned a value outside the decision protocol.
    InvalidResponse { value: String },

    /// A deferred decision settled with an error.
    Rejected { reason: String },

    /// A registry subscriber with this name already exists.
    DuplicateSubscriber { name: String },

    /// No registry subscriber with this name exists.
    UnknownSubscriber { name: String },
}

impl fmt::Display for PauseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseError::HandlerPanicked { message } => {
                write!(f, "Navigation handler panicked: {}", message)
            }
            PauseError::HandlerFailed { message } => {
                write!(f, "Navigation handler failed: {}", message)
            }
            PauseError::InvalidResponse { value } => {
                write!(
                    f,
                    "Invalid response from navigation handler: `{}`. Expected one of: \
                     true, false, (), pause, deferred",
                    value
                )
            }
            PauseError::Rejected { reason } => {
                write!(f, "Deferred navigation rejected: {}", reason)
            }
            PauseError::DuplicateSubscriber { name } => {
                write!(f, "Subscriber already registered: {}", name)
            }
            PauseError::UnknownSubscriber { name } => {
                write!(f, "Unknown subscriber: {}", name)
            }
        }
    }
}

impl std::error::Error for PauseError {}

impl PauseError {
    /// Build a [`HandlerPanicked`](Self::HandlerPanicked) error from a
    /// `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        PauseError::HandlerPanicked { message }
    }
}

/// Result alias used by fallible registry operations.
pub type Result<T> = std::result::Result<T, PauseError>;
