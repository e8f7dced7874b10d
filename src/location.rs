//! Locations, actions and transition attempts.
//!
//! A [`Location`] is the immutable snapshot the routing subsystem hands over
//! for every transition: path, query string, in-page anchor and an arbitrary
//! JSON `state` payload. An [`Action`] says how the transition was attempted
//! and a [`TransitionAttempt`] pairs the two.
//!
//! # Examples
//!
//! ```
//! use navigator_pause::{Action, Location};
//!
//! let location = Location::parse("/settings?tab=profile#email");
//! assert_eq!(location.path, "/settings");
//! assert_eq!(location.query, "tab=profile");
//! assert_eq!(location.anchor, "email");
//! assert_eq!(location.href(), "/settings?tab=profile#email");
//!
//! assert_eq!("POP".parse::<Action>().unwrap(), Action::Pop);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Location
// ============================================================================

/// Snapshot of a navigable location.
///
/// `query` and `anchor` are stored without their leading `?` / `#`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Path component, e.g. `/users/42`.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: String,
    /// In-page anchor (bookmark) without the leading `#`.
    pub anchor: String,
    /// Arbitrary state attached to the history entry.
    pub state: Value,
}

impl Location {
    /// Create a location with only a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse an href of the form `path?query#anchor`.
    ///
    /// Both the query and the anchor are optional. An empty path becomes `/`.
    pub fn parse(href: &str) -> Self {
        let (rest, anchor) = match href.split_once('#') {
            Some((rest, anchor)) => (rest, anchor),
            None => (href, ""),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };
        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query: query.to_string(),
            anchor: anchor.to_string(),
            state: Value::Null,
        }
    }

    /// Set the query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the anchor.
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Set the history state.
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    /// Render the location back into `path?query#anchor` form.
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if !self.query.is_empty() {
            href.push('?');
            href.push_str(&self.query);
        }
        if !self.anchor.is_empty() {
            href.push('#');
            href.push_str(&self.anchor);
        }
        href
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Self::parse(href)
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Self::parse(&href)
    }
}

// ============================================================================
// Action
// ============================================================================

/// Kind of transition being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// A new entry pushed onto the history stack.
    Push,
    /// The current entry replaced.
    Replace,
    /// Moving through existing entries (back/forward buttons).
    Pop,
}

impl Action {
    /// Router spelling of the action (`PUSH`, `REPLACE`, `POP`).
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Push => "PUSH",
            Action::Replace => "REPLACE",
            Action::Pop => "POP",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown navigation action: {}", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUSH" => Ok(Action::Push),
            "REPLACE" => Ok(Action::Replace),
            "POP" => Ok(Action::Pop),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

// ============================================================================
// TransitionAttempt
// ============================================================================

/// A single intercepted request to navigate.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionAttempt {
    /// Where the transition wants to go.
    pub location: Location,
    /// How it wants to get there.
    pub action: Action,
}

impl TransitionAttempt {
    /// Pair a location with the action attempting to reach it.
    pub fn new(location: Location, action: Action) -> Self {
        Self { location, action }
    }
}
