//! Location fingerprints.
//!
//! A [`Fingerprint`] is a canonical string identity for a [`Location`] built
//! from its path, query and state. The anchor is deliberately left out:
//! jumping to a bookmark on the same page is not a page change, and the
//! interceptor handles it through its own bookmark exception.
//!
//! Fingerprints are only meant for equality checks. `serde_json` keeps
//! object keys sorted, so equal states always serialize identically.

use crate::location::Location;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Canonical identity of a location, excluding its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Access the serialized form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct Identity<'a> {
    path: &'a str,
    query: &'a str,
    state: &'a Value,
}

/// Compute the fingerprint of a location.
///
/// # Examples
///
/// ```
/// use navigator_pause::{fingerprint, Location};
///
/// let a = Location::parse("/page?x=1#top");
/// let b = Location::parse("/page?x=1#bottom");
/// assert_eq!(fingerprint(&a), fingerprint(&b));
/// assert_ne!(fingerprint(&a), fingerprint(&Location::parse("/page?x=2")));
/// ```
pub fn fingerprint(location: &Location) -> Fingerprint {
    let identity = Identity {
        path: &location.path,
        query: &location.query,
        state: &location.state,
    };
    // Borrowed strings and a `Value` always serialize
    let serialized = serde_json::to_string(&identity).unwrap_or_else(|_| {
        format!("{}?{}|{}", location.path, location.query, location.state)
    });
    Fingerprint(serialized)
}
