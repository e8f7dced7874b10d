//! Interceptor configuration.
//!
//! [`PauseConfig`] is the resolved configuration; [`ConfigOverrides`] is what
//! callers pass in. The two are merged on every
//! [`NavigationInterceptor::update`](crate::NavigationInterceptor::update),
//! so a caller may change settings between render cycles.
//!
//! # Examples
//!
//! ```
//! use navigator_pause::{ConfigOverrides, PauseConfig};
//!
//! let config = PauseConfig::default().merged(&ConfigOverrides::new().allow_bookmarks(false));
//! assert!(!config.allow_bookmarks);
//!
//! // No overrides keeps the defaults
//! assert!(PauseConfig::default().merged(&ConfigOverrides::default()).allow_bookmarks);
//! ```

use serde::Deserialize;

/// Resolved interceptor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PauseConfig {
    /// Let anchor-only transitions through without asking the handler.
    pub allow_bookmarks: bool,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            allow_bookmarks: true,
        }
    }
}

impl PauseConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`allow_bookmarks`](Self::allow_bookmarks).
    pub fn allow_bookmarks(mut self, allow: bool) -> Self {
        self.allow_bookmarks = allow;
        self
    }

    /// Apply caller overrides on top of this configuration.
    pub fn merged(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            allow_bookmarks: overrides.allow_bookmarks.unwrap_or(self.allow_bookmarks),
        }
    }
}

/// Caller-supplied settings; `None` keeps the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    /// Override for [`PauseConfig::allow_bookmarks`].
    pub allow_bookmarks: Option<bool>,
}

impl ConfigOverrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override bookmark handling.
    pub fn allow_bookmarks(mut self, allow: bool) -> Self {
        self.allow_bookmarks = Some(allow);
        self
    }

    /// Merge onto [`PauseConfig::default`].
    pub fn resolve(&self) -> PauseConfig {
        PauseConfig::default().merged(self)
    }
}

impl From<PauseConfig> for ConfigOverrides {
    fn from(config: PauseConfig) -> Self {
        Self {
            allow_bookmarks: Some(config.allow_bookmarks),
        }
    }
}
