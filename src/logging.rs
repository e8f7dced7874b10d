//! Logging abstraction layer.
//!
//! The interceptor and coordinator log through these macros so the crate can
//! sit on either the [`log`](https://docs.rs/log) or the
//! [`tracing`](https://docs.rs/tracing) ecosystem. Enable one of the two
//! features. With both enabled every record goes to both backends, and with
//! neither the macros expand to nothing.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! Levels used by the crate:
//!
//! - `trace_log!`: every intercepted transition and its outcome.
//! - `debug_log!`: subscribe/unsubscribe, defer, resume, cancel, manual push/replace.
//! - `warn_log!`: invalid handler responses, handler panics and handler errors.
//!
//! `info_log!` and `error_log!` round out the set for the registry.

macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

#[allow(unused_macros)]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

#[allow(unused_macros)]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}

#[allow(unused_imports)]
pub(crate) use {debug_log, error_log, info_log, trace_log, warn_log};
