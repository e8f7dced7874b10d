//! Navigation handlers.
//!
//! A [`Handler`] is the caller's decision function. It receives the
//! [`NavigationApi`], the target location and the action, and answers with
//! anything convertible into a [`Response`].
//!
//! Callers often rebuild their handler closure on every render. Giving it a
//! name with [`Handler::named`] lets the interceptor recognise the new
//! closure as the same logical handler and keep its subscription instead of
//! re-subscribing each cycle.
//!
//! # Examples
//!
//! ```
//! use navigator_pause::{handler_fn, Handler, Response};
//!
//! let a = Handler::named("unsaved-form", |_api, _location, _action| Response::pause());
//! let b = Handler::named("unsaved-form", |_api, _location, _action| true);
//! assert!(a.same_as(&b));
//!
//! let c = handler_fn(|_api, _location, _action| false);
//! assert!(!c.same_as(&handler_fn(|_api, _location, _action| false)));
//! assert!(c.same_as(&c.clone()));
//! ```

use crate::coordinator::NavigationApi;
use crate::decision::Response;
use crate::location::{Action, Location};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

type HandlerFn = dyn Fn(&NavigationApi, &Location, Action) -> Response;

/// Caller-supplied navigation decision function.
#[derive(Clone)]
pub struct Handler {
    name: Option<Cow<'static, str>>,
    f: Rc<HandlerFn>,
}

impl Handler {
    /// Wrap an anonymous handler. Identity is the allocation.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&NavigationApi, &Location, Action) -> R + 'static,
        R: Into<Response>,
    {
        Self {
            name: None,
            f: Rc::new(move |api: &NavigationApi, location: &Location, action: Action| {
                f(api, location, action).into()
            }),
        }
    }

    /// Wrap a named handler. Handlers with the same name are equivalent.
    pub fn named<F, R>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&NavigationApi, &Location, Action) -> R + 'static,
        R: Into<Response>,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(f)
        }
    }

    /// The handler's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether `other` is the same logical handler.
    pub fn same_as(&self, other: &Handler) -> bool {
        if Rc::as_ptr(&self.f).cast::<()>() == Rc::as_ptr(&other.f).cast::<()>() {
            return true;
        }
        matches!((&self.name, &other.name), (Some(a), Some(b)) if a == b)
    }

    /// Invoke the handler.
    pub(crate) fn call(&self, api: &NavigationApi, location: &Location, action: Action) -> Response {
        (self.f)(api, location, action)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Create an anonymous [`Handler`] from a closure.
pub fn handler_fn<F, R>(f: F) -> Handler
where
    F: Fn(&NavigationApi, &Location, Action) -> R + 'static,
    R: Into<Response>,
{
    Handler::new(f)
}
