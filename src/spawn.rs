//! Host executor seam.
//!
//! A deferred decision is a future that must be polled by whatever event
//! loop the host runs. The coordinator wraps it in a [`LocalTask`] and hands
//! it to a [`Spawner`]. Any `Fn(LocalTask)` closure is a spawner, so hooking
//! up tokio is a one-liner:
//!
//! ```ignore
//! use navigator_pause::{LocalTask, Spawner};
//! use std::rc::Rc;
//!
//! let spawner: Rc<dyn Spawner> = Rc::new(|task: LocalTask| {
//!     tokio::task::spawn_local(task);
//! });
//! ```

use std::future::Future;
use std::pin::Pin;

/// A `!Send` unit of work for the host event loop.
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs local tasks on the host's event loop.
pub trait Spawner {
    /// Schedule `task` to run to completion.
    fn spawn_local(&self, task: LocalTask);
}

impl<F> Spawner for F
where
    F: Fn(LocalTask),
{
    fn spawn_local(&self, task: LocalTask) {
        self(task);
    }
}
