//! Test utilities for interception tests
//!
//! Provides a recording routing subsystem, a manual task queue and handler
//! helpers shared by the integration tests.

#![allow(dead_code)]

use navigator_pause::*;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

/// A navigation call issued through the `History` trait.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCall {
    Back,
    Push(Location),
    Replace(Location),
}

/// Routing subsystem double.
///
/// Navigation calls are only recorded; they do not fire listeners. Tests
/// simulate the follow-up before-transition event with [`fire`](Self::fire).
pub struct RecordingHistory {
    location: RefCell<Location>,
    listeners: Rc<RefCell<Vec<(u64, TransitionListener)>>>,
    next_id: Cell<u64>,
    calls: RefCell<Vec<HistoryCall>>,
    blocks: Cell<usize>,
    unblocks: Rc<Cell<usize>>,
}

impl RecordingHistory {
    pub fn new() -> Rc<Self> {
        Self::at(Location::new("/"))
    }

    pub fn at(location: Location) -> Rc<Self> {
        Rc::new(Self {
            location: RefCell::new(location),
            listeners: Rc::default(),
            next_id: Cell::new(0),
            calls: RefCell::new(Vec::new()),
            blocks: Cell::new(0),
            unblocks: Rc::new(Cell::new(0)),
        })
    }

    /// Deliver a before-transition event; `true` when no listener vetoed.
    pub fn fire(&self, location: &Location, action: Action) -> bool {
        let listeners: Vec<TransitionListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        listeners.iter().all(|listener| listener(location, action))
    }

    pub fn set_location(&self, location: Location) {
        *self.location.borrow_mut() = location;
    }

    pub fn calls(&self) -> Vec<HistoryCall> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Times `on_before_transition` was called.
    pub fn block_count(&self) -> usize {
        self.blocks.get()
    }

    /// Times an unblock closure actually ran.
    pub fn unblock_count(&self) -> usize {
        self.unblocks.get()
    }
}

impl History for RecordingHistory {
    fn current_location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn on_before_transition(&self, listener: TransitionListener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.blocks.set(self.blocks.get() + 1);
        self.listeners.borrow_mut().push((id, listener));

        let listeners = Rc::clone(&self.listeners);
        let unblocks = Rc::clone(&self.unblocks);
        Subscription::new(move || {
            unblocks.set(unblocks.get() + 1);
            listeners.borrow_mut().retain(|(other, _)| *other != id);
        })
    }

    fn go_back(&self) {
        self.calls.borrow_mut().push(HistoryCall::Back);
    }

    fn push_to(&self, location: Location) {
        self.calls.borrow_mut().push(HistoryCall::Push(location));
    }

    fn replace_with(&self, location: Location) {
        self.calls.borrow_mut().push(HistoryCall::Replace(location));
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Manual executor: tasks run only when the test asks.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<Vec<LocalTask>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawner(&self) -> Rc<dyn Spawner> {
        let tasks = Rc::clone(&self.tasks);
        Rc::new(move |task: LocalTask| tasks.borrow_mut().push(task))
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Poll every queued task until none makes progress; pending ones stay queued.
    pub fn run_until_stalled(&self) {
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        loop {
            let batch: Vec<LocalTask> = self.tasks.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                return;
            }
            let mut progressed = false;
            for mut task in batch {
                match Future::poll(task.as_mut(), &mut cx) {
                    Poll::Ready(()) => progressed = true,
                    Poll::Pending => self.tasks.borrow_mut().push(task),
                }
            }
            if !progressed {
                return;
            }
        }
    }
}

/// Interceptor wired to a fresh recording history and task queue.
pub struct Harness {
    pub history: Rc<RecordingHistory>,
    pub queue: TaskQueue,
    pub interceptor: NavigationInterceptor,
}

impl Harness {
    pub fn new() -> Self {
        let history = RecordingHistory::new();
        let queue = TaskQueue::new();
        let interceptor = NavigationInterceptor::new(history.clone(), queue.spawner());
        Self {
            history,
            queue,
            interceptor,
        }
    }

    /// Subscribe `handler` with default configuration.
    pub fn with_handler(handler: Handler) -> Self {
        let harness = Self::new();
        harness
            .interceptor
            .update(Some(handler), true, &ConfigOverrides::default());
        harness
    }

    pub fn fire(&self, href: &str, action: Action) -> bool {
        self.history.fire(&Location::parse(href), action)
    }
}

/// Handler that counts its invocations and answers with `answer`.
pub fn counting_handler<R, F>(answer: F) -> (Handler, Rc<Cell<usize>>)
where
    F: Fn(&NavigationApi, &Location, Action) -> R + 'static,
    R: Into<Response>,
{
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    let handler = handler_fn(move |api: &NavigationApi, location: &Location, action: Action| {
        counter.set(counter.get() + 1);
        answer(api, location, action)
    });
    (handler, count)
}

/// Handler that keeps the API it receives so tests can act "later".
pub fn api_keeping_handler<R, F>(answer: F) -> (Handler, Rc<RefCell<Option<NavigationApi>>>)
where
    F: Fn(&Location, Action) -> R + 'static,
    R: Into<Response>,
{
    let slot = Rc::new(RefCell::new(None));
    let keep = Rc::clone(&slot);
    let handler = handler_fn(move |api: &NavigationApi, location: &Location, action: Action| {
        *keep.borrow_mut() = Some(api.clone());
        answer(location, action)
    });
    (handler, slot)
}

/// Route crate logs to the test output; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn loc(href: &str) -> Location {
    Location::parse(href)
}
