//! End-to-end tests against the in-memory history
//!
//! Here navigation calls issued by the coordinator go back through the real
//! listener chain, so the loop guard and re-entrancy are exercised for real.

mod common;

use common::*;
use navigator_pause::{
    handler_fn, Action, ConfigOverrides, Handler, History, LocalTask, Location, MemoryHistory,
    NavigationInterceptor, Response, Spawner,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn setup(history: &MemoryHistory, handler: Handler) -> (NavigationInterceptor, TaskQueue) {
    init_logging();
    let queue = TaskQueue::new();
    let interceptor = NavigationInterceptor::new(Rc::new(history.clone()), queue.spawner());
    interceptor.update(Some(handler), true, &ConfigOverrides::default());
    (interceptor, queue)
}

fn paths(history: &MemoryHistory) -> Vec<String> {
    history.entries().into_iter().map(|l| l.path).collect()
}

// ========================================================================
// Unsaved form scenario
// ========================================================================

#[test]
fn test_unsaved_form_confirm_leaves_page() {
    let history = MemoryHistory::with_initial(loc("/form"));
    let dirty = Rc::new(Cell::new(true));
    let form_dirty = Rc::clone(&dirty);
    let (interceptor, _queue) = setup(
        &history,
        Handler::named("unsaved-form", move |_, _, _| {
            if form_dirty.get() {
                Response::pause()
            } else {
                Response::allow()
            }
        }),
    );

    assert!(!history.push(loc("/home")), "Dirty form blocks navigation");
    assert_eq!(paths(&history), vec!["/form"]);
    assert_eq!(interceptor.api().paused_location(), Some(loc("/home")));

    // User confirms the "discard changes?" dialog
    interceptor.api().resume();
    assert_eq!(paths(&history), vec!["/form", "/home"]);
    assert_eq!(history.current_location(), loc("/home"));
    assert!(!interceptor.api().is_paused());
    assert!(
        !interceptor.coordinator().loop_guard().is_armed(),
        "The resumed transition consumed the guard"
    );

    // Back to a clean page: navigation flows freely
    dirty.set(false);
    assert!(history.back());
    assert_eq!(history.current_location(), loc("/form"));
}

#[test]
fn test_unsaved_form_cancel_stays() {
    let history = MemoryHistory::with_initial(loc("/form"));
    let (interceptor, _queue) = setup(&history, handler_fn(|_, _, _| Response::pause()));

    assert!(!history.push(loc("/home")));
    interceptor.api().cancel();

    assert_eq!(paths(&history), vec!["/form"]);
    assert!(!interceptor.api().is_paused());
}

#[test]
fn test_reclicking_current_link_is_blocked() {
    let history = MemoryHistory::with_initial(loc("/form?draft=1"));
    let (_interceptor, _queue) = setup(&history, handler_fn(|_, _, _| true));

    assert!(!history.push(loc("/form?draft=1")));
    assert_eq!(history.len(), 1);
}

#[test]
fn test_anchor_jump_with_dirty_form() {
    let history = MemoryHistory::with_initial(loc("/guide"));
    let (_interceptor, _queue) = setup(&history, handler_fn(|_, _, _| false));

    assert!(history.push(loc("/guide#install")));
    assert_eq!(history.current_location().anchor, "install");
}

// ========================================================================
// History directions
// ========================================================================

#[test]
fn test_pop_resume_steps_back() {
    let history = MemoryHistory::with_initial(loc("/list"));
    assert!(history.push(loc("/detail")));

    let (interceptor, _queue) = setup(&history, handler_fn(|_, _, _| Response::pause()));

    assert!(!history.back());
    assert_eq!(history.current_location(), loc("/detail"));
    let pending = interceptor.coordinator().pending().map(|p| p.attempt().action);
    assert_eq!(pending, Some(Action::Pop));

    interceptor.api().resume();
    assert_eq!(history.current_location(), loc("/list"));
    assert!(history.can_go_forward());
}

#[test]
fn test_replace_resume_keeps_length() {
    let history = MemoryHistory::with_initial(loc("/step/1"));
    let (interceptor, _queue) = setup(&history, handler_fn(|_, _, _| Response::pause()));

    assert!(!history.replace(loc("/step/2")));
    interceptor.api().resume();

    assert_eq!(paths(&history), vec!["/step/2"]);
}

// ========================================================================
// Re-entrancy
// ========================================================================

#[test]
fn test_handler_redirect_during_decision() {
    let history = MemoryHistory::new();
    let (interceptor, _queue) = setup(
        &history,
        handler_fn(|api, location: &Location, _| {
            if location.path == "/admin" {
                api.push("/login", Some(json!({ "next": "/admin" })));
            }
            true
        }),
    );

    assert!(!history.push(loc("/admin")), "Original attempt is superseded");
    assert_eq!(paths(&history), vec!["/", "/login"]);
    assert_eq!(
        history.current_location().state,
        json!({ "next": "/admin" })
    );
    assert!(!interceptor.coordinator().loop_guard().is_armed());
}

#[test]
fn test_handler_resumes_previous_pause_while_deciding() {
    let history = MemoryHistory::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let (interceptor, _queue) = setup(
        &history,
        handler_fn(move |api, _, _| {
            counter.set(counter.get() + 1);
            if api.is_paused() {
                // Second click: go where the first click wanted to
                api.resume();
                return Response::allow();
            }
            Response::pause()
        }),
    );

    assert!(!history.push(loc("/first")));
    assert!(!history.push(loc("/second")), "Superseded by the resume");
    assert_eq!(paths(&history), vec!["/", "/first"]);
    assert_eq!(calls.get(), 2);
    assert!(!interceptor.api().is_paused());
}

#[test]
fn test_unsubscribe_from_inside_handler() {
    let history = MemoryHistory::new();
    let queue = TaskQueue::new();
    let interceptor = Rc::new(NavigationInterceptor::new(
        Rc::new(history.clone()),
        queue.spawner(),
    ));

    let weak = Rc::downgrade(&interceptor);
    interceptor.update(
        Some(handler_fn(move |_, _, _| {
            if let Some(interceptor) = weak.upgrade() {
                interceptor.unsubscribe();
            }
            false
        })),
        true,
        &ConfigOverrides::default(),
    );

    assert!(!history.push(loc("/a")));
    assert_eq!(history.listener_count(), 0);
    assert!(history.push(loc("/a")));
}

// ========================================================================
// Deferred decisions
// ========================================================================

#[test]
fn test_deferred_resolution_through_memory_history() {
    let history = MemoryHistory::new();
    let (interceptor, queue) = setup(
        &history,
        handler_fn(|_, _, _| Response::defer(async { true })),
    );

    assert!(!history.push(loc("/next")));
    assert!(interceptor.api().is_paused());

    queue.run_until_stalled();
    assert_eq!(history.current_location(), loc("/next"));
    assert!(!interceptor.api().is_paused());
}

#[test]
fn test_deferred_after_interceptor_dropped_is_ignored() {
    let history = MemoryHistory::new();
    let (interceptor, queue) = setup(
        &history,
        handler_fn(|_, _, _| Response::defer(async { true })),
    );
    assert!(!history.push(loc("/next")));
    drop(interceptor);

    queue.run_until_stalled();
    assert_eq!(paths(&history), vec!["/"]);
    assert_eq!(history.listener_count(), 0);
}

#[tokio::test]
async fn test_deferred_decision_on_local_set() {
    init_logging();
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let history = MemoryHistory::new();
            let spawner: Rc<dyn Spawner> = Rc::new(|task: LocalTask| {
                tokio::task::spawn_local(task);
            });
            let interceptor = NavigationInterceptor::new(Rc::new(history.clone()), spawner);

            let (tx, rx) = tokio::sync::oneshot::channel::<bool>();
            let rx = RefCell::new(Some(rx));
            interceptor.update(
                Some(handler_fn(move |_, _, _| match rx.borrow_mut().take() {
                    Some(rx) => Response::defer(rx),
                    None => Response::deny(),
                })),
                true,
                &ConfigOverrides::default(),
            );

            assert!(!history.push(loc("/checkout")));
            assert!(interceptor.api().is_paused());

            tx.send(true).expect("receiver is alive");
            for _ in 0..16 {
                if !interceptor.api().is_paused() {
                    break;
                }
                tokio::task::yield_now().await;
            }

            assert!(!interceptor.api().is_paused());
            assert_eq!(history.current_location(), loc("/checkout"));
        })
        .await;
}

#[tokio::test]
async fn test_dropped_sender_cancels_on_local_set() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let history = MemoryHistory::new();
            let spawner: Rc<dyn Spawner> = Rc::new(|task: LocalTask| {
                tokio::task::spawn_local(task);
            });
            let interceptor = NavigationInterceptor::new(Rc::new(history.clone()), spawner);

            let (tx, rx) = tokio::sync::oneshot::channel::<bool>();
            let rx = RefCell::new(Some(rx));
            interceptor.update(
                Some(handler_fn(move |_, _, _| match rx.borrow_mut().take() {
                    Some(rx) => Response::defer(rx),
                    None => Response::allow(),
                })),
                true,
                &ConfigOverrides::default(),
            );

            assert!(!history.push(loc("/checkout")));
            drop(tx);
            for _ in 0..16 {
                if !interceptor.api().is_paused() {
                    break;
                }
                tokio::task::yield_now().await;
            }

            assert!(!interceptor.api().is_paused());
            assert_eq!(history.current_location(), loc("/"));
        })
        .await;
}
