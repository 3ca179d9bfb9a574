//! Tests for hand-offs into the toolkit context from many threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use horizon_axbridge_core::{BridgeConfig, BridgeError, ToolkitContext};
use parking_lot::Mutex;

#[test]
fn test_concurrent_handoffs_are_serialized() {
    let context = ToolkitContext::new().unwrap();
    let counter = Arc::new(Mutex::new(0usize));
    let overlap = Arc::new(AtomicUsize::new(0));
    let inside = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for _ in 0..16 {
            let context = context.clone();
            let counter = counter.clone();
            let overlap = overlap.clone();
            let inside = inside.clone();
            scope.spawn(move || {
                for _ in 0..10 {
                    let counter = counter.clone();
                    let overlap = overlap.clone();
                    let inside = inside.clone();
                    context
                        .invoke_and_wait(move || {
                            if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                                overlap.fetch_add(1, Ordering::SeqCst);
                            }
                            *counter.lock() += 1;
                            inside.fetch_sub(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(*counter.lock(), 160);
    assert_eq!(overlap.load(Ordering::SeqCst), 0);
    context.stop_and_join();
}

#[test]
fn test_all_handoffs_run_on_context_thread() {
    let context = ToolkitContext::new().unwrap();
    let affinity = context.affinity();

    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let context = context.clone();
                scope.spawn(move || {
                    context
                        .invoke_and_wait(move || affinity.is_same_thread())
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.into_iter().all(|same| same));
    context.stop_and_join();
}

#[test]
fn test_timeout_then_recovery() {
    let config = BridgeConfig::builder()
        .handoff_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let context = ToolkitContext::with_config(&config).unwrap();

    context
        .post(|| std::thread::sleep(Duration::from_millis(200)))
        .unwrap();
    assert!(matches!(
        context.invoke_and_wait(|| 1),
        Err(BridgeError::CrossContextTimeout { timeout }) if timeout == Duration::from_millis(50)
    ));

    let value = context
        .invoke_with_timeout(Duration::from_secs(2), || 2)
        .unwrap();
    assert_eq!(value, 2);
    context.stop_and_join();
}

#[test]
fn test_nested_panicking_task_reports_handoff_panicked() {
    let context = ToolkitContext::new().unwrap();
    let nested = context.clone();

    let outcome = context
        .invoke_and_wait(move || {
            nested.invoke_and_wait(|| -> usize { panic!("header read failed") })
        })
        .unwrap();
    assert!(matches!(outcome, Err(BridgeError::HandoffPanicked)));

    // The context thread survived the panic.
    assert_eq!(context.invoke_and_wait(|| 7).unwrap(), 7);
    context.stop_and_join();
}
