mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::timeout;

use mudscript::exec::ResumeSignal;

#[tokio::test]
async fn test_signal_without_waiter_is_dropped() {
    init_tracing();

    let signal = ResumeSignal::new();
    signal.signal();

    let waited = timeout(Duration::from_millis(100), signal.wait_while(|| true)).await;
    assert!(waited.is_err(), "an unheard signal must not be stored");
}

#[tokio::test]
async fn test_signal_wakes_current_waiter() {
    init_tracing();

    let signal = Arc::new(ResumeSignal::new());
    let blocked = Arc::new(AtomicBool::new(true));

    let waiter = {
        let signal = Arc::clone(&signal);
        let blocked = Arc::clone(&blocked);
        tokio::spawn(async move {
            signal
                .wait_while(|| blocked.load(Ordering::SeqCst))
                .await;
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    // A spurious wake-up re-checks and keeps waiting.
    signal.signal();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    blocked.store(false, Ordering::SeqCst);
    signal.signal();
    with_timeout(waiter).await.unwrap();
}

#[tokio::test]
async fn test_wait_while_returns_at_once_when_condition_is_false() {
    init_tracing();

    let signal = ResumeSignal::new();
    with_timeout(signal.wait_while(|| false)).await;
}
