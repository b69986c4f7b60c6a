// src/exec/rendezvous.rs

//! Single-slot wake-up used to resume a suspended script.

use tokio::sync::Notify;

/// A resume signal with no memory.
///
/// [`signal`](Self::signal) wakes whoever is currently waiting. A signal sent
/// while nobody waits is dropped, not stored for a later waiter.
#[derive(Debug, Default)]
pub struct ResumeSignal {
    notify: Notify,
}

impl ResumeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the current waiter, if any.
    pub fn signal(&self) {
        self.notify.notify_waiters();
    }

    /// Wait until `still_waiting` returns false, re-checking after each
    /// signal.
    ///
    /// The waiter registers before each check, so a signal sent between the
    /// check and the wait is not lost. Dropping the future cancels the wait.
    pub async fn wait_while(&self, mut still_waiting: impl FnMut() -> bool) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !still_waiting() {
                return;
            }
            notified.await;
        }
    }
}
