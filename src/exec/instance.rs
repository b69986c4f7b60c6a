// src/exec/instance.rs

//! The per-run script state machine.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::{BoxFuture, Client};
use crate::exec::rendezvous::ResumeSignal;
use crate::exec::runner::run_script;
use crate::lang::ParseFn;
use crate::repo::{HighlightRepository, VariableRepository};
use crate::types::{ScriptId, ScriptStatus, StatusChange};

/// Completion callback, invoked exactly once when a started instance stops.
pub type OnStop = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// One run of one script.
///
/// Status moves `NotStarted -> Running`, `Running <-> Suspended`, and from
/// any state to `Stopped`, which is final. Each instance runs at most one
/// execution task.
pub struct ScriptInstance {
    id: ScriptId,
    name: String,
    path: PathBuf,
    source: String,
    parse: ParseFn,
    variables: Arc<dyn VariableRepository>,
    highlights: Arc<dyn HighlightRepository>,
    status: watch::Sender<ScriptStatus>,
    resume: ResumeSignal,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
    finished: watch::Sender<bool>,
    status_events: Option<broadcast::Sender<StatusChange>>,
}

impl std::fmt::Debug for ScriptInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl ScriptInstance {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source: String,
        parse: ParseFn,
        variables: Arc<dyn VariableRepository>,
        highlights: Arc<dyn HighlightRepository>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            path: path.into(),
            source,
            parse,
            variables,
            highlights,
            status: watch::Sender::new(ScriptStatus::NotStarted),
            resume: ResumeSignal::new(),
            cancel: Mutex::new(None),
            finished: watch::Sender::new(false),
            status_events: None,
        }
    }

    /// Report every status change on `tx` as well.
    pub fn with_status_events(mut self, tx: broadcast::Sender<StatusChange>) -> Self {
        self.status_events = Some(tx);
        self
    }

    pub fn id(&self) -> ScriptId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ScriptStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ScriptStatus> {
        self.status.subscribe()
    }

    /// Start executing on a new tokio task.
    ///
    /// Must be called from within a tokio runtime. Starting an instance that
    /// was already stopped only runs `on_stop`; starting a live instance again
    /// is ignored.
    pub fn start(self: &Arc<Self>, client: Arc<dyn Client>, argument_string: &str, on_stop: OnStop) {
        let mut cancel = self.lock_cancel();

        if !self.transition(|s| (s == ScriptStatus::NotStarted).then_some(ScriptStatus::Running)) {
            match self.status() {
                ScriptStatus::Stopped => {
                    debug!(script = %self.name, id = %self.id, "start on stopped instance");
                    drop(cancel);
                    let done = self.finished.clone();
                    tokio::spawn(async move {
                        on_stop().await;
                        done.send_replace(true);
                    });
                }
                status => {
                    warn!(script = %self.name, id = %self.id, %status, "instance already started; ignoring start");
                }
            }
            return;
        }

        let (cancel_tx, cancel_rx) = oneshot::channel();
        *cancel = Some(cancel_tx);
        drop(cancel);

        tokio::spawn(run_script(
            Arc::clone(self),
            client,
            argument_string.to_string(),
            cancel_rx,
            on_stop,
        ));
    }

    /// Stop from any state. Safe to call repeatedly and from any task; a
    /// blocked resume wait or statement wait is abandoned.
    pub fn stop(&self) {
        let mut cancel = self.lock_cancel();
        self.transition(|_| Some(ScriptStatus::Stopped));
        if let Some(tx) = cancel.take() {
            let _ = tx.send(());
        }
    }

    /// `Running -> Suspended`; no-op in any other state.
    pub fn suspend(&self) {
        self.transition(|s| (s == ScriptStatus::Running).then_some(ScriptStatus::Suspended));
    }

    /// `Suspended -> Running`, waking the execution task if it is waiting.
    /// No-op in any other state.
    pub fn resume(&self) {
        if self.transition(|s| (s == ScriptStatus::Suspended).then_some(ScriptStatus::Running)) {
            self.resume.signal();
        }
    }

    /// Wait until the instance has stopped and its completion callback has
    /// returned. Returns immediately for an instance that has finished.
    pub async fn join(&self) {
        let mut rx = self.finished.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn parser(&self) -> ParseFn {
        self.parse
    }

    pub(crate) fn variables(&self) -> &Arc<dyn VariableRepository> {
        &self.variables
    }

    pub(crate) fn highlights(&self) -> &Arc<dyn HighlightRepository> {
        &self.highlights
    }

    /// Block while suspended. Returns at once when not suspended.
    pub(crate) async fn wait_while_suspended(&self) {
        self.resume
            .wait_while(|| *self.status.borrow() == ScriptStatus::Suspended)
            .await;
    }

    pub(crate) fn mark_stopped(&self) {
        let mut cancel = self.lock_cancel();
        self.transition(|_| Some(ScriptStatus::Stopped));
        cancel.take();
    }

    pub(crate) fn mark_finished(&self) {
        self.finished.send_replace(true);
    }

    fn lock_cancel(&self) -> MutexGuard<'_, Option<oneshot::Sender<()>>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `next` atomically. Returns true if the status changed.
    fn transition(&self, next: impl FnOnce(ScriptStatus) -> Option<ScriptStatus>) -> bool {
        let mut changed_to = None;
        self.status.send_if_modified(|status| match next(*status) {
            Some(new) if new != *status => {
                *status = new;
                changed_to = Some(new);
                true
            }
            _ => false,
        });

        let Some(status) = changed_to else {
            return false;
        };

        debug!(script = %self.name, id = %self.id, %status, "status changed");
        if let Some(tx) = &self.status_events {
            // No subscribers is fine.
            let _ = tx.send(StatusChange {
                id: self.id,
                name: self.name.clone(),
                status,
            });
        }
        true
    }
}
