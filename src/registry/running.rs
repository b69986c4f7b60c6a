// src/registry/running.rs

//! The observable set of live script instances.

use std::sync::Arc;

use tokio::sync::watch;

use crate::exec::ScriptInstance;
use crate::types::ScriptId;

pub type RunningSnapshot = Arc<Vec<Arc<ScriptInstance>>>;

/// Copy-on-write list of running instances.
///
/// Every change builds a new list and publishes it atomically, so readers
/// always see a consistent snapshot and concurrent add/remove calls never
/// lose each other's updates.
#[derive(Debug, Clone)]
pub struct RunningScripts {
    tx: Arc<watch::Sender<RunningSnapshot>>,
}

impl Default for RunningScripts {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningScripts {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(Arc::new(Vec::new()))),
        }
    }

    pub fn add(&self, instance: Arc<ScriptInstance>) {
        self.tx.send_modify(|list| {
            let mut next = Vec::with_capacity(list.len() + 1);
            next.extend(list.iter().cloned());
            next.push(instance);
            *list = Arc::new(next);
        });
    }

    /// Remove by identity. Returns whether the instance was present.
    pub fn remove(&self, id: ScriptId) -> bool {
        self.tx.send_if_modified(|list| {
            if !list.iter().any(|i| i.id() == id) {
                return false;
            }
            let next: Vec<_> = list.iter().filter(|i| i.id() != id).cloned().collect();
            *list = Arc::new(next);
            true
        })
    }

    pub fn snapshot(&self) -> RunningSnapshot {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<RunningSnapshot> {
        self.tx.subscribe()
    }

    /// Resolves once no instance is running.
    pub async fn wait_empty(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|list| list.is_empty()).await;
    }
}
