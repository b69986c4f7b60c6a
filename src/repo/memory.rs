// src/repo/memory.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::{HighlightRepository, VariableRepository};
use crate::client::BoxFuture;
use crate::types::{Highlight, Variable};

/// One `watch` channel per character; subscribers see every change.
#[derive(Debug)]
struct Channels<T> {
    by_character: Mutex<HashMap<String, watch::Sender<Vec<T>>>>,
}

impl<T> Default for Channels<T> {
    fn default() -> Self {
        Self {
            by_character: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> Channels<T> {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, watch::Sender<Vec<T>>>> {
        self.by_character
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, character_id: &str) -> watch::Receiver<Vec<T>> {
        self.lock()
            .entry(character_id.to_string())
            .or_insert_with(|| watch::Sender::new(Vec::new()))
            .subscribe()
    }

    fn modify(&self, character_id: &str, f: impl FnOnce(&mut Vec<T>)) {
        self.lock()
            .entry(character_id.to_string())
            .or_insert_with(|| watch::Sender::new(Vec::new()))
            .send_modify(f);
    }

    fn snapshot(&self, character_id: &str) -> Vec<T> {
        self.lock()
            .get(character_id)
            .map(|tx| tx.borrow().clone())
            .unwrap_or_default()
    }
}

/// Process-local variable storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryVariableRepository {
    channels: Channels<Variable>,
}

impl InMemoryVariableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a variable without going through the async API.
    pub fn insert(&self, character_id: &str, name: &str, value: &str) {
        self.channels
            .modify(character_id, |vars| upsert_variable(vars, name, value));
    }

    pub fn variables(&self, character_id: &str) -> Vec<Variable> {
        self.channels.snapshot(character_id)
    }
}

fn upsert_variable(vars: &mut Vec<Variable>, name: &str, value: &str) {
    let key = name.to_lowercase();
    match vars.iter_mut().find(|v| v.name.to_lowercase() == key) {
        Some(existing) => existing.value = value.to_string(),
        None => vars.push(Variable::new(name, value)),
    }
}

impl VariableRepository for InMemoryVariableRepository {
    fn observe_character_variables(&self, character_id: &str) -> watch::Receiver<Vec<Variable>> {
        self.channels.subscribe(character_id)
    }

    fn put_variable(
        &self,
        character_id: String,
        name: String,
        value: String,
    ) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            debug!(character = %character_id, variable = %name, "storing variable");
            self.insert(&character_id, &name, &value);
            Ok(())
        })
    }

    fn delete_variable(
        &self,
        character_id: String,
        name: String,
    ) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            debug!(character = %character_id, variable = %name, "deleting variable");
            let key = name.to_lowercase();
            self.channels.modify(&character_id, |vars| {
                vars.retain(|v| v.name.to_lowercase() != key);
            });
            Ok(())
        })
    }
}

/// Process-local highlight storage.
#[derive(Debug, Default)]
pub struct InMemoryHighlightRepository {
    channels: Channels<Highlight>,
}

impl InMemoryHighlightRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlights(&self, character_id: &str) -> Vec<Highlight> {
        self.channels.snapshot(character_id)
    }
}

impl HighlightRepository for InMemoryHighlightRepository {
    fn observe_highlights(&self, character_id: &str) -> watch::Receiver<Vec<Highlight>> {
        self.channels.subscribe(character_id)
    }

    fn save_highlight(
        &self,
        character_id: String,
        highlight: Highlight,
    ) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            self.channels.modify(&character_id, |rules| {
                rules.retain(|h| h.pattern != highlight.pattern);
                rules.push(highlight);
            });
            Ok(())
        })
    }

    fn delete_highlight(
        &self,
        character_id: String,
        pattern: String,
    ) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            self.channels
                .modify(&character_id, |rules| rules.retain(|h| h.pattern != pattern));
            Ok(())
        })
    }
}
