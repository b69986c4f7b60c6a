// src/context/scope.rs

//! Local and global variable scopes.
//!
//! Both scopes compare names case-insensitively. The session-property scope
//! has no type of its own: it is read straight from the client on every
//! access.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::errors::RuntimeError;
use crate::repo::VariableRepository;
use crate::types::Variable;

/// Variables private to one script run.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    vars: HashMap<String, String>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(&name.to_lowercase())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_lowercase(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(&name.to_lowercase())
    }

    /// Positional arguments `1..=N`, stopping at the first gap.
    pub fn positional(&self) -> Vec<String> {
        (1..)
            .map_while(|idx: usize| self.get(&idx.to_string()).map(str::to_string))
            .collect()
    }
}

/// Persisted variables of whichever character is active.
///
/// Holds a live subscription to the repository for the current character and
/// follows character changes: when the client's active character differs from
/// the subscribed one, the next access re-subscribes.
pub struct GlobalScope {
    character: watch::Receiver<Option<String>>,
    repository: Arc<dyn VariableRepository>,
    subscription: Option<(String, watch::Receiver<Vec<Variable>>)>,
}

impl GlobalScope {
    pub fn new(
        character: watch::Receiver<Option<String>>,
        repository: Arc<dyn VariableRepository>,
    ) -> Self {
        let mut scope = Self {
            character,
            repository,
            subscription: None,
        };
        scope.refresh();
        scope
    }

    pub fn character_id(&self) -> Option<String> {
        self.character.borrow().clone()
    }

    /// Value of `name` for the active character. `None` when there is no
    /// active character or the variable is unset.
    pub fn get(&mut self, name: &str) -> Option<String> {
        self.refresh();
        let (_, vars) = self.subscription.as_ref()?;
        let key = name.to_lowercase();
        vars.borrow()
            .iter()
            .find(|v| v.name.to_lowercase() == key)
            .map(|v| v.value.clone())
    }

    /// Write through to the repository. The subscription picks the change up
    /// whenever the repository publishes it.
    pub async fn set(&mut self, name: &str, value: String) -> Result<(), RuntimeError> {
        let character = self
            .character_id()
            .ok_or_else(|| RuntimeError::NoCharacter(format!("set global variable '{name}'")))?;
        self.repository
            .put_variable(character, name.to_string(), value)
            .await
            .map_err(|e| RuntimeError::Client(e.to_string()))
    }

    pub async fn delete(&mut self, name: &str) -> Result<(), RuntimeError> {
        let character = self
            .character_id()
            .ok_or_else(|| RuntimeError::NoCharacter(format!("delete global variable '{name}'")))?;
        self.repository
            .delete_variable(character, name.to_string())
            .await
            .map_err(|e| RuntimeError::Client(e.to_string()))
    }

    fn refresh(&mut self) {
        let current = self.character.borrow_and_update().clone();
        let subscribed = self.subscription.as_ref().map(|(id, _)| id.as_str());
        if current.as_deref() == subscribed {
            return;
        }

        debug!(character = ?current, "global scope following active character");
        self.subscription = current.map(|id| {
            let rx = self.repository.observe_character_variables(&id);
            (id, rx)
        });
    }
}
