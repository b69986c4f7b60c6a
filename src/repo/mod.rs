// src/repo/mod.rs

//! Persistence collaborators consumed by scripts.
//!
//! How variables and highlights are stored is the host's business; the
//! runtime only needs a live view of one character's variables and a way to
//! write through to storage. [`memory`] holds the in-process implementations
//! used by the CLI and tests.

use tokio::sync::watch;

use crate::client::BoxFuture;
use crate::types::{Highlight, Variable};

pub mod memory;

pub use memory::{InMemoryHighlightRepository, InMemoryVariableRepository};

/// Storage for persisted, per-character variables.
pub trait VariableRepository: Send + Sync {
    /// Live list of a character's variables. The receiver sees every later
    /// write, from any script or from the host.
    fn observe_character_variables(&self, character_id: &str) -> watch::Receiver<Vec<Variable>>;

    /// Insert or overwrite a variable. Names compare case-insensitively.
    fn put_variable(
        &self,
        character_id: String,
        name: String,
        value: String,
    ) -> BoxFuture<'_, anyhow::Result<()>>;

    fn delete_variable(&self, character_id: String, name: String)
    -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Storage for per-character highlight rules.
pub trait HighlightRepository: Send + Sync {
    fn observe_highlights(&self, character_id: &str) -> watch::Receiver<Vec<Highlight>>;

    /// Add a rule; an existing rule with the same pattern is replaced.
    fn save_highlight(
        &self,
        character_id: String,
        highlight: Highlight,
    ) -> BoxFuture<'_, anyhow::Result<()>>;

    fn delete_highlight(
        &self,
        character_id: String,
        pattern: String,
    ) -> BoxFuture<'_, anyhow::Result<()>>;
}
