// src/context/mod.rs

//! Per-run execution state: the line cursor and the three variable scopes.
//!
//! Name resolution for unscoped references is fixed:
//!
//! 1. local (positional arguments and script variables)
//! 2. global (the active character's persisted variables)
//! 3. session properties (exact, case-sensitive key)
//!
//! A `local.`, `global.` or `properties.` prefix restricts a reference to one
//! scope. Session properties can never be written.

pub mod scope;

use std::sync::Arc;

use tracing::debug;

use crate::args::split_arguments;
use crate::client::Client;
use crate::errors::RuntimeError;
use crate::lang::{Line, Program, Segment, Template, VariableRef};
use crate::repo::{HighlightRepository, VariableRepository};
use crate::types::ScopeKind;

pub use scope::{GlobalScope, LocalScope};

pub struct ExecutionContext {
    script_name: String,
    client: Arc<dyn Client>,
    program: Program,
    cursor: usize,
    local: LocalScope,
    global: GlobalScope,
    highlights: Arc<dyn HighlightRepository>,
}

impl ExecutionContext {
    /// Build a context positioned at the first line, subscribing the global
    /// scope to the client's active character.
    pub fn new(
        script_name: impl Into<String>,
        client: Arc<dyn Client>,
        program: Program,
        variables: Arc<dyn VariableRepository>,
        highlights: Arc<dyn HighlightRepository>,
    ) -> Self {
        let global = GlobalScope::new(client.character_id(), variables);
        Self {
            script_name: script_name.into(),
            client,
            program,
            cursor: 0,
            local: LocalScope::new(),
            global,
            highlights,
        }
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    pub fn highlights(&self) -> &Arc<dyn HighlightRepository> {
        &self.highlights
    }

    pub fn local(&self) -> &LocalScope {
        &self.local
    }

    pub fn character_id(&self) -> Option<String> {
        self.global.character_id()
    }

    /// Install the invocation arguments: `0` is the raw string, `1..N` the
    /// individual words.
    pub fn bind_arguments(&mut self, argument_string: &str) {
        self.set_script_variable("0", argument_string);
        for (idx, arg) in split_arguments(argument_string).into_iter().enumerate() {
            self.set_script_variable(&(idx + 1).to_string(), arg);
        }
    }

    /// Seed or overwrite a local binding.
    pub fn set_script_variable(&mut self, name: &str, value: impl Into<String>) {
        self.local.set(name, value);
    }

    /// The line at the cursor, advancing past it. `None` once the program is
    /// exhausted.
    pub fn next_line(&mut self) -> Option<Arc<Line>> {
        let line = self.program.line(self.cursor).cloned()?;
        self.cursor += 1;
        Some(line)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Continue execution at the line carrying `label` (any case).
    pub fn goto(&mut self, label: &str) -> Result<(), RuntimeError> {
        let label = label.trim();
        let index = self
            .program
            .label_index(label)
            .ok_or_else(|| RuntimeError::UnknownLabel(label.to_string()))?;
        debug!(script = %self.script_name, label, index, "jump");
        self.cursor = index;
        Ok(())
    }

    /// Look up a reference, honouring an explicit scope if it has one.
    pub fn lookup(&mut self, var: &VariableRef) -> Option<String> {
        match var.scope {
            Some(ScopeKind::Local) => self.local.get(&var.name).map(str::to_string),
            Some(ScopeKind::Global) => self.global.get(&var.name),
            Some(ScopeKind::Session) => self.client.properties().get(&var.name).cloned(),
            None => self.resolve(&var.name),
        }
    }

    /// Unscoped lookup: local, then global, then session properties.
    pub fn resolve(&mut self, name: &str) -> Option<String> {
        if let Some(value) = self.local.get(name) {
            return Some(value.to_string());
        }
        if let Some(value) = self.global.get(name) {
            return Some(value);
        }
        self.client.properties().get(name).cloned()
    }

    /// Substitute every reference in `template`. An unresolved reference is a
    /// fault.
    pub fn render(&mut self, template: &Template) -> Result<String, RuntimeError> {
        let mut out = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(var) => {
                    let value = self
                        .lookup(var)
                        .ok_or_else(|| RuntimeError::UndefinedVariable(var.to_string()))?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }

    /// Write a variable. Unscoped references go to `default_scope`.
    pub async fn assign(
        &mut self,
        var: &VariableRef,
        default_scope: ScopeKind,
        value: String,
    ) -> Result<(), RuntimeError> {
        match var.scope.unwrap_or(default_scope) {
            ScopeKind::Local => {
                self.local.set(&var.name, value);
                Ok(())
            }
            ScopeKind::Global => self.global.set(&var.name, value).await,
            ScopeKind::Session => Err(RuntimeError::ReadOnlyScope(var.to_string())),
        }
    }

    pub async fn unset(
        &mut self,
        var: &VariableRef,
        default_scope: ScopeKind,
    ) -> Result<(), RuntimeError> {
        match var.scope.unwrap_or(default_scope) {
            ScopeKind::Local => {
                self.local.remove(&var.name);
                Ok(())
            }
            ScopeKind::Global => self.global.delete(&var.name).await,
            ScopeKind::Session => Err(RuntimeError::ReadOnlyScope(var.to_string())),
        }
    }

    /// Drop positional argument `1` and renumber the rest; `0` becomes the
    /// remaining arguments joined by spaces.
    pub fn shift(&mut self) {
        let mut args = self.local.positional();
        for idx in 1..=args.len() {
            self.local.remove(&idx.to_string());
        }
        if !args.is_empty() {
            args.remove(0);
        }
        self.local.set("0", args.join(" "));
        for (idx, arg) in args.into_iter().enumerate() {
            self.local.set(&(idx + 1).to_string(), arg);
        }
    }
}
