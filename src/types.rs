// src/types.rs

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Unique identity of one script run.
pub type ScriptId = Uuid;

/// Lifecycle state of a script instance.
///
/// - `NotStarted` -> `Running` on start.
/// - `Running` <-> `Suspended` via suspend/resume.
/// - any state -> `Stopped`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScriptStatus {
    #[default]
    NotStarted,
    Running,
    Suspended,
    Stopped,
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScriptStatus::NotStarted => "not started",
            ScriptStatus::Running => "running",
            ScriptStatus::Suspended => "suspended",
            ScriptStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Status change emitted by an instance for external observers (status bars,
/// script lists). Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: ScriptId,
    pub name: String,
    pub status: ScriptStatus,
}

/// A persisted, character-scoped variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A highlight rule stored for a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub pattern: String,
}

/// Which variable scope a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Per-run positional and script variables.
    Local,
    /// Persisted, per-character variables.
    Global,
    /// Live, read-only session facts.
    Session,
}

impl FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ScopeKind::Local),
            "global" => Ok(ScopeKind::Global),
            "properties" | "session" => Ok(ScopeKind::Session),
            other => Err(format!(
                "invalid scope: {other} (expected \"local\", \"global\" or \"properties\")"
            )),
        }
    }
}
