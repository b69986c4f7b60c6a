// src/errors.rs

//! Crate-wide error types.
//!
//! - [`MudscriptError`] covers configuration, IO and script loading problems
//!   that surface at the application edge.
//! - [`ParseError`] is raised while turning a script body into lines.
//! - [`RuntimeError`] is raised by a statement while a script is running and
//!   always terminates that script (and only that script).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MudscriptError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to load script '{name}': {reason}")]
    LoadError { name: String, reason: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A malformed script body. `line` is 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error on line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// A fault raised while executing a statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("cannot set '{0}': session properties are read-only")]
    ReadOnlyScope(String),

    #[error("expected a number for {context}, got '{value}'")]
    TypeMismatch { context: String, value: String },

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("no active character; cannot {0}")]
    NoCharacter(String),

    #[error("invalid highlight pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("client error: {0}")]
    Client(String),

    #[error("execution task panicked: {0}")]
    Panicked(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MudscriptError>;
