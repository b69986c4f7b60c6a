// src/engine/mod.rs

//! Script engines: which files a language claims, and how to load them.
//!
//! The registry asks each engine, in order, for its extensions and builds an
//! instance with the first engine whose file exists.

use std::path::Path;
use std::sync::Arc;

use crate::errors::{MudscriptError, Result};
use crate::exec::ScriptInstance;
use crate::fs::FileSystem;
use crate::lang::ParseFn;
use crate::repo::{HighlightRepository, VariableRepository};

pub mod command_list;
pub mod wsl;

pub use command_list::CommandListEngine;
pub use wsl::WslEngine;

/// Collaborators every script instance needs, shared by all engines.
#[derive(Clone)]
pub struct ScriptServices {
    pub variables: Arc<dyn VariableRepository>,
    pub highlights: Arc<dyn HighlightRepository>,
}

impl ScriptServices {
    pub fn new(
        variables: Arc<dyn VariableRepository>,
        highlights: Arc<dyn HighlightRepository>,
    ) -> Self {
        Self {
            variables,
            highlights,
        }
    }

    /// Read `path` into a new instance that parses its body with `parse`.
    pub fn load_instance(
        &self,
        name: &str,
        path: &Path,
        fs: &dyn FileSystem,
        parse: ParseFn,
    ) -> Result<ScriptInstance> {
        let source = fs
            .read_to_string(path)
            .map_err(|e| MudscriptError::LoadError {
                name: name.to_string(),
                reason: format!("{e:#}"),
            })?;

        Ok(ScriptInstance::new(
            name,
            path,
            source,
            parse,
            self.variables.clone(),
            self.highlights.clone(),
        ))
    }
}

/// A script language the registry can start.
pub trait ScriptEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extensions (without the dot), in lookup order.
    fn extensions(&self) -> &'static [&'static str];

    /// Load `path` into a new, not yet started instance.
    ///
    /// The body is parsed when the instance starts; only read failures are
    /// reported here.
    fn create_instance(
        &self,
        name: &str,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> Result<ScriptInstance>;
}

/// The built-in engines in lookup order.
pub fn default_engines(services: &ScriptServices) -> Vec<Arc<dyn ScriptEngine>> {
    vec![
        Arc::new(WslEngine::new(services.clone())),
        Arc::new(CommandListEngine::new(services.clone())),
    ]
}
