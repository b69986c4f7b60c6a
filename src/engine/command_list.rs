// src/engine/command_list.rs

use std::path::Path;

use crate::errors::Result;
use crate::exec::ScriptInstance;
use crate::fs::FileSystem;
use crate::lang::parse_command_list;

use super::{ScriptEngine, ScriptServices};

/// Plain lists of session commands, one per line.
pub struct CommandListEngine {
    services: ScriptServices,
}

impl CommandListEngine {
    pub fn new(services: ScriptServices) -> Self {
        Self { services }
    }
}

impl ScriptEngine for CommandListEngine {
    fn name(&self) -> &'static str {
        "command-list"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn create_instance(
        &self,
        name: &str,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> Result<ScriptInstance> {
        self.services.load_instance(name, path, fs, parse_command_list)
    }
}
