// src/engine/wsl.rs

use std::path::Path;

use crate::errors::Result;
use crate::exec::ScriptInstance;
use crate::fs::FileSystem;
use crate::lang::parse_wsl;

use super::{ScriptEngine, ScriptServices};

/// Wizard-style scripts with labels, variables and counters.
pub struct WslEngine {
    services: ScriptServices,
}

impl WslEngine {
    pub fn new(services: ScriptServices) -> Self {
        Self { services }
    }
}

impl ScriptEngine for WslEngine {
    fn name(&self) -> &'static str {
        "wsl"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["wsl", "cmd", "wiz"]
    }

    fn create_instance(
        &self,
        name: &str,
        path: &Path,
        fs: &dyn FileSystem,
    ) -> Result<ScriptInstance> {
        self.services.load_instance(name, path, fs, parse_wsl)
    }
}
