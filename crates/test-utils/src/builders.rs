#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use mudscript::config::{ConfigFile, RawConfigFile};
use mudscript::engine::{ScriptServices, default_engines};
use mudscript::fs::{FileSystem, MockFileSystem, RealFileSystem};
use mudscript::registry::ScriptRegistry;
use mudscript::repo::{InMemoryHighlightRepository, InMemoryVariableRepository};

pub const SCRIPT_DIR: &str = "/scripts";
pub const FALLBACK_DIR: &str = "/home/user/.mudscript/scripts";

/// Everything a registry test needs to poke at.
pub struct TestRig {
    pub registry: ScriptRegistry,
    pub fs: MockFileSystem,
    pub variables: Arc<InMemoryVariableRepository>,
    pub highlights: Arc<InMemoryHighlightRepository>,
}

/// Builder for a `ScriptRegistry` over an in-memory filesystem.
pub struct RegistryBuilder {
    fs: MockFileSystem,
    directories: Vec<PathBuf>,
    fallback: PathBuf,
    variables: Arc<InMemoryVariableRepository>,
    highlights: Arc<InMemoryHighlightRepository>,
}

impl RegistryBuilder {
    /// One script directory (`/scripts`) plus the fallback.
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            directories: vec![PathBuf::from(SCRIPT_DIR)],
            fallback: PathBuf::from(FALLBACK_DIR),
            variables: Arc::new(InMemoryVariableRepository::new()),
            highlights: Arc::new(InMemoryHighlightRepository::new()),
        }
    }

    /// Replace the directory list.
    pub fn directories(mut self, dirs: &[&str]) -> Self {
        self.directories = dirs.iter().map(PathBuf::from).collect();
        self
    }

    /// Add `file_name` (with extension) to the first script directory.
    pub fn script(self, file_name: &str, source: &str) -> Self {
        let dir = self
            .directories
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(SCRIPT_DIR));
        self.script_in(dir, file_name, source)
    }

    pub fn script_in(self, dir: impl AsRef<Path>, file_name: &str, source: &str) -> Self {
        self.fs.add_file(dir.as_ref().join(file_name), source);
        self
    }

    pub fn fallback_script(self, file_name: &str, source: &str) -> Self {
        let dir = self.fallback.clone();
        self.script_in(dir, file_name, source)
    }

    pub fn variable(self, character: &str, name: &str, value: &str) -> Self {
        self.variables.insert(character, name, value);
        self
    }

    pub fn build(self) -> TestRig {
        let services = ScriptServices::new(self.variables.clone(), self.highlights.clone());
        let fs: Arc<dyn FileSystem> = Arc::new(self.fs.clone());
        let registry = ScriptRegistry::with_directories(
            default_engines(&services),
            self.directories,
            self.fallback,
            fs,
        );
        TestRig {
            registry,
            fs: self.fs,
            variables: self.variables,
            highlights: self.highlights,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A real script directory on disk, removed on drop.
pub struct TempScriptDir {
    dir: TempDir,
}

impl TempScriptDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, file_name: &str, source: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, source).expect("write script");
        path
    }

    /// Registry searching only this directory, with a fallback that does not
    /// exist.
    pub fn registry(&self) -> (ScriptRegistry, Arc<InMemoryVariableRepository>) {
        let variables = Arc::new(InMemoryVariableRepository::new());
        let services =
            ScriptServices::new(variables.clone(), Arc::new(InMemoryHighlightRepository::new()));
        let registry = ScriptRegistry::with_directories(
            default_engines(&services),
            vec![self.path().to_path_buf()],
            self.path().join("missing-fallback"),
            Arc::new(RealFileSystem),
        );
        (registry, variables)
    }
}

impl Default for TempScriptDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_directory(mut self, dir: &str) -> Self {
        self.config.scripts.directories.push(dir.to_string());
        self
    }

    pub fn with_fallback(mut self, dir: &str) -> Self {
        self.config.scripts.fallback_directory = dir.to_string();
        self
    }

    pub fn with_character(mut self, character: &str) -> Self {
        self.config.session.character = Some(character.to_string());
        self
    }

    pub fn with_variable(mut self, character: &str, name: &str, value: &str) -> Self {
        self.config
            .variables
            .entry(character.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
