// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [scripts]
/// directories = ["~/scripts", "$HOME/shared/scripts"]
/// fallback_directory = "$HOME/.mudscript/scripts"
///
/// [session]
/// character = "gs4-bob"
///
/// [session.properties]
/// roundtime = "0"
///
/// [variables.gs4-bob]
/// weapon = "broadsword"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub scripts: ScriptsSection,

    #[serde(default)]
    pub session: SessionSection,

    /// Seed values for persisted variables, keyed by character id.
    #[serde(default)]
    pub variables: BTreeMap<String, BTreeMap<String, String>>,
}

/// Validated configuration. Construct via `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub scripts: ScriptsSection,
    pub session: SessionSection,
    pub variables: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            scripts: raw.scripts,
            session: raw.session,
            variables: raw.variables,
        }
    }

    /// Configured script directories, in search order, with `$HOME`/`~` expanded.
    ///
    /// The fallback directory is *not* included; discovery appends it itself.
    pub fn script_directories(&self) -> Vec<PathBuf> {
        self.scripts
            .directories
            .iter()
            .map(|d| expand_home(d))
            .collect()
    }

    pub fn fallback_directory(&self) -> PathBuf {
        expand_home(&self.scripts.fallback_directory)
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsSection {
    /// Directories searched for `<name>.<extension>`, in order.
    #[serde(default)]
    pub directories: Vec<String>,

    /// Searched after every configured directory.
    #[serde(default = "default_fallback_directory")]
    pub fallback_directory: String,
}

fn default_fallback_directory() -> String {
    "$HOME/.mudscript/scripts".to_string()
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            fallback_directory: default_fallback_directory(),
        }
    }
}

/// `[session]` section, used by the console client.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionSection {
    /// Active character id. Without one, global variables are unavailable.
    #[serde(default)]
    pub character: Option<String>,

    /// Initial session properties.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Expand a leading `~` or any `$HOME` in a directory string.
pub fn expand_home(dir: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(dir),
    };
    let home_str = home.to_string_lossy();

    if dir == "~" {
        return home;
    }
    if let Some(rest) = dir.strip_prefix("~/") {
        return home.join(rest);
    }
    PathBuf::from(dir.replace("$HOME", &home_str))
}
