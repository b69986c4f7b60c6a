// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MudscriptError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::MudscriptError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_script_directories(cfg)?;
    validate_session(cfg)?;
    validate_variables(cfg)?;
    Ok(())
}

fn validate_script_directories(cfg: &RawConfigFile) -> Result<()> {
    for (idx, dir) in cfg.scripts.directories.iter().enumerate() {
        if dir.trim().is_empty() {
            return Err(MudscriptError::ConfigError(format!(
                "[scripts].directories[{idx}] must not be empty"
            )));
        }
    }

    if cfg.scripts.fallback_directory.trim().is_empty() {
        return Err(MudscriptError::ConfigError(
            "[scripts].fallback_directory must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(cfg: &RawConfigFile) -> Result<()> {
    if let Some(character) = &cfg.session.character {
        if character.trim().is_empty() {
            return Err(MudscriptError::ConfigError(
                "[session].character must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_variables(cfg: &RawConfigFile) -> Result<()> {
    for (character, vars) in cfg.variables.iter() {
        for name in vars.keys() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(MudscriptError::ConfigError(format!(
                    "[variables.{character}] has invalid variable name '{name}'"
                )));
            }
        }
    }
    Ok(())
}
