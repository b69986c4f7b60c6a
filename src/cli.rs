// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `mudscript`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mudscript",
    version,
    about = "Run session automation scripts against a console session.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file at the default location is not an error; defaults apply.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Active character id (overrides `[session].character`).
    #[arg(long, value_name = "ID")]
    pub character: Option<String>,

    /// Session property as `KEY=VALUE`; may be repeated.
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<(String, String)>,

    /// Extra script directory searched before the configured ones; may be repeated.
    #[arg(long = "script-dir", value_name = "DIR")]
    pub script_dirs: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MUDSCRIPT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve each script and print the file that would run, without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Script command lines, e.g. `".hunt goblin 3"`. Started concurrently.
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
