// src/lib.rs

pub mod args;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lang;
pub mod logging;
pub mod registry;
pub mod repo;
pub mod types;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::args::split_first_word;
use crate::cli::CliArgs;
use crate::client::{Client, ConsoleClient};
use crate::config::{ConfigFile, expand_home, load_or_default};
use crate::engine::{ScriptServices, default_engines};
use crate::fs::RealFileSystem;
use crate::registry::{SCRIPT_PREFIX, ScriptRegistry};
use crate::repo::{InMemoryHighlightRepository, InMemoryVariableRepository};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - variable / highlight repositories (seeded from config)
/// - the script registry and its engines
/// - a console client standing in for a live session
/// - Ctrl-C handling (stops every running script)
///
/// Returns once every started script has finished.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;
    let registry = build_registry(&args, &cfg);

    if args.dry_run {
        print_dry_run(&registry, &args.commands);
        return Ok(());
    }

    if args.commands.is_empty() {
        bail!("no scripts given; pass one or more command lines such as \".hunt goblin\"");
    }

    let mut properties: HashMap<String, String> = cfg.session.properties.clone().into_iter().collect();
    properties.extend(args.properties.iter().cloned());
    let character = args.character.clone().or_else(|| cfg.session.character.clone());
    info!(character = ?character, properties = properties.len(), "console session ready");

    let client: Arc<dyn Client> = Arc::new(ConsoleClient::new(properties, character));

    // Ctrl-C -> stop everything; the wait below then completes.
    {
        let registry = registry.clone();
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            registry.stop_all(client.as_ref()).await;
        });
    }

    for command in &args.commands {
        registry.start_script(Arc::clone(&client), command).await;
    }

    registry.wait_idle().await;
    client.disconnect().await;
    info!("all scripts finished");
    Ok(())
}

fn build_registry(args: &CliArgs, cfg: &ConfigFile) -> ScriptRegistry {
    let variables = Arc::new(InMemoryVariableRepository::new());
    for (character, vars) in cfg.variables.iter() {
        for (name, value) in vars.iter() {
            variables.insert(character, name, value);
        }
    }
    let services = ScriptServices::new(variables, Arc::new(InMemoryHighlightRepository::new()));

    // --script-dir entries are searched before the configured directories.
    let mut directories: Vec<PathBuf> = args.script_dirs.iter().map(|d| expand_home(d)).collect();
    directories.extend(cfg.script_directories());
    debug!(?directories, fallback = %cfg.fallback_directory().display(), "script search path");

    ScriptRegistry::with_directories(
        default_engines(&services),
        directories,
        cfg.fallback_directory(),
        Arc::new(RealFileSystem),
    )
}

/// Print which file each command would run.
fn print_dry_run(registry: &ScriptRegistry, commands: &[String]) {
    println!("mudscript dry-run");
    for command in commands {
        let line = command.trim_start();
        let line = line.strip_prefix(SCRIPT_PREFIX).unwrap_or(line);
        let (name, args) = split_first_word(line);
        match registry.discover(name) {
            Some(found) => {
                println!("  - {name}: {}", found.path.display());
                if let Some(args) = args {
                    println!("      args: {args}");
                }
            }
            None => println!("  - {name}: not found"),
        }
    }
    debug!("dry-run complete (no execution)");
}
