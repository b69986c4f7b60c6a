// src/registry/discovery.rs

//! Finding the file behind a script name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::engine::ScriptEngine;
use crate::fs::FileSystem;

/// Where a script name resolved to. Produced per lookup, not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub name: String,
    pub extension: &'static str,
    pub path: PathBuf,
    /// Index into the registry's engine list.
    pub engine: usize,
}

/// Search for `<dir>/<name>.<extension>`.
///
/// Order: engines as given; within an engine, its extensions in order; for
/// each extension, `directories` in order and then `fallback`. The first
/// regular file wins. Names that are empty or contain path separators never
/// match.
pub fn discover(
    name: &str,
    engines: &[Arc<dyn ScriptEngine>],
    directories: &[PathBuf],
    fallback: &Path,
    fs: &dyn FileSystem,
) -> Option<ScriptDescriptor> {
    if !is_valid_name(name) {
        return None;
    }

    for (engine_idx, engine) in engines.iter().enumerate() {
        for &extension in engine.extensions() {
            let file_name = format!("{name}.{extension}");
            let candidates = directories
                .iter()
                .map(PathBuf::as_path)
                .chain(std::iter::once(fallback));

            for dir in candidates {
                let path = dir.join(&file_name);
                trace!(path = %path.display(), engine = engine.name(), "checking candidate");
                if fs.is_file(&path) {
                    return Some(ScriptDescriptor {
                        name: name.to_string(),
                        extension,
                        path,
                        engine: engine_idx,
                    });
                }
            }
        }
    }

    None
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
