#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mudscript::exec::{OnStop, ScriptInstance};
use mudscript::lang::{ParseFn, parse_wsl};
use mudscript::repo::{InMemoryHighlightRepository, InMemoryVariableRepository};

pub use mudscript_test_utils::builders::{
    ConfigFileBuilder, FALLBACK_DIR, RegistryBuilder, SCRIPT_DIR, TempScriptDir, TestRig,
};
pub use mudscript_test_utils::{ClientEvent, RecordingClient, init_tracing, with_timeout};

/// Counts how many times the completion callback ran.
#[derive(Clone, Default)]
pub struct StopCounter(Arc<AtomicUsize>);

impl StopCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_stop(&self) -> OnStop {
        let count = Arc::clone(&self.0);
        Box::new(move || {
            Box::pin(async move {
                count.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A standalone WSL instance with fresh in-memory repositories.
pub fn wsl_instance(name: &str, source: &str) -> Arc<ScriptInstance> {
    instance_with(name, source, parse_wsl, Arc::new(InMemoryVariableRepository::new()))
}

pub fn instance_with(
    name: &str,
    source: &str,
    parse: ParseFn,
    variables: Arc<InMemoryVariableRepository>,
) -> Arc<ScriptInstance> {
    Arc::new(ScriptInstance::new(
        name,
        format!("{SCRIPT_DIR}/{name}.wsl"),
        source.to_string(),
        parse,
        variables,
        Arc::new(InMemoryHighlightRepository::new()),
    ))
}

/// Run a WSL script to completion and return the client that saw it.
pub async fn run_wsl(source: &str, args: &str, client: Arc<RecordingClient>) -> Arc<RecordingClient> {
    let instance = wsl_instance("test", source);
    instance.start(client.as_client(), args, Box::new(|| Box::pin(async {})));
    with_timeout(instance.join()).await;
    client
}
