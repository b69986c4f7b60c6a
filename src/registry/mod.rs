// src/registry/mod.rs

//! Starting scripts by name and tracking the ones that are running.
//!
//! [`ScriptRegistry`] is a cheap-to-clone handle. It owns the engine list, the
//! script directories, the running set ([`running`]) and a broadcast channel
//! of instance status changes for status displays.

pub mod discovery;
pub mod running;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::args::split_first_word;
use crate::client::{Client, Message};
use crate::engine::ScriptEngine;
use crate::exec::{OnStop, ScriptInstance};
use crate::fs::FileSystem;
use crate::types::{ScriptId, StatusChange};

pub use discovery::{ScriptDescriptor, discover};
pub use running::{RunningScripts, RunningSnapshot};

/// Prefix that marks an input line as a script invocation.
pub const SCRIPT_PREFIX: char = '.';

const STATUS_EVENT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct ScriptRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    engines: Vec<Arc<dyn ScriptEngine>>,
    directories: watch::Receiver<Vec<PathBuf>>,
    fallback: PathBuf,
    fs: Arc<dyn FileSystem>,
    running: RunningScripts,
    status_events: broadcast::Sender<StatusChange>,
}

impl ScriptRegistry {
    /// `directories` is live: changes are picked up by the next lookup.
    pub fn new(
        engines: Vec<Arc<dyn ScriptEngine>>,
        directories: watch::Receiver<Vec<PathBuf>>,
        fallback: PathBuf,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let (status_events, _) = broadcast::channel(STATUS_EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                engines,
                directories,
                fallback,
                fs,
                running: RunningScripts::new(),
                status_events,
            }),
        }
    }

    /// Registry with a fixed directory list.
    pub fn with_directories(
        engines: Vec<Arc<dyn ScriptEngine>>,
        directories: Vec<PathBuf>,
        fallback: PathBuf,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let (_tx, rx) = watch::channel(directories);
        Self::new(engines, rx, fallback, fs)
    }

    pub fn discover(&self, name: &str) -> Option<ScriptDescriptor> {
        let directories = self.inner.directories.borrow().clone();
        discover(
            name,
            &self.inner.engines,
            &directories,
            &self.inner.fallback,
            self.inner.fs.as_ref(),
        )
    }

    /// Find and start the script named by the first word of `command_line`;
    /// the rest of the line is its argument string. A single leading `.` is
    /// ignored.
    ///
    /// Failures are reported through `client` and never returned. On success
    /// the started instance is returned for callers that want to watch it.
    pub async fn start_script(
        &self,
        client: Arc<dyn Client>,
        command_line: &str,
    ) -> Option<Arc<ScriptInstance>> {
        let command_line = command_line.trim_start();
        let command_line = command_line
            .strip_prefix(SCRIPT_PREFIX)
            .unwrap_or(command_line);
        let (name, args) = split_first_word(command_line);
        let args = args.unwrap_or("");

        let found = self
            .discover(name)
            .and_then(|d| self.inner.engines.get(d.engine).map(|e| (d, Arc::clone(e))));
        let Some((descriptor, engine)) = found else {
            info!(script = %name, "no script file found");
            client
                .print(Message::error("Could not find a script with that name"))
                .await;
            return None;
        };

        debug!(
            script = %name,
            engine = engine.name(),
            path = %descriptor.path.display(),
            "resolved script"
        );

        let instance =
            match engine.create_instance(&descriptor.name, &descriptor.path, self.inner.fs.as_ref()) {
                Ok(instance) => {
                    Arc::new(instance.with_status_events(self.inner.status_events.clone()))
                }
                Err(err) => {
                    warn!(script = %name, error = %err, "failed to load script");
                    client.print(Message::error(err.to_string())).await;
                    return None;
                }
            };

        client
            .print(Message::echo(format!("Starting script: {name}")))
            .await;

        self.inner.running.add(Arc::clone(&instance));

        let running = self.inner.running.clone();
        let finish_client = Arc::clone(&client);
        let id = instance.id();
        let finished_name = name.to_string();
        let on_stop: OnStop = Box::new(move || {
            Box::pin(async move {
                finish_client
                    .print(Message::echo(format!("Script has finished: {finished_name}")))
                    .await;
                running.remove(id);
            })
        });

        instance.start(client, args, on_stop);
        Some(instance)
    }

    /// Route a line of user input: `.name args` starts a script, anything
    /// else is sent to the session.
    pub async fn submit_line(&self, client: Arc<dyn Client>, line: &str) {
        if line.starts_with(SCRIPT_PREFIX) {
            self.start_script(client, line).await;
        } else if let Err(err) = client.send_command(line.to_string(), true).await {
            warn!(error = %err, "failed to send command");
            client.print(Message::error(err.to_string())).await;
        }
    }

    pub fn running_scripts(&self) -> RunningSnapshot {
        self.inner.running.snapshot()
    }

    pub fn subscribe_running(&self) -> watch::Receiver<RunningSnapshot> {
        self.inner.running.subscribe()
    }

    /// Status changes of every instance this registry starts.
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusChange> {
        self.inner.status_events.subscribe()
    }

    pub fn find(&self, id: ScriptId) -> Option<Arc<ScriptInstance>> {
        self.running_scripts()
            .iter()
            .find(|i| i.id() == id)
            .cloned()
    }

    /// Stop every running script. Returns how many were asked to stop.
    pub async fn stop_all(&self, client: &dyn Client) -> usize {
        let scripts = self.running_scripts();
        for instance in scripts.iter() {
            instance.stop();
        }
        if !scripts.is_empty() {
            client
                .print(Message::plain(format!("Stopped {} script(s)", scripts.len())))
                .await;
        }
        scripts.len()
    }

    pub async fn suspend_all(&self, client: &dyn Client) {
        let scripts = self.running_scripts();
        if scripts.is_empty() {
            return;
        }
        client.print(Message::plain("Paused script(s)")).await;
        for instance in scripts.iter() {
            instance.suspend();
        }
    }

    pub async fn resume_all(&self, client: &dyn Client) {
        let scripts = self.running_scripts();
        if scripts.is_empty() {
            return;
        }
        client.print(Message::plain("Resumed script(s)")).await;
        for instance in scripts.iter() {
            instance.resume();
        }
    }

    /// Resolves once no script is running.
    pub async fn wait_idle(&self) {
        self.inner.running.wait_empty().await;
    }
}
