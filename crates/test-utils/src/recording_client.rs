use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use tokio::sync::watch;

use mudscript::client::{BoxFuture, Client, Message, SCRIPTING_OFF, SCRIPTING_ON};

/// Everything a script did to the client, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Command { line: String, echo: bool },
    Print(Message),
    Debug(String),
    Disconnect,
}

/// A client that records every call instead of talking to a session.
///
/// Tests can await conditions on the recorded events with
/// [`wait_for`](RecordingClient::wait_for).
pub struct RecordingClient {
    events: watch::Sender<Vec<ClientEvent>>,
    properties: Mutex<HashMap<String, String>>,
    character: watch::Sender<Option<String>>,
    fail_commands: AtomicBool,
    panic_on_commands: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: watch::Sender::new(Vec::new()),
            properties: Mutex::new(HashMap::new()),
            character: watch::Sender::new(None),
            fail_commands: AtomicBool::new(false),
            panic_on_commands: AtomicBool::new(false),
        })
    }

    pub fn with_character(character: &str) -> Arc<Self> {
        let client = Self::new();
        client.set_character(Some(character));
        client
    }

    pub fn set_character(&self, character: Option<&str>) {
        self.character.send_replace(character.map(str::to_string));
    }

    pub fn set_property(&self, key: &str, value: &str) {
        self.properties
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Make every later `send_command` fail.
    pub fn fail_commands(&self) {
        self.fail_commands.store(true, Ordering::SeqCst);
    }

    /// Make every later echoed `send_command` panic. Scripting directives
    /// are still recorded.
    pub fn panic_on_commands(&self) {
        self.panic_on_commands.store(true, Ordering::SeqCst);
    }

    pub fn as_client(self: &Arc<Self>) -> Arc<dyn Client> {
        self.clone()
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.borrow().clone()
    }

    /// Commands sent with echo on, i.e. everything except scripting
    /// directives.
    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Command { line, echo: true } => Some(line),
                _ => None,
            })
            .collect()
    }

    /// Scripting directives, in order.
    pub fn directives(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Command { line, echo: false }
                    if line == SCRIPTING_ON || line == SCRIPTING_OFF =>
                {
                    Some(line)
                }
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Print(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn message_texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.text).collect()
    }

    pub fn debug_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Debug(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Wait until `pred` holds for the recorded events.
    pub async fn wait_for(&self, mut pred: impl FnMut(&[ClientEvent]) -> bool) {
        let mut rx = self.events.subscribe();
        let _ = rx.wait_for(|events| pred(events)).await;
    }

    /// Wait until a message with exactly `text` has been printed.
    pub async fn wait_for_message(&self, text: &str) {
        self.wait_for(|events| {
            events
                .iter()
                .any(|e| matches!(e, ClientEvent::Print(m) if m.text == text))
        })
        .await;
    }

    /// Wait until `n` echoed commands have been sent.
    pub async fn wait_for_commands(&self, n: usize) {
        self.wait_for(|events| {
            events
                .iter()
                .filter(|e| matches!(e, ClientEvent::Command { echo: true, .. }))
                .count()
                >= n
        })
        .await;
    }

    fn record(&self, event: ClientEvent) {
        self.events.send_modify(|events| events.push(event));
    }
}

impl Client for RecordingClient {
    fn send_command(&self, line: String, echo: bool) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            if self.fail_commands.load(Ordering::SeqCst) {
                bail!("not connected");
            }
            if echo && self.panic_on_commands.load(Ordering::SeqCst) {
                panic!("connection handler blew up on {line:?}");
            }
            self.record(ClientEvent::Command { line, echo });
            Ok(())
        })
    }

    fn print(&self, message: Message) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.record(ClientEvent::Print(message)) })
    }

    fn debug(&self, message: String) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.record(ClientEvent::Debug(message)) })
    }

    fn properties(&self) -> HashMap<String, String> {
        self.properties.lock().unwrap().clone()
    }

    fn character_id(&self) -> watch::Receiver<Option<String>> {
        self.character.subscribe()
    }

    fn disconnect(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.record(ClientEvent::Disconnect) })
    }
}
