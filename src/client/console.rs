// src/client/console.rs

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::bail;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{BoxFuture, Client, Message, MessageStyle};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// A [`Client`] that writes the session transcript to a writer (stdout by
/// default) instead of a server.
///
/// Commands are written as `> command`, user messages as-is, errors prefixed
/// with `! `. Properties and the active character are held locally and can be
/// changed by the host while scripts run.
pub struct ConsoleClient {
    writer: SharedWriter,
    properties: watch::Sender<HashMap<String, String>>,
    character: watch::Sender<Option<String>>,
    connected: AtomicBool,
}

impl ConsoleClient {
    pub fn new(properties: HashMap<String, String>, character: Option<String>) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), properties, character)
    }

    pub fn with_writer(
        writer: Box<dyn Write + Send>,
        properties: HashMap<String, String>,
        character: Option<String>,
    ) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            properties: watch::Sender::new(properties),
            character: watch::Sender::new(character),
            connected: AtomicBool::new(true),
        }
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.properties.send_modify(|props| {
            props.insert(key, value);
        });
    }

    pub fn set_character(&self, character: Option<String>) {
        self.character.send_replace(character);
    }

    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stdout is not worth failing a script over.
        let _ = writeln!(writer, "{line}");
    }
}

impl Client for ConsoleClient {
    fn send_command(&self, line: String, echo: bool) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move {
            if !self.connected.load(Ordering::SeqCst) {
                bail!("not connected; cannot send '{line}'");
            }
            if echo {
                self.write_line(&format!("> {line}"));
            } else {
                debug!(command = %line, "sent command without echo");
            }
            Ok(())
        })
    }

    fn print(&self, message: Message) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            match message.style {
                MessageStyle::Error => self.write_line(&format!("! {}", message.text)),
                MessageStyle::Plain | MessageStyle::Echo => self.write_line(&message.text),
            }
        })
    }

    fn debug(&self, message: String) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.write_line(&format!("[debug] {message}"));
        })
    }

    fn properties(&self) -> HashMap<String, String> {
        self.properties.borrow().clone()
    }

    fn character_id(&self) -> watch::Receiver<Option<String>> {
        self.character.subscribe()
    }

    fn disconnect(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.connected.swap(false, Ordering::SeqCst) {
                let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writer.flush();
                info!("console session disconnected");
            }
        })
    }
}
