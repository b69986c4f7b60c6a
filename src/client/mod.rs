// src/client/mod.rs

//! The live session a script talks to.
//!
//! The runtime never touches the network itself: everything a script does to
//! the outside world goes through a [`Client`]. The host application provides
//! the real implementation; [`console::ConsoleClient`] is a terminal-backed
//! client used by the `mudscript` binary.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::watch;

pub mod console;

pub use console::ConsoleClient;

/// Boxed, sendable future returned by the async trait methods in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Directive sent (without echo) when a script starts, suppressing echo of
/// script-issued commands on the server side.
pub const SCRIPTING_ON: &str = "_state scripting on";

/// Directive sent (without echo) on every script exit path.
pub const SCRIPTING_OFF: &str = "_state scripting off";

/// How a message printed to the user should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStyle {
    #[default]
    Plain,
    /// Runtime notices ("Starting script: ...").
    Echo,
    Error,
}

/// A line of text shown to the user, never sent to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub style: MessageStyle,
}

impl Message {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: MessageStyle::Plain,
        }
    }

    pub fn echo(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: MessageStyle::Echo,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: MessageStyle::Error,
        }
    }
}

/// Connection to a live text session.
///
/// Implementations must be cheap to call from many script tasks at once; a
/// slow `send_command` on one script must not block another.
pub trait Client: Send + Sync {
    /// Send a command line to the session. `echo` controls whether the line
    /// is also shown to the user.
    fn send_command(&self, line: String, echo: bool) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Show a message to the user.
    fn print(&self, message: Message) -> BoxFuture<'_, ()>;

    /// Show a diagnostic message to the user.
    fn debug(&self, message: String) -> BoxFuture<'_, ()>;

    /// Snapshot of the current session properties.
    fn properties(&self) -> HashMap<String, String>;

    /// The active character, if any. Changes as the user logs in and out.
    fn character_id(&self) -> watch::Receiver<Option<String>>;

    fn disconnect(&self) -> BoxFuture<'_, ()>;
}
