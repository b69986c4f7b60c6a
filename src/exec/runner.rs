// src/exec/runner.rs

//! The execution task behind a started [`ScriptInstance`].

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::client::{Client, Message, SCRIPTING_OFF, SCRIPTING_ON};
use crate::context::ExecutionContext;
use crate::errors::{ParseError, RuntimeError};
use crate::exec::instance::{OnStop, ScriptInstance};
use crate::lang::Flow;
use crate::types::ScriptStatus;

/// How the statement loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Ran out of lines or hit `exit`.
    Ended,
    ParseFailed(ParseError),
    Faulted(RuntimeError),
    /// `stop()` was called.
    Cancelled,
}

/// Run a script to completion, then clean up.
///
/// The statement loop runs in its own task. Whatever ends it (last line,
/// parse error, runtime fault, a panic, or a cancellation from `stop()`), the
/// instance ends `Stopped`, the client's scripting mode is switched off, and
/// `on_stop` runs exactly once.
pub(crate) async fn run_script(
    instance: Arc<ScriptInstance>,
    client: Arc<dyn Client>,
    argument_string: String,
    mut cancel_rx: oneshot::Receiver<()>,
    on_stop: OnStop,
) {
    let name = instance.name().to_string();
    let id = instance.id();
    info!(script = %name, %id, args = %argument_string, "script started");

    let mut handle = tokio::spawn(execute(
        Arc::clone(&instance),
        Arc::clone(&client),
        argument_string,
    ));

    let outcome = tokio::select! {
        joined = &mut handle => joined.unwrap_or_else(|e| outcome_of_join_error(&name, e)),
        _ = &mut cancel_rx => {
            handle.abort();
            let _ = handle.await;
            Outcome::Cancelled
        }
    };

    instance.mark_stopped();

    match &outcome {
        Outcome::Ended => {
            info!(script = %name, %id, "script ended");
            client
                .print(Message::plain(format!("Script \"{name}\" ended")))
                .await;
        }
        Outcome::ParseFailed(err) => {
            warn!(script = %name, %id, error = %err, "script failed to parse");
            client.print(Message::error(err.to_string())).await;
        }
        Outcome::Faulted(err) => {
            warn!(script = %name, %id, error = %err, "script faulted");
            client
                .print(Message::error(format!("Script error: {err}")))
                .await;
        }
        Outcome::Cancelled => {
            info!(script = %name, %id, "script stopped");
        }
    }

    if let Err(e) = client.send_command(SCRIPTING_OFF.to_string(), false).await {
        warn!(script = %name, %id, error = %e, "failed to leave scripting mode");
    }

    on_stop().await;
    instance.mark_finished();
    debug!(script = %name, %id, "execution task finished");
}

fn outcome_of_join_error(name: &str, err: JoinError) -> Outcome {
    if err.is_cancelled() {
        return Outcome::Cancelled;
    }
    let payload = err.into_panic();
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(script = %name, %reason, "execution task panicked");
    Outcome::Faulted(RuntimeError::Panicked(reason))
}

async fn execute(
    instance: Arc<ScriptInstance>,
    client: Arc<dyn Client>,
    argument_string: String,
) -> Outcome {
    if let Err(e) = client.send_command(SCRIPTING_ON.to_string(), false).await {
        warn!(script = %instance.name(), error = %e, "failed to enter scripting mode");
    }

    let program = match (instance.parser())(instance.source()) {
        Ok(program) => program,
        Err(err) => return Outcome::ParseFailed(err),
    };
    debug!(script = %instance.name(), lines = program.len(), "parsed script");

    let mut ctx = ExecutionContext::new(
        instance.name(),
        Arc::clone(&client),
        program,
        Arc::clone(instance.variables()),
        Arc::clone(instance.highlights()),
    );
    ctx.bind_arguments(&argument_string);

    loop {
        let Some(line) = ctx.next_line() else {
            return Outcome::Ended;
        };

        instance.wait_while_suspended().await;

        // Keeps tight loops of local-only statements stoppable.
        tokio::task::yield_now().await;
        if instance.status() == ScriptStatus::Stopped {
            return Outcome::Cancelled;
        }

        match line.statement.execute(&mut ctx).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Outcome::Ended,
            Err(err) => return Outcome::Faulted(err),
        }
    }
}
