// src/lang/statement.rs

//! The closed set of statements every script language compiles to.
//!
//! Engines differ in surface syntax only; once parsed, every line carries one
//! [`Statement`] and is executed here against an [`ExecutionContext`].

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::client::{BoxFuture, Message};
use crate::context::ExecutionContext;
use crate::errors::RuntimeError;
use crate::types::{Highlight, ScopeKind};

use super::template::{Template, VariableRef};

/// Local variable used by `counter`.
pub const COUNTER_VARIABLE: &str = "c";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// What the statement loop does after a statement completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop the script as if it had run out of lines.
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Label-only lines.
    NoOp,
    /// Send a command to the session, echoed to the user.
    Put(Template),
    /// Show text to the user.
    Echo(Template),
    Debug(Template),
    /// Bind a variable. Unscoped targets use `default_scope`.
    SetVariable {
        target: VariableRef,
        value: Template,
        default_scope: ScopeKind,
    },
    DeleteVariable {
        target: VariableRef,
        default_scope: ScopeKind,
    },
    Goto(Template),
    /// Sleep for a number of seconds (fractions allowed).
    Pause(Template),
    Counter {
        op: CounterOp,
        amount: Template,
    },
    /// Drop the first positional argument and renumber the rest.
    Shift,
    /// Run `then` only when positional argument `index` was supplied.
    IfArg {
        index: usize,
        then: Box<Statement>,
    },
    AddHighlight(Template),
    DeleteHighlight(Template),
    Exit,
}

impl Statement {
    /// Jump target known without running the script, if any.
    pub fn static_jump_target(&self) -> Option<String> {
        match self {
            Statement::Goto(target) => target.as_static(),
            Statement::IfArg { then, .. } => then.static_jump_target(),
            _ => None,
        }
    }

    pub fn execute<'a>(
        &'a self,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, Result<Flow, RuntimeError>> {
        Box::pin(async move {
            match self {
                Statement::NoOp => {}
                Statement::Put(text) => {
                    let line = ctx.render(text)?;
                    ctx.client()
                        .send_command(line, true)
                        .await
                        .map_err(|e| RuntimeError::Client(e.to_string()))?;
                }
                Statement::Echo(text) => {
                    let text = ctx.render(text)?;
                    ctx.client().print(Message::plain(text)).await;
                }
                Statement::Debug(text) => {
                    let text = ctx.render(text)?;
                    ctx.client().debug(text).await;
                }
                Statement::SetVariable {
                    target,
                    value,
                    default_scope,
                } => {
                    let value = ctx.render(value)?;
                    ctx.assign(target, *default_scope, value).await?;
                }
                Statement::DeleteVariable {
                    target,
                    default_scope,
                } => {
                    ctx.unset(target, *default_scope).await?;
                }
                Statement::Goto(target) => {
                    let label = ctx.render(target)?;
                    ctx.goto(&label)?;
                }
                Statement::Pause(seconds) => {
                    let raw = ctx.render(seconds)?;
                    let duration = parse_seconds(&raw)?;
                    debug!(script = %ctx.script_name(), ?duration, "pausing");
                    tokio::time::sleep(duration).await;
                }
                Statement::Counter { op, amount } => {
                    let raw = ctx.render(amount)?;
                    apply_counter(ctx, *op, &raw)?;
                }
                Statement::Shift => ctx.shift(),
                Statement::IfArg { index, then } => {
                    if ctx.local().contains(&index.to_string()) {
                        return then.execute(ctx).await;
                    }
                }
                Statement::AddHighlight(pattern) => {
                    let pattern = ctx.render(pattern)?;
                    if let Err(e) = Regex::new(&pattern) {
                        return Err(RuntimeError::InvalidPattern {
                            pattern,
                            reason: e.to_string(),
                        });
                    }
                    let character = ctx
                        .character_id()
                        .ok_or_else(|| RuntimeError::NoCharacter("add a highlight".into()))?;
                    let repo = Arc::clone(ctx.highlights());
                    repo.save_highlight(character, Highlight { pattern })
                        .await
                        .map_err(|e| RuntimeError::Client(e.to_string()))?;
                }
                Statement::DeleteHighlight(pattern) => {
                    let pattern = ctx.render(pattern)?;
                    let character = ctx
                        .character_id()
                        .ok_or_else(|| RuntimeError::NoCharacter("delete a highlight".into()))?;
                    let repo = Arc::clone(ctx.highlights());
                    repo.delete_highlight(character, pattern)
                        .await
                        .map_err(|e| RuntimeError::Client(e.to_string()))?;
                }
                Statement::Exit => return Ok(Flow::Exit),
            }
            Ok(Flow::Continue)
        })
    }
}

/// Seconds as a sleep duration. Negative, non-finite and out-of-range values
/// are rejected.
fn parse_seconds(raw: &str) -> Result<Duration, RuntimeError> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| RuntimeError::TypeMismatch {
            context: "pause".to_string(),
            value: raw.to_string(),
        })
}

fn parse_integer(context: &str, raw: &str) -> Result<i64, RuntimeError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RuntimeError::TypeMismatch {
            context: context.to_string(),
            value: raw.to_string(),
        })
}

fn apply_counter(ctx: &mut ExecutionContext, op: CounterOp, raw: &str) -> Result<(), RuntimeError> {
    let amount = parse_integer("counter amount", raw)?;
    let current = match ctx.local().get(COUNTER_VARIABLE) {
        Some(value) => parse_integer("counter", value)?,
        None => 0,
    };

    let next = match op {
        CounterOp::Set => amount,
        CounterOp::Add => current.saturating_add(amount),
        CounterOp::Subtract => current.saturating_sub(amount),
        CounterOp::Multiply => current.saturating_mul(amount),
        CounterOp::Divide => {
            current
                .checked_div(amount)
                .ok_or_else(|| RuntimeError::TypeMismatch {
                    context: "counter divisor".to_string(),
                    value: raw.to_string(),
                })?
        }
    };

    ctx.set_script_variable(COUNTER_VARIABLE, next.to_string());
    Ok(())
}
