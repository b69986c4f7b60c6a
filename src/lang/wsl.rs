// src/lang/wsl.rs

//! Parser for the line-oriented wizard script language (`.wsl`, `.cmd`, `.wiz`).
//!
//! ```text
//! # comments start with '#'
//! start:
//!   if_1 goto hunt
//!   echo usage: .hunt <target>
//!   exit
//! hunt:
//!   put attack %1
//!   counter add 1
//!   pause 3
//!   goto hunt
//! ```
//!
//! Keywords are case-insensitive. A line may start with `label:`; a label on
//! its own line becomes a no-op line that jumps can target.

use std::sync::LazyLock;

use regex::Regex;

use crate::args::split_first_word;
use crate::errors::ParseError;
use crate::types::ScopeKind;

use super::line::{Line, Program};
use super::statement::{CounterOp, Statement};
use super::template::{Template, VariableRef};

static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_\-]+):(?:\s+(.*))?$").expect("valid label regex"));

static IF_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)if_([0-9]+)$").expect("valid if_N regex"));

pub fn parse_wsl(source: &str) -> Result<Program, ParseError> {
    let mut lines = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let (label, body) = match LABEL.captures(text) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""),
            ),
            None => (None, text),
        };

        let statement = if body.is_empty() {
            Statement::NoOp
        } else {
            parse_statement(body).map_err(|reason| ParseError::new(number, reason))?
        };

        lines.push(Line {
            number,
            label,
            statement,
        });
    }

    Program::new(lines)
}

fn parse_statement(text: &str) -> Result<Statement, String> {
    let (keyword, rest) = split_first_word(text);
    let rest = rest.unwrap_or("");

    if let Some(caps) = IF_ARG.captures(keyword) {
        let index = caps[1]
            .parse::<usize>()
            .map_err(|_| format!("invalid argument index in '{keyword}'"))?;
        if rest.is_empty() {
            return Err(format!("'{keyword}' requires a statement"));
        }
        let then = parse_statement(rest)?;
        return Ok(Statement::IfArg {
            index,
            then: Box::new(then),
        });
    }

    let statement = match keyword.to_lowercase().as_str() {
        "put" => Statement::Put(required_template("put", rest)?),
        "echo" => Statement::Echo(Template::parse(rest)?),
        "debug" => Statement::Debug(Template::parse(rest)?),
        "setvariable" => parse_set(rest, ScopeKind::Global)?,
        "setlocalvariable" => parse_set(rest, ScopeKind::Local)?,
        "deletevariable" => parse_delete(rest, ScopeKind::Global)?,
        "deletelocalvariable" => parse_delete(rest, ScopeKind::Local)?,
        "goto" => Statement::Goto(required_template("goto", rest)?),
        "pause" => {
            let seconds = if rest.is_empty() { "1" } else { rest };
            Statement::Pause(Template::parse(seconds)?)
        }
        "counter" => parse_counter(rest)?,
        "shift" => Statement::Shift,
        "addhighlight" => Statement::AddHighlight(required_template("addhighlight", rest)?),
        "deletehighlight" => {
            Statement::DeleteHighlight(required_template("deletehighlight", rest)?)
        }
        "exit" => Statement::Exit,
        other => return Err(format!("unknown command '{other}'")),
    };

    Ok(statement)
}

fn required_template(keyword: &str, rest: &str) -> Result<Template, String> {
    if rest.is_empty() {
        return Err(format!("'{keyword}' requires an argument"));
    }
    Template::parse(rest)
}

fn parse_set(rest: &str, default_scope: ScopeKind) -> Result<Statement, String> {
    let (name, value) = split_first_word(rest);
    if name.is_empty() {
        return Err("missing variable name".to_string());
    }
    Ok(Statement::SetVariable {
        target: VariableRef::parse(name),
        value: Template::parse(value.unwrap_or(""))?,
        default_scope,
    })
}

fn parse_delete(rest: &str, default_scope: ScopeKind) -> Result<Statement, String> {
    let (name, extra) = split_first_word(rest);
    if name.is_empty() {
        return Err("missing variable name".to_string());
    }
    if extra.is_some() {
        return Err(format!("unexpected text after variable name '{name}'"));
    }
    Ok(Statement::DeleteVariable {
        target: VariableRef::parse(name),
        default_scope,
    })
}

fn parse_counter(rest: &str) -> Result<Statement, String> {
    let (op, amount) = split_first_word(rest);
    let op = match op.to_lowercase().as_str() {
        "set" => CounterOp::Set,
        "add" => CounterOp::Add,
        "subtract" => CounterOp::Subtract,
        "multiply" => CounterOp::Multiply,
        "divide" => CounterOp::Divide,
        "" => return Err("'counter' requires an operation".to_string()),
        other => return Err(format!("unknown counter operation '{other}'")),
    };
    let amount = amount.unwrap_or("1");
    Ok(Statement::Counter {
        op,
        amount: Template::parse(amount)?,
    })
}
