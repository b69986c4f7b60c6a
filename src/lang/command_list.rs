// src/lang/command_list.rs

//! Parser for plain command lists (`.txt`): one session command per line.
//!
//! Blank lines and lines starting with `#` are skipped; everything else is
//! sent as-is after `%variable` interpolation.

use crate::errors::ParseError;

use super::line::{Line, Program};
use super::statement::Statement;
use super::template::Template;

pub fn parse_command_list(source: &str) -> Result<Program, ParseError> {
    let mut lines = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let command = Template::parse(text).map_err(|reason| ParseError::new(number, reason))?;
        lines.push(Line {
            number,
            label: None,
            statement: Statement::Put(command),
        });
    }

    Program::new(lines)
}
