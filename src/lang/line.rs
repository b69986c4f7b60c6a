// src/lang/line.rs

//! Parsed script programs: a flat, immutable list of lines plus a label index.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ParseError;

use super::statement::Statement;

/// One executable line. `number` is the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub label: Option<String>,
    pub statement: Statement,
}

/// An ordered sequence of lines, addressed by index.
///
/// Jumps are index assignments: labels map (case-insensitively) to the index
/// of the line carrying them.
#[derive(Debug, Clone, Default)]
pub struct Program {
    lines: Vec<Arc<Line>>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Build a program, rejecting duplicate labels and jumps to labels that do
    /// not exist. Jump targets containing variable references are checked
    /// when they run instead.
    pub fn new(lines: Vec<Line>) -> Result<Self, ParseError> {
        let mut labels = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if let Some(label) = &line.label {
                if labels.insert(label.to_lowercase(), idx).is_some() {
                    return Err(ParseError::new(
                        line.number,
                        format!("duplicate label '{label}'"),
                    ));
                }
            }
        }

        for line in &lines {
            if let Some(target) = line.statement.static_jump_target() {
                if !labels.contains_key(&target.to_lowercase()) {
                    return Err(ParseError::new(
                        line.number,
                        format!("unknown label '{target}'"),
                    ));
                }
            }
        }

        Ok(Self {
            lines: lines.into_iter().map(Arc::new).collect(),
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&Arc<Line>> {
        self.lines.get(index)
    }

    /// Index of the line carrying `label`, ignoring case.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.get(&label.to_lowercase()).copied()
    }
}

/// Turns script source text into a [`Program`]. One per script language.
pub type ParseFn = fn(&str) -> Result<Program, ParseError>;
