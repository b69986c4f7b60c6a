// src/lang/template.rs

//! Text with `%variable` references, parsed once and rendered per use.
//!
//! Reference forms:
//! - `%name` where name is letters, digits, `_` and `.`
//! - `%{name}` for names adjacent to other text or containing other characters
//! - `%%` for a literal percent sign
//!
//! A name may carry a scope prefix (`local.`, `global.`, `properties.`); see
//! [`VariableRef`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ScopeKind;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%|%\{([^}]*)(\})?|%([A-Za-z0-9_.]+)").expect("valid reference regex")
});

/// A variable name with an optional explicit scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub scope: Option<ScopeKind>,
    pub name: String,
}

impl VariableRef {
    /// `global.weapon` -> (Global, "weapon"); `weapon` -> (None, "weapon").
    ///
    /// A prefix that is not a scope name is part of the variable name.
    pub fn parse(raw: &str) -> Self {
        if let Some((prefix, rest)) = raw.split_once('.') {
            if !rest.is_empty() {
                if let Ok(scope) = prefix.parse::<ScopeKind>() {
                    return Self {
                        scope: Some(scope),
                        name: rest.to_string(),
                    };
                }
            }
        }
        Self {
            scope: None,
            name: raw.to_string(),
        }
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(ScopeKind::Local) => write!(f, "local.{}", self.name),
            Some(ScopeKind::Global) => write!(f, "global.{}", self.name),
            Some(ScopeKind::Session) => write!(f, "properties.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(VariableRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `text`. Fails only on an unterminated or empty `%{...}`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in REFERENCE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&text[last..whole.start()]);
            last = whole.end();

            let name = if let Some(braced) = caps.get(1) {
                if caps.get(2).is_none() {
                    return Err(format!("unterminated '%{{' in '{text}'"));
                }
                if braced.as_str().trim().is_empty() {
                    return Err(format!("empty variable reference in '{text}'"));
                }
                braced.as_str().trim()
            } else if let Some(bare) = caps.get(3) {
                // Sentence punctuation after a reference is literal text.
                let name = bare.as_str().trim_end_matches('.');
                if name.is_empty() {
                    literal.push_str(whole.as_str());
                    continue;
                }
                last = bare.start() + name.len();
                name
            } else {
                literal.push('%');
                continue;
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Variable(VariableRef::parse(name)));
        }

        literal.push_str(&text[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text itself when it contains no variable references.
    pub fn as_static(&self) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Variable(_) => return None,
            }
        }
        Some(out)
    }
}
