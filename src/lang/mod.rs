// src/lang/mod.rs

//! Script languages.
//!
//! - [`template`] parses `%variable` references inside statement operands.
//! - [`statement`] is the shared, closed statement set and its interpreter.
//! - [`line`] holds parsed programs (lines + label index).
//! - [`wsl`] and [`command_list`] are the two surface syntaxes.

pub mod command_list;
pub mod line;
pub mod statement;
pub mod template;
pub mod wsl;

pub use command_list::parse_command_list;
pub use line::{Line, ParseFn, Program};
pub use statement::{CounterOp, Flow, Statement};
pub use template::{Segment, Template, VariableRef};
pub use wsl::parse_wsl;
