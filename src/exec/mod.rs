// src/exec/mod.rs

//! Script execution layer.
//!
//! - [`instance`] is the per-run state machine (start/stop/suspend/resume).
//! - [`runner`] is the execution task: scripting mode, parse, statement loop,
//!   and the cleanup every exit path shares.
//! - [`rendezvous`] is the single-slot resume signal.

pub mod instance;
pub mod rendezvous;
pub mod runner;

pub use instance::{OnStop, ScriptInstance};
pub use rendezvous::ResumeSignal;
pub use runner::Outcome;
