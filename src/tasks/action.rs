//! # Caller-supplied steps.
//!
//! [`Action`] is the extension point for work the built-in [`Step`](super::Step)
//! variants do not cover. An action runs synchronously on the frame thread
//! and must finish quickly; multi-tick work returns
//! [`Outcome::Continue`](super::Outcome::Continue) with its next step instead
//! of blocking.
//!
//! # Example
//! ```
//! use autocraft::{Action, Outcome, TaskContext, TaskError};
//!
//! struct Repair;
//!
//! impl Action for Repair {
//!     fn name(&self) -> &str { "repair_all" }
//!
//!     fn run(&self, ctx: &mut TaskContext<'_>) -> Result<Outcome, TaskError> {
//!         ctx.host.repair()?;
//!         Ok(Outcome::Done)
//!     }
//! }
//! ```

use std::time::Instant;

use crate::error::TaskError;
use crate::host::Host;

use super::task::Outcome;

/// Everything a step may touch while it runs.
pub struct TaskContext<'a> {
    /// The live session.
    pub host: &'a mut dyn Host,
    /// Instant the step started.
    pub now: Instant,
}

/// Synchronous, named unit of work.
pub trait Action: Send + Sync + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Runs one step of the action.
    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<Outcome, TaskError>;
}
