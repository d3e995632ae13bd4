//! # Queued tasks and their steps.
//!
//! A [`Task`] is one [`Step`] plus an optional absolute deadline. Steps are a
//! tagged enum rather than opaque closures so a continuation chain stays
//! inspectable: running a step yields [`Outcome::Done`] or
//! [`Outcome::Continue`] with the next step, which the executor re-enqueues at
//! the tail under the same deadline.
//!
//! ```text
//! ExitCraft(Begin) ──► close/exit requested ──► ExitCraft(AwaitIdle) ──► Done
//!                                                   │        ▲
//!                                                   └────────┘ still in a synth
//! ```

use std::fmt;
use std::time::Instant;

use crate::error::TaskError;
use crate::host::CraftObservation;

use super::action::TaskContext;
use super::action_fn::ActionRef;

/// A craft the automation wants the host to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftRequest {
    /// Recipe to craft.
    pub recipe: u32,
    /// Items to make; only more than 1 for quick synthesis.
    pub quantity: u32,
    /// Use quick synthesis.
    pub quick_synth: bool,
    /// Repair before crafting when condition is at or below this percent.
    pub repair_threshold: Option<u8>,
}

impl CraftRequest {
    /// A normal single synthesis of `recipe`.
    pub fn single(recipe: u32) -> Self {
        Self {
            recipe,
            quantity: 1,
            quick_synth: false,
            repair_threshold: None,
        }
    }
}

/// Progress of a forced exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPhase {
    /// Ask the host to leave whatever crafting UI is up.
    Begin,
    /// Wait until the crafting UI is gone.
    AwaitIdle,
}

/// Result of running one step.
#[derive(Debug)]
pub enum Outcome {
    /// The step is finished.
    Done,
    /// More work remains; enqueue this step at the tail.
    Continue(Step),
}

/// One unit of in-session work.
#[derive(Clone)]
pub enum Step {
    /// Forced exit out of the crafting UI.
    ExitCraft(ExitPhase),
    /// Close the quick synthesis window.
    CloseQuickSynth,
    /// Repair equipment.
    Repair,
    /// Start a synthesis.
    StartCraft(CraftRequest),
    /// Caller-supplied action.
    Custom(ActionRef),
}

impl Step {
    /// Stable label used in logs and events.
    pub fn label(&self) -> &str {
        match self {
            Step::ExitCraft(_) => "exit_craft",
            Step::CloseQuickSynth => "close_quick_synth",
            Step::Repair => "repair",
            Step::StartCraft(_) => "start_craft",
            Step::Custom(action) => action.name(),
        }
    }

    /// Whether this is part of a forced exit.
    #[inline]
    pub fn is_forced_exit(&self) -> bool {
        matches!(self, Step::ExitCraft(_))
    }

    /// Runs the step once against the host.
    pub fn run(&self, ctx: &mut TaskContext<'_>) -> Result<Outcome, TaskError> {
        match self {
            Step::ExitCraft(phase) => exit_craft(*phase, ctx),
            Step::CloseQuickSynth => {
                ctx.host.close_quick_synth()?;
                Ok(Outcome::Done)
            }
            Step::Repair => {
                ctx.host.repair()?;
                Ok(Outcome::Done)
            }
            Step::StartCraft(req) => {
                ctx.host
                    .begin_craft(req.recipe, req.quantity, req.quick_synth)?;
                Ok(Outcome::Done)
            }
            Step::Custom(action) => action.run(ctx),
        }
    }
}

fn exit_craft(phase: ExitPhase, ctx: &mut TaskContext<'_>) -> Result<Outcome, TaskError> {
    let obs = ctx.host.observe_craft();
    if !in_crafting_ui(&obs) {
        return Ok(Outcome::Done);
    }
    if obs.synthesizing {
        // cannot leave mid-synthesis; wait for it to end
        return Ok(Outcome::Continue(Step::ExitCraft(ExitPhase::AwaitIdle)));
    }
    match phase {
        ExitPhase::Begin => {
            if obs.quick_synth {
                ctx.host.close_quick_synth()?;
            } else {
                ctx.host.request_exit_craft()?;
            }
            Ok(Outcome::Continue(Step::ExitCraft(ExitPhase::AwaitIdle)))
        }
        ExitPhase::AwaitIdle => Ok(Outcome::Continue(Step::ExitCraft(ExitPhase::Begin))),
    }
}

#[inline]
fn in_crafting_ui(obs: &CraftObservation) -> bool {
    obs.log_open || obs.synthesizing || obs.quick_synth
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::ExitCraft(phase) => f.debug_tuple("ExitCraft").field(phase).finish(),
            Step::CloseQuickSynth => f.write_str("CloseQuickSynth"),
            Step::Repair => f.write_str("Repair"),
            Step::StartCraft(req) => f.debug_tuple("StartCraft").field(req).finish(),
            Step::Custom(action) => f.debug_tuple("Custom").field(&action.name()).finish(),
        }
    }
}

/// A queued step with an optional absolute deadline.
#[derive(Debug, Clone)]
pub struct Task {
    step: Step,
    deadline: Option<Instant>,
}

impl Task {
    /// A task without a deadline.
    pub fn new(step: Step) -> Self {
        Self {
            step,
            deadline: None,
        }
    }

    /// A task that expires at `deadline`.
    pub fn with_deadline(step: Step, deadline: Instant) -> Self {
        Self {
            step,
            deadline: Some(deadline),
        }
    }

    /// The head of a forced-exit chain.
    pub fn forced_exit(deadline: Option<Instant>) -> Self {
        Self {
            step: Step::ExitCraft(ExitPhase::Begin),
            deadline,
        }
    }

    #[inline]
    pub fn step(&self) -> &Step {
        &self.step
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn label(&self) -> &str {
        self.step.label()
    }

    #[inline]
    pub fn is_forced_exit(&self) -> bool {
        self.step.is_forced_exit()
    }

    /// Successor task carrying the same deadline.
    pub(crate) fn continue_with(&self, next: Step) -> Self {
        Self {
            step: next,
            deadline: self.deadline,
        }
    }
}

impl From<Step> for Task {
    fn from(step: Step) -> Self {
        Task::new(step)
    }
}
