//! Error types used by the orchestrator, its executors and the host boundary.
//!
//! This module defines the error enums surfaced by the crate:
//!
//! - [`CommandError`]: precondition and conflict violations of user operations
//!   (starting a mode, opening a list, ...). Always user-visible, never fatal.
//! - [`TaskError`]: failures of a single queued step, caught at the executor boundary.
//! - [`HostError`]: failures reported by the host environment.
//! - [`RuntimeError`]: failures of the async frame driver itself.
//!
//! Every type provides `as_label` (stable snake_case label for logs/metrics).

use std::time::Duration;
use thiserror::Error;

use crate::mode::Mode;

/// # Rejected user operations.
///
/// Raised when a command or public operation cannot run in the current state.
/// The operation is aborted and no state is mutated.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Endurance requested without a target recipe.
    #[error("Cannot start endurance without setting a recipe.")]
    NoRecipe,

    /// Endurance requested while ingredients are missing.
    #[error(
        "Cannot start endurance as you do not possess all ingredients for your recipe in your inventory."
    )]
    MissingIngredients {
        /// Recipe the check ran against.
        recipe: u32,
    },

    /// Endurance requested while a crafting list is processing.
    #[error("Cannot start endurance whilst processing a list.")]
    ListProcessing,

    /// A list was requested while endurance owns execution.
    #[error("Cannot start a list whilst endurance is active.")]
    EnduranceActive,

    /// Stop requested while endurance is not running.
    #[error("Endurance is not running so cannot be stopped.")]
    EnduranceNotRunning,

    /// The list id is not configured.
    #[error("List ID does not exist.")]
    ListNotFound {
        /// Requested list id.
        id: u32,
    },

    /// Another list is processing.
    #[error("Unable to open list whilst processing.")]
    ListBusy,

    /// The macro id is not configured.
    #[error("Macro ID does not exist.")]
    MacroNotFound {
        /// Requested macro id.
        id: u32,
    },

    /// Macro editing requested while a craft is running.
    #[error("Unable to open edit macros whilst crafting.")]
    CraftingBusy,

    /// A numeric id argument did not parse.
    #[error("Unable to parse ID as a number.")]
    InvalidId {
        /// Raw argument text.
        raw: String,
    },

    /// Resume requested while another mode took over in the meantime.
    #[error("Cannot resume {suspended} whilst {active} is active.")]
    ResumeConflict {
        /// Mode that was suspended by the last stop.
        suspended: Mode,
        /// Mode currently owning execution.
        active: Mode,
    },
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use autocraft::CommandError;
    ///
    /// assert_eq!(CommandError::NoRecipe.as_label(), "command_no_recipe");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::NoRecipe => "command_no_recipe",
            CommandError::MissingIngredients { .. } => "command_missing_ingredients",
            CommandError::ListProcessing => "command_list_processing",
            CommandError::EnduranceActive => "command_endurance_active",
            CommandError::EnduranceNotRunning => "command_endurance_not_running",
            CommandError::ListNotFound { .. } => "command_list_not_found",
            CommandError::ListBusy => "command_list_busy",
            CommandError::MacroNotFound { .. } => "command_macro_not_found",
            CommandError::CraftingBusy => "command_crafting_busy",
            CommandError::InvalidId { .. } => "command_invalid_id",
            CommandError::ResumeConflict { .. } => "command_resume_conflict",
        }
    }

    /// Indicates a conflict with another active mode rather than a missing precondition.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CommandError::ListProcessing
                | CommandError::EnduranceActive
                | CommandError::ListBusy
                | CommandError::CraftingBusy
                | CommandError::ResumeConflict { .. }
        )
    }
}

/// # Errors reported by the host environment.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host UI element needed for the action is not available.
    #[error("addon not ready: {addon}")]
    AddonNotReady {
        /// Host-side element name.
        addon: String,
    },

    /// The host refused the action.
    #[error("action rejected: {reason}")]
    Rejected {
        /// Host-provided reason.
        reason: String,
    },
}

/// # Errors produced by step execution.
///
/// Caught by the executor; they never escape a tick.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Step failed; the remaining queue is kept.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task reached the head of the queue after its deadline.
    #[error("deadline exceeded by {overdue:?}")]
    Expired {
        /// How far past the deadline the task was when it was popped.
        overdue: Duration,
    },

    /// The step panicked; the panic was isolated at the executor boundary.
    #[error("step panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// A host call made by the step failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use autocraft::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Expired { .. } => "task_expired",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Host(_) => "task_host_error",
        }
    }

    /// Convenience constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }
}

/// # Errors produced by the async frame driver.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Installing the OS signal listeners failed.
    #[error("failed to install shutdown signal handler: {0}")]
    Signal(#[from] std::io::Error),

    /// The frame interval was zero.
    #[error("frame interval must be non-zero")]
    ZeroFrameInterval,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::ZeroFrameInterval => "runtime_zero_frame_interval",
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_messages_match_user_facing_text() {
        assert_eq!(
            CommandError::ListNotFound { id: 7 }.to_string(),
            "List ID does not exist."
        );
        assert_eq!(
            CommandError::InvalidId { raw: "x".into() }.to_string(),
            "Unable to parse ID as a number."
        );
        assert_eq!(
            CommandError::ResumeConflict {
                suspended: Mode::Endurance,
                active: Mode::Lists
            }
            .to_string(),
            "Cannot resume Endurance whilst Lists is active."
        );
    }

    #[test]
    fn conflicts_are_classified() {
        assert!(CommandError::ListProcessing.is_conflict());
        assert!(CommandError::EnduranceActive.is_conflict());
        assert!(!CommandError::NoRecipe.is_conflict());
        assert!(!CommandError::ListNotFound { id: 1 }.is_conflict());
    }

    #[test]
    fn host_errors_convert_into_task_errors() {
        let err: TaskError = HostError::AddonNotReady {
            addon: "RecipeNote".into(),
        }
        .into();
        assert_eq!(err.as_label(), "task_host_error");
        assert!(err.to_string().contains("RecipeNote"));
    }
}
