//! # Interrupt decisions.
//!
//! [`InterruptController::evaluate`] maps one host condition change to an
//! [`InterruptAction`]. It is pure: applying the action (clearing queues,
//! scheduling the resume) is the orchestrator's job, which keeps all queue
//! mutation on the frame thread.
//!
//! ## Decision table
//! ```text
//! flag                   value  policy                         stop_request  → action
//! WaitingForDutyFinder   true   stop                           any           → Suspend
//! BoundByDuty            false  stop + resume                  true          → ScheduleResume(delay)
//! anything else                                                              → Ignore
//! ```

use std::time::Duration;

use crate::host::ConditionFlag;

use super::policy::InterruptPolicy;

/// What to do about a condition change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Raise the stop request, drop pending work and force an exit.
    Suspend,
    /// Clear the stop request after the given settling delay.
    ScheduleResume(Duration),
    /// Not relevant.
    Ignore,
}

/// Stateless evaluator over the current [`InterruptPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptController {
    policy: InterruptPolicy,
}

impl InterruptController {
    pub fn new(policy: InterruptPolicy) -> Self {
        Self { policy }
    }

    /// Replaces the policy. A resume that is already scheduled stays scheduled.
    pub fn set_policy(&mut self, policy: InterruptPolicy) {
        self.policy = policy;
    }

    /// Decides how to react to `flag` becoming `value`.
    pub fn evaluate(&self, flag: ConditionFlag, value: bool, stop_request: bool) -> InterruptAction {
        if !self.policy.request_to_stop_duty {
            return InterruptAction::Ignore;
        }
        match (flag, value) {
            (ConditionFlag::WaitingForDutyFinder, true) => InterruptAction::Suspend,
            (ConditionFlag::BoundByDuty, false) if stop_request && self.policy.resumes() => {
                InterruptAction::ScheduleResume(self.policy.resume_delay())
            }
            _ => InterruptAction::Ignore,
        }
    }
}
