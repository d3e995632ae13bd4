//! Duty interrupts: policy, decisions and the deferred resume.
//!
//! ## Contents
//! - [`InterruptPolicy`]     which duty transitions suspend/resume automation
//! - [`InterruptController`] maps a condition change to an [`InterruptAction`]
//! - [`PendingResume`]       explicit wake time for the delayed resume
//!
//! ## Two-phase protocol
//! ```text
//! WaitingForDutyFinder=true ──► Suspend: stop_request=true, primary cleared,
//!                                        control = [ExitCraft]
//! BoundByDuty=false         ──► ScheduleResume(delay): PendingResume{fire_at}
//! tick at fire_at           ──► stop_request=false (idempotent)
//! ```

mod controller;
mod policy;
mod timer;

pub use controller::{InterruptAction, InterruptController};
pub use policy::InterruptPolicy;
pub use timer::PendingResume;
