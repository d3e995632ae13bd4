//! # Duty interrupt policy.
//!
//! [`InterruptPolicy`] decides whether host duty transitions suspend
//! automation and whether it comes back by itself.
//!
//! ```text
//! request_to_stop_duty   = false  → duty transitions are ignored
//! request_to_stop_duty   = true   → entering the duty queue suspends automation
//! request_to_resume_duty = true   → leaving the duty resumes after `request_to_resume_delay` seconds
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User-configured interrupt booleans and the resume delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterruptPolicy {
    /// Suspend automation when the duty finder pops a queue.
    pub request_to_stop_duty: bool,
    /// Clear the stop request after the duty ends.
    pub request_to_resume_duty: bool,
    /// Settling time after the duty ends, in seconds.
    pub request_to_resume_delay: u64,
}

impl InterruptPolicy {
    /// Resume delay as a [`Duration`].
    #[inline]
    pub fn resume_delay(&self) -> Duration {
        Duration::from_secs(self.request_to_resume_delay)
    }

    /// Whether a finished duty should schedule a resume.
    #[inline]
    pub fn resumes(&self) -> bool {
        self.request_to_stop_duty && self.request_to_resume_duty
    }
}
