//! # Automation modes and their mutual exclusion.
//!
//! At any time execution is owned by at most one [`Mode`]:
//!
//! ```text
//!            start_endurance()                 start_list(id)
//!   ┌──────────────────────────┐      ┌──────────────────────────┐
//!   │                          ▼      ▼                          │
//! Endurance ◄──────────────── None ──────────────────────────► Lists
//!   │   stop / interrupt /     ▲      ▲   stop / interrupt /     │
//!   └── natural completion ────┘      └── list exhausted ────────┘
//! ```
//!
//! ## Rules
//! - Entering a mode while the other is active fails with an explicit
//!   [`CommandError`](crate::CommandError); nothing is queued.
//! - Self-transitions are no-ops.
//! - [`derive_mode`] only *reports* the owning mode from the subsystem flags;
//!   it never changes them.

mod machine;

pub use machine::Transition;
pub(crate) use machine::{resume, start_endurance, start_list, stop_endurance, suspend};

use std::fmt;

/// Automation mode currently owning execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Nothing automated.
    #[default]
    None,
    /// Single recipe crafted repeatedly.
    Endurance,
    /// Batch of recipe/quantity pairs crafted in order.
    Lists,
}

impl Mode {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Mode::None => "none",
            Mode::Endurance => "endurance",
            Mode::Lists => "lists",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::None => "None",
            Mode::Endurance => "Endurance",
            Mode::Lists => "Lists",
        };
        f.write_str(name)
    }
}

/// Derives the owning mode from the subsystem flags.
///
/// Endurance wins if both flags are somehow set; callers assert the
/// exclusion invariant separately.
#[inline]
pub fn derive_mode(endurance_enabled: bool, lists_processing: bool) -> Mode {
    if endurance_enabled {
        Mode::Endurance
    } else if lists_processing {
        Mode::Lists
    } else {
        Mode::None
    }
}
