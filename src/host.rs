//! # Host environment boundary.
//!
//! Everything outside the orchestration core (the live session, its UI, the
//! inventory) is reached through the [`Host`] trait. Asynchronous host
//! notifications travel through a [`HostHandle`] and are drained at the start
//! of the next tick.
//!
//! ```text
//!  host callbacks (any thread)          frame thread
//!  ──────────────────────────           ─────────────────────────────────────
//!  HostHandle::condition_changed ──┐
//!  HostHandle::logout ─────────────┼──► inbox ──► Orchestrator::tick() drains,
//!                                  │               then runs pollers/executors
//!                                  └──  (unbounded, FIFO)
//! ```

use tokio::sync::mpsc;

use crate::error::HostError;

/// Snapshot of the character's crafting stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterStats {
    pub level: u32,
    pub craftsmanship: u32,
    pub control: u32,
    pub cp: u32,
}

/// Raw crafting-related UI observation used to derive [`CraftState`](crate::session::CraftState).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraftObservation {
    /// Recipe log is open.
    pub log_open: bool,
    /// A synthesis window is up.
    pub synthesizing: bool,
    /// An action is being executed inside the synthesis.
    pub executing_action: bool,
    /// The synthesis reached its final step and is waiting to close.
    pub finished: bool,
    /// A quick synthesis is running.
    pub quick_synth: bool,
}

/// Host condition flags the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionFlag {
    /// Queued for a duty through the duty finder.
    WaitingForDutyFinder,
    /// Inside a duty.
    BoundByDuty,
    /// Any other host condition; ignored by the core.
    Other(u32),
}

/// Notification delivered by the host outside the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A condition flag changed value.
    ConditionChanged { flag: ConditionFlag, value: bool },
    /// The player logged out.
    Logout,
}

/// The live session the orchestrator automates.
///
/// All calls happen on the frame thread from inside a tick.
pub trait Host: Send {
    /// Whether a character is logged in.
    fn is_logged_in(&self) -> bool;

    /// Current crafting stats.
    fn character_stats(&self) -> CharacterStats;

    /// Current crafting UI state.
    fn observe_craft(&self) -> CraftObservation;

    /// Whether the inventory holds every ingredient for `recipe`.
    fn has_ingredients(&self, recipe: u32) -> bool;

    /// Whether equipment condition is at or below `threshold_percent`.
    fn needs_repair(&self, threshold_percent: u8) -> bool;

    /// Turns off host tweaks that interfere with automation.
    fn suppress_conflicting_tweaks(&mut self) {}

    /// Clicks "repeat" on a finished trial synthesis, if one is up.
    fn repeat_trial_craft(&mut self) {}

    /// Starts a synthesis (or a quick synthesis of `quantity` items).
    fn begin_craft(&mut self, recipe: u32, quantity: u32, quick_synth: bool)
    -> Result<(), HostError>;

    /// Repairs equipment.
    fn repair(&mut self) -> Result<(), HostError>;

    /// Closes the quick synthesis window.
    fn close_quick_synth(&mut self) -> Result<(), HostError>;

    /// Asks the host to leave the crafting UI.
    fn request_exit_craft(&mut self) -> Result<(), HostError>;
}

/// Cloneable sender for host notifications.
///
/// Cheap to clone and `Send`; safe to call from host callbacks on any thread.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl HostHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { tx }
    }

    /// Reports a condition flag change.
    ///
    /// Returns `false` if the orchestrator is gone.
    pub fn condition_changed(&self, flag: ConditionFlag, value: bool) -> bool {
        self.tx
            .send(HostEvent::ConditionChanged { flag, value })
            .is_ok()
    }

    /// Reports a logout.
    pub fn logout(&self) -> bool {
        self.tx.send(HostEvent::Logout).is_ok()
    }
}
