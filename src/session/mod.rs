//! # Session state and per-tick pollers.
//!
//! Each subsystem owns a small state value inside [`OrchestratorState`] and a
//! poller that runs once per tick, in this order:
//!
//! ```text
//! stats ─► crafting ─► (host tweaks) ─► precrafting ─► endurance ─► lists
//! ```
//!
//! Later pollers read what earlier ones wrote in the same tick: endurance and
//! lists count the completion the crafting poller just recorded, and only
//! request a craft when precrafting is idle.

pub(crate) mod crafting;
pub(crate) mod endurance;
pub(crate) mod lists;
pub(crate) mod precrafting;
mod state;

pub use crafting::{CraftState, CraftingState};
pub use precrafting::{PreCraftPhase, PreCrafting};
pub use state::{
    Editor, EnduranceState, ListsState, OpenWindow, OrchestratorState, UiState,
};
