//! The single explicit state value owned by an [`Orchestrator`](crate::Orchestrator).
//!
//! Every subsystem flag that decides which mode owns execution lives here and
//! is only written from the frame thread.

use std::time::Duration;

use crate::host::CharacterStats;
use crate::interrupt::PendingResume;
use crate::mode::Mode;

use super::crafting::CraftingState;
use super::precrafting::PreCrafting;

/// Endurance subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnduranceState {
    /// Endurance owns execution.
    pub enabled: bool,
    /// Recipe being looped (`0` = none).
    pub recipe_id: u32,
    /// Crafts completed since the last start.
    pub crafted: u32,
}

/// Lists subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListsState {
    /// Lists owns execution.
    pub processing: bool,
    /// Processing is on hold (user stop or missing ingredients).
    pub paused: bool,
    /// List being processed.
    pub selected: Option<u32>,
    /// Index of the item being crafted.
    pub current_item: usize,
    /// Crafts done for the current item.
    pub crafted_current: u32,
    /// Time left, counted down while processing.
    pub remaining_estimate: Duration,
}

impl ListsState {
    /// Fresh state for a list that starts processing now.
    pub fn started(id: u32, remaining_estimate: Duration) -> Self {
        Self {
            processing: true,
            paused: false,
            selected: Some(id),
            current_item: 0,
            crafted_current: 0,
            remaining_estimate,
        }
    }
}

/// Main window opened through the command surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenWindow {
    #[default]
    Overview,
    Main,
    Lists,
    Endurance,
    Macro,
    SpecialList,
    FcWorkshop,
    Simulator,
}

/// Editor window opened on a specific entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    List(u32),
    Macro(u32),
}

/// Window requests and projections read by the UI layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_open: bool,
    pub window: OpenWindow,
    pub editor: Option<Editor>,
    /// Crafting UI is up; recomputed every tick.
    pub crafting_visible: bool,
}

/// All orchestration state.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorState {
    /// Mode reported by the last `set_mode`.
    pub current_mode: Mode,
    /// Mode remembered by the last stop, restored by resume.
    pub suspended_mode: Option<Mode>,
    /// Raised by a duty interrupt; holds automation back until cleared.
    pub stop_request: bool,
    /// Deferred clear of `stop_request`.
    pub pending_resume: Option<PendingResume>,
    /// One-shot "repeat trial craft" request.
    pub repeat_trial: bool,
    pub stats: CharacterStats,
    pub crafting: CraftingState,
    pub precrafting: PreCrafting,
    pub endurance: EnduranceState,
    pub lists: ListsState,
    pub ui: UiState,
}

impl OrchestratorState {
    /// Whether the mutual exclusion of modes holds.
    #[inline]
    pub fn modes_exclusive(&self) -> bool {
        !(self.endurance.enabled && self.lists.processing)
    }
}
