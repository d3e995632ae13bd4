//! Crafting progress derived from host UI observations.
//!
//! ```text
//!                 quick_synth ─────────────────────────────► QuickCraft
//! IdleNormal ─┐                                                 │
//! IdleBetween ┴─ synthesizing ─► WaitStart ─► InProgress ◄─► WaitAction
//!      ▲                                          │
//!      │                                          ▼ finished
//!      └──────────── window closed ◄──────── WaitFinish
//!                    (craft completed)
//! ```

use tracing::debug;

use crate::events::{Bus, Event, EventKind};
use crate::host::CraftObservation;

use super::state::OrchestratorState;

/// Crafting UI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CraftState {
    /// No crafting UI.
    #[default]
    IdleNormal,
    /// Recipe log open between crafts.
    IdleBetween,
    /// Synthesis window just opened.
    WaitStart,
    /// Synthesis running, ready for the next action.
    InProgress,
    /// An action is executing.
    WaitAction,
    /// Final step done, waiting for the window to close.
    WaitFinish,
    /// Quick synthesis running.
    QuickCraft,
}

impl CraftState {
    #[inline]
    pub fn is_idle(self) -> bool {
        matches!(self, CraftState::IdleNormal | CraftState::IdleBetween)
    }

    /// Next state given the current observation.
    pub fn next(self, obs: &CraftObservation) -> CraftState {
        if obs.quick_synth {
            CraftState::QuickCraft
        } else if obs.synthesizing {
            if obs.finished {
                CraftState::WaitFinish
            } else if obs.executing_action {
                CraftState::WaitAction
            } else if self.is_idle() {
                CraftState::WaitStart
            } else {
                CraftState::InProgress
            }
        } else if obs.log_open {
            CraftState::IdleBetween
        } else {
            CraftState::IdleNormal
        }
    }
}

/// Crafting subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraftingState {
    pub state: CraftState,
    /// Quantity finished during the current tick.
    pub completed: Option<u32>,
}

impl CraftingState {
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }
}

/// Advances the crafting state machine and records completions.
pub(crate) fn update(state: &mut OrchestratorState, obs: &CraftObservation, bus: &Bus) {
    let prev = state.crafting.state;
    let next = prev.next(obs);
    state.crafting.completed = None;

    if !prev.is_idle() && next.is_idle() {
        let quantity = state.precrafting.in_flight.take().unwrap_or(1);
        state.crafting.completed = Some(quantity);
        debug!(quantity, ?prev, "craft completed");
        bus.publish(Event::new(EventKind::CraftCompleted).with_count(quantity as usize));
    }
    if prev != next {
        debug!(?prev, ?next, "crafting state changed");
    }
    state.crafting.state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(log_open: bool, synthesizing: bool) -> CraftObservation {
        CraftObservation {
            log_open,
            synthesizing,
            ..CraftObservation::default()
        }
    }

    #[test]
    fn walks_through_a_normal_synthesis() {
        let mut s = CraftState::IdleBetween;
        s = s.next(&obs(true, true));
        assert_eq!(s, CraftState::WaitStart);
        s = s.next(&obs(true, true));
        assert_eq!(s, CraftState::InProgress);
        s = s.next(&CraftObservation {
            executing_action: true,
            ..obs(true, true)
        });
        assert_eq!(s, CraftState::WaitAction);
        s = s.next(&CraftObservation {
            finished: true,
            ..obs(true, true)
        });
        assert_eq!(s, CraftState::WaitFinish);
        s = s.next(&obs(true, false));
        assert_eq!(s, CraftState::IdleBetween);
    }

    #[test]
    fn completion_uses_in_flight_quantity() {
        let bus = Bus::new(8);
        let mut state = OrchestratorState::default();
        state.precrafting.in_flight = Some(5);
        state.crafting.state = CraftState::QuickCraft;

        update(&mut state, &obs(true, false), &bus);
        assert_eq!(state.crafting.completed, Some(5));
        assert_eq!(state.precrafting.in_flight, None);

        update(&mut state, &obs(true, false), &bus);
        assert_eq!(state.crafting.completed, None);
    }

    #[test]
    fn completion_defaults_to_one() {
        let bus = Bus::new(8);
        let mut state = OrchestratorState::default();
        state.crafting.state = CraftState::WaitFinish;

        update(&mut state, &obs(false, false), &bus);
        assert_eq!(state.crafting.completed, Some(1));
        assert!(state.crafting.is_idle());
    }
}
