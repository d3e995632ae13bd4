//! Guarded transitions of the mode state machine.
//!
//! Each function validates its preconditions first and only then mutates the
//! session state, so a rejected transition leaves everything untouched.

use crate::config::CraftingList;
use crate::error::CommandError;
use crate::host::Host;
use crate::session::{ListsState, OrchestratorState};

use super::{Mode, derive_mode};

use std::time::Duration;

/// Result of an accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The given mode now owns execution.
    Entered(Mode),
    /// The given mode released execution.
    Left(Mode),
    /// Self-transition; nothing changed.
    Unchanged,
}

/// `None → Endurance`.
pub(crate) fn start_endurance(
    state: &mut OrchestratorState,
    host: &dyn Host,
) -> Result<Transition, CommandError> {
    if state.endurance.enabled {
        return Ok(Transition::Unchanged);
    }
    if state.lists.processing {
        return Err(CommandError::ListProcessing);
    }
    let recipe = state.endurance.recipe_id;
    if recipe == 0 {
        return Err(CommandError::NoRecipe);
    }
    if !host.has_ingredients(recipe) {
        return Err(CommandError::MissingIngredients { recipe });
    }

    state.endurance.enabled = true;
    state.endurance.crafted = 0;
    state.suspended_mode = None;
    Ok(Transition::Entered(Mode::Endurance))
}

/// `Endurance → None` on explicit request.
pub(crate) fn stop_endurance(state: &mut OrchestratorState) -> Result<Transition, CommandError> {
    if !state.endurance.enabled {
        return Err(CommandError::EnduranceNotRunning);
    }
    state.endurance.enabled = false;
    Ok(Transition::Left(Mode::Endurance))
}

/// `None → Lists`.
pub(crate) fn start_list(
    state: &mut OrchestratorState,
    lists: &[CraftingList],
    id: u32,
    estimated_craft: Duration,
) -> Result<Transition, CommandError> {
    let Some(list) = lists.iter().find(|l| l.id == id) else {
        return Err(CommandError::ListNotFound { id });
    };
    if state.lists.processing {
        return if state.lists.selected == Some(id) {
            Ok(Transition::Unchanged)
        } else {
            Err(CommandError::ListBusy)
        };
    }
    if state.endurance.enabled {
        return Err(CommandError::EnduranceActive);
    }

    let crafts: u32 = list.recipes.iter().map(|r| r.quantity).sum();
    state.lists = ListsState::started(id, estimated_craft.saturating_mul(crafts));
    state.suspended_mode = None;
    Ok(Transition::Entered(Mode::Lists))
}

/// Forces the owning mode off and remembers it for [`resume`].
///
/// Returns the suspended mode, or `None` when nothing was active. A second
/// call keeps the mode remembered by the first one.
pub(crate) fn suspend(state: &mut OrchestratorState) -> Option<Mode> {
    let mode = derive_mode(state.endurance.enabled, state.lists.processing);
    state.current_mode = mode;
    match mode {
        Mode::Endurance => state.endurance.enabled = false,
        Mode::Lists => {
            state.lists.paused = true;
            state.lists.processing = false;
        }
        Mode::None => return None,
    }
    state.suspended_mode = Some(mode);
    Some(mode)
}

/// Restores the mode remembered by the last [`suspend`].
///
/// With nothing suspended, a list that paused itself is unpaused instead.
pub(crate) fn resume(state: &mut OrchestratorState) -> Result<Transition, CommandError> {
    let Some(suspended) = state.suspended_mode else {
        if state.lists.processing && state.lists.paused {
            state.lists.paused = false;
            return Ok(Transition::Entered(Mode::Lists));
        }
        return Ok(Transition::Unchanged);
    };
    let active = derive_mode(state.endurance.enabled, state.lists.processing);
    if active != Mode::None && active != suspended {
        return Err(CommandError::ResumeConflict { suspended, active });
    }

    match suspended {
        Mode::Endurance => state.endurance.enabled = true,
        Mode::Lists => {
            state.lists.processing = true;
            state.lists.paused = false;
        }
        Mode::None => {}
    }
    state.suspended_mode = None;
    Ok(Transition::Entered(suspended))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListItem;
    use crate::testing::FakeHost;

    fn list(id: u32, quantities: &[u32]) -> CraftingList {
        CraftingList {
            id,
            name: format!("list-{id}"),
            recipes: quantities
                .iter()
                .enumerate()
                .map(|(i, &quantity)| ListItem {
                    id: 100 + i as u32,
                    quantity,
                    quick_synth: false,
                })
                .collect(),
            ..CraftingList::default()
        }
    }

    #[test]
    fn endurance_without_recipe_is_rejected() {
        let mut state = OrchestratorState::default();
        let host = FakeHost::new();

        let err = start_endurance(&mut state, &host).unwrap_err();
        assert_eq!(err, CommandError::NoRecipe);
        assert!(!state.endurance.enabled);
    }

    #[test]
    fn endurance_checks_ingredients() {
        let mut state = OrchestratorState::default();
        state.endurance.recipe_id = 42;
        let host = FakeHost::new();

        let err = start_endurance(&mut state, &host).unwrap_err();
        assert_eq!(err, CommandError::MissingIngredients { recipe: 42 });

        host.set_ingredients(42, true);
        assert_eq!(
            start_endurance(&mut state, &host),
            Ok(Transition::Entered(Mode::Endurance))
        );
        assert_eq!(
            start_endurance(&mut state, &host),
            Ok(Transition::Unchanged)
        );
    }

    #[test]
    fn endurance_conflicts_with_lists() {
        let mut state = OrchestratorState::default();
        state.endurance.recipe_id = 42;
        let host = FakeHost::new();
        host.set_ingredients(42, true);
        start_list(&mut state, &[list(1, &[2])], 1, Duration::from_secs(10)).unwrap();

        let err = start_endurance(&mut state, &host).unwrap_err();
        assert_eq!(err, CommandError::ListProcessing);
        assert!(!state.endurance.enabled);
    }

    #[test]
    fn list_start_validates_and_estimates() {
        let mut state = OrchestratorState::default();
        let lists = [list(1, &[2, 3])];

        assert_eq!(
            start_list(&mut state, &lists, 7, Duration::from_secs(10)),
            Err(CommandError::ListNotFound { id: 7 })
        );
        assert!(!state.lists.processing);

        start_list(&mut state, &lists, 1, Duration::from_secs(10)).unwrap();
        assert!(state.lists.processing);
        assert_eq!(state.lists.remaining_estimate, Duration::from_secs(50));
        assert_eq!(
            start_list(&mut state, &lists, 1, Duration::from_secs(10)),
            Ok(Transition::Unchanged)
        );
    }

    #[test]
    fn list_start_conflicts() {
        let mut state = OrchestratorState::default();
        let lists = [list(1, &[1]), list(2, &[1])];
        start_list(&mut state, &lists, 1, Duration::ZERO).unwrap();
        assert_eq!(
            start_list(&mut state, &lists, 2, Duration::ZERO),
            Err(CommandError::ListBusy)
        );

        let mut state = OrchestratorState::default();
        state.endurance.enabled = true;
        assert_eq!(
            start_list(&mut state, &lists, 1, Duration::ZERO),
            Err(CommandError::EnduranceActive)
        );
    }

    #[test]
    fn suspend_is_idempotent_and_resumable() {
        let mut state = OrchestratorState::default();
        state.endurance.enabled = true;

        assert_eq!(suspend(&mut state), Some(Mode::Endurance));
        assert_eq!(suspend(&mut state), None);
        assert_eq!(state.suspended_mode, Some(Mode::Endurance));
        assert!(!state.endurance.enabled);

        assert_eq!(resume(&mut state), Ok(Transition::Entered(Mode::Endurance)));
        assert!(state.endurance.enabled);
        assert_eq!(resume(&mut state), Ok(Transition::Unchanged));
    }

    #[test]
    fn suspend_lists_pauses_and_clears_processing() {
        let mut state = OrchestratorState::default();
        start_list(&mut state, &[list(3, &[1])], 3, Duration::ZERO).unwrap();

        assert_eq!(suspend(&mut state), Some(Mode::Lists));
        assert!(state.lists.paused);
        assert!(!state.lists.processing);

        resume(&mut state).unwrap();
        assert!(state.lists.processing);
        assert!(!state.lists.paused);
        assert_eq!(state.lists.selected, Some(3));
    }

    #[test]
    fn resume_unpauses_a_self_paused_list() {
        let mut state = OrchestratorState::default();
        start_list(&mut state, &[list(4, &[1])], 4, Duration::ZERO).unwrap();
        state.lists.paused = true;

        assert_eq!(resume(&mut state), Ok(Transition::Entered(Mode::Lists)));
        assert!(!state.lists.paused);
    }

    #[test]
    fn resume_refuses_to_break_exclusion() {
        let mut state = OrchestratorState::default();
        state.endurance.enabled = true;
        suspend(&mut state);
        state.lists.processing = true;

        assert_eq!(
            resume(&mut state),
            Err(CommandError::ResumeConflict {
                suspended: Mode::Endurance,
                active: Mode::Lists
            })
        );
        assert!(!state.endurance.enabled);
    }

    #[test]
    fn stop_endurance_requires_running() {
        let mut state = OrchestratorState::default();
        assert_eq!(
            stop_endurance(&mut state),
            Err(CommandError::EnduranceNotRunning)
        );
        state.endurance.enabled = true;
        assert_eq!(
            stop_endurance(&mut state),
            Ok(Transition::Left(Mode::Endurance))
        );
    }
}
