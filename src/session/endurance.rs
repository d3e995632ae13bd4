//! Endurance loop: crafts one recipe again and again.

use tracing::info;

use crate::events::{Bus, Event, EventKind};
use crate::host::Host;
use crate::tasks::CraftRequest;

use super::state::OrchestratorState;

/// Counts completions and requests the next craft once everything is idle.
pub(crate) fn update(
    state: &mut OrchestratorState,
    host: &dyn Host,
    craft_limit: Option<u32>,
    primary_idle: bool,
    bus: &Bus,
) {
    if !state.endurance.enabled {
        return;
    }
    if let Some(quantity) = state.crafting.completed {
        state.endurance.crafted = state.endurance.crafted.saturating_add(quantity);
    }
    if let Some(limit) = craft_limit {
        if state.endurance.crafted >= limit {
            finish(state, "craft limit reached", bus);
            return;
        }
    }
    if state.stop_request
        || !state.crafting.is_idle()
        || state.precrafting.is_busy()
        || !primary_idle
    {
        return;
    }

    let recipe = state.endurance.recipe_id;
    if !host.has_ingredients(recipe) {
        finish(state, "out of ingredients", bus);
        return;
    }
    state.precrafting.request(CraftRequest::single(recipe));
}

fn finish(state: &mut OrchestratorState, reason: &'static str, bus: &Bus) {
    state.endurance.enabled = false;
    info!(crafted = state.endurance.crafted, reason, "endurance finished");
    bus.publish(
        Event::new(EventKind::EnduranceFinished)
            .with_reason(reason)
            .with_count(state.endurance.crafted as usize),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CraftState, PreCraftPhase};
    use crate::testing::FakeHost;

    fn running(recipe: u32) -> (OrchestratorState, FakeHost, Bus) {
        let mut state = OrchestratorState::default();
        state.endurance.enabled = true;
        state.endurance.recipe_id = recipe;
        let host = FakeHost::new();
        host.set_ingredients(recipe, true);
        (state, host, Bus::new(8))
    }

    #[test]
    fn requests_a_craft_when_idle() {
        let (mut state, host, bus) = running(9);
        update(&mut state, &host, None, true, &bus);
        assert_eq!(
            state.precrafting.phase,
            PreCraftPhase::Pending(CraftRequest::single(9))
        );
    }

    #[test]
    fn holds_back_while_busy_or_stopped() {
        let (mut state, host, bus) = running(9);
        state.crafting.state = CraftState::InProgress;
        update(&mut state, &host, None, true, &bus);
        assert!(!state.precrafting.is_busy());

        state.crafting.state = CraftState::IdleBetween;
        update(&mut state, &host, None, false, &bus);
        assert!(!state.precrafting.is_busy());

        state.stop_request = true;
        update(&mut state, &host, None, true, &bus);
        assert!(!state.precrafting.is_busy());
        assert!(state.endurance.enabled);
    }

    #[test]
    fn finishes_at_the_craft_limit() {
        let (mut state, host, bus) = running(9);
        let mut rx = bus.subscribe();
        state.endurance.crafted = 2;
        state.crafting.completed = Some(1);

        update(&mut state, &host, Some(3), true, &bus);
        assert!(!state.endurance.enabled);
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::EnduranceFinished);
        assert_eq!(ev.count, Some(3));
    }

    #[test]
    fn finishes_when_out_of_ingredients() {
        let (mut state, host, bus) = running(9);
        host.set_ingredients(9, false);
        update(&mut state, &host, None, true, &bus);
        assert!(!state.endurance.enabled);
        assert!(!state.precrafting.is_busy());
    }
}
