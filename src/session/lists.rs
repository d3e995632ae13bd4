//! Lists processing: crafts each `(recipe, quantity)` item of a list in order.

use tracing::{info, warn};

use crate::config::CraftingList;
use crate::events::{Bus, Event, EventKind};
use crate::host::Host;
use crate::tasks::CraftRequest;

use super::state::OrchestratorState;

/// Advances the selected list and requests the next craft once everything is idle.
pub(crate) fn update(
    state: &mut OrchestratorState,
    host: &dyn Host,
    lists: &[CraftingList],
    primary_idle: bool,
    bus: &Bus,
) {
    if !state.lists.processing || state.lists.paused {
        return;
    }
    let Some(list) = state
        .lists
        .selected
        .and_then(|id| lists.iter().find(|l| l.id == id))
    else {
        warn!(list = ?state.lists.selected, "selected list no longer exists");
        state.lists.processing = false;
        return;
    };

    if let Some(quantity) = state.crafting.completed {
        state.lists.crafted_current = state.lists.crafted_current.saturating_add(quantity);
    }
    while let Some(item) = list.recipes.get(state.lists.current_item) {
        if state.lists.crafted_current < item.quantity {
            break;
        }
        state.lists.current_item += 1;
        state.lists.crafted_current = 0;
    }
    let Some(item) = list.recipes.get(state.lists.current_item) else {
        state.lists.processing = false;
        state.lists.remaining_estimate = std::time::Duration::ZERO;
        info!(list = list.id, name = %list.name, "crafting list finished");
        bus.publish(Event::new(EventKind::ListFinished).with_count(list.id as usize));
        return;
    };

    if state.stop_request
        || !state.crafting.is_idle()
        || state.precrafting.is_busy()
        || !primary_idle
    {
        return;
    }

    if !host.has_ingredients(item.id) {
        state.lists.paused = true;
        warn!(list = list.id, recipe = item.id, "missing ingredients, list paused");
        bus.publish(
            Event::new(EventKind::ListPaused)
                .with_reason(format!("missing ingredients for recipe {}", item.id)),
        );
        return;
    }

    let remaining = item.quantity - state.lists.crafted_current;
    state.precrafting.request(CraftRequest {
        recipe: item.id,
        quantity: if item.quick_synth { remaining } else { 1 },
        quick_synth: item.quick_synth,
        repair_threshold: list.repair.then_some(list.repair_percent),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListItem;
    use crate::session::{ListsState, PreCraftPhase};
    use crate::testing::FakeHost;
    use std::time::Duration;

    fn item(id: u32, quantity: u32, quick_synth: bool) -> ListItem {
        ListItem {
            id,
            quantity,
            quick_synth,
        }
    }

    fn list(items: Vec<ListItem>) -> Vec<CraftingList> {
        vec![CraftingList {
            id: 1,
            name: "weekly".into(),
            recipes: items,
            ..CraftingList::default()
        }]
    }

    fn processing() -> OrchestratorState {
        OrchestratorState {
            lists: ListsState::started(1, Duration::from_secs(60)),
            ..OrchestratorState::default()
        }
    }

    fn requested(state: &OrchestratorState) -> Option<CraftRequest> {
        match state.precrafting.phase {
            PreCraftPhase::Pending(req) => Some(req),
            _ => None,
        }
    }

    #[test]
    fn skips_empty_items_and_requests_the_first_real_one() {
        let lists = list(vec![item(10, 0, false), item(11, 2, false)]);
        let mut state = processing();
        let host = FakeHost::new();
        host.set_ingredients(11, true);

        update(&mut state, &host, &lists, true, &Bus::new(8));
        assert_eq!(state.lists.current_item, 1);
        assert_eq!(requested(&state), Some(CraftRequest::single(11)));
    }

    #[test]
    fn counts_completions_and_finishes() {
        let lists = list(vec![item(10, 2, false)]);
        let mut state = processing();
        let host = FakeHost::new();
        host.set_ingredients(10, true);
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        state.crafting.completed = Some(1);
        update(&mut state, &host, &lists, true, &bus);
        assert_eq!(state.lists.crafted_current, 1);
        assert!(state.lists.processing);

        state.precrafting.reset();
        state.crafting.completed = Some(1);
        update(&mut state, &host, &lists, true, &bus);
        assert!(!state.lists.processing);
        assert_eq!(state.lists.remaining_estimate, Duration::ZERO);
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::ListFinished);
        assert_eq!(ev.count, Some(1));
    }

    #[test]
    fn quick_synth_requests_the_remaining_quantity() {
        let lists = list(vec![item(10, 5, true)]);
        let mut state = processing();
        state.lists.crafted_current = 2;
        let host = FakeHost::new();
        host.set_ingredients(10, true);

        update(&mut state, &host, &lists, true, &Bus::new(8));
        let req = requested(&state).unwrap();
        assert_eq!(req.quantity, 3);
        assert!(req.quick_synth);
    }

    #[test]
    fn missing_ingredients_pause_the_list() {
        let lists = list(vec![item(10, 1, false)]);
        let mut state = processing();
        let host = FakeHost::new();

        update(&mut state, &host, &lists, true, &Bus::new(8));
        assert!(state.lists.paused);
        assert!(state.lists.processing);
        assert_eq!(requested(&state), None);
    }

    #[test]
    fn repair_threshold_follows_the_list() {
        let mut lists = list(vec![item(10, 1, false)]);
        lists[0].repair = true;
        lists[0].repair_percent = 30;
        let mut state = processing();
        let host = FakeHost::new();
        host.set_ingredients(10, true);

        update(&mut state, &host, &lists, true, &Bus::new(8));
        assert_eq!(requested(&state).unwrap().repair_threshold, Some(30));
    }
}
