//! Test doubles shared by the unit tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HostError;
use crate::host::{CharacterStats, CraftObservation, Host};

#[derive(Debug, Default)]
pub(crate) struct FakeHostState {
    pub logged_in: bool,
    pub stats: CharacterStats,
    pub craft: CraftObservation,
    pub ingredients: HashSet<u32>,
    pub needs_repair: bool,
    pub fail_exit: bool,
    pub calls: Vec<String>,
}

/// Scriptable host. Clones share state so tests keep a handle after giving
/// one to the orchestrator.
#[derive(Debug, Clone)]
pub(crate) struct FakeHost {
    inner: Arc<Mutex<FakeHostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        let state = FakeHostState {
            logged_in: true,
            ..FakeHostState::default()
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeHostState> {
        self.inner.lock().unwrap()
    }

    pub fn set_ingredients(&self, recipe: u32, present: bool) {
        let mut s = self.state();
        if present {
            s.ingredients.insert(recipe);
        } else {
            s.ingredients.remove(&recipe);
        }
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.state().logged_in = logged_in;
    }

    pub fn set_craft(&self, craft: CraftObservation) {
        self.state().craft = craft;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }
}

impl Host for FakeHost {
    fn is_logged_in(&self) -> bool {
        self.state().logged_in
    }

    fn character_stats(&self) -> CharacterStats {
        self.state().stats
    }

    fn observe_craft(&self) -> CraftObservation {
        self.state().craft
    }

    fn has_ingredients(&self, recipe: u32) -> bool {
        self.state().ingredients.contains(&recipe)
    }

    fn needs_repair(&self, _threshold_percent: u8) -> bool {
        self.state().needs_repair
    }

    fn suppress_conflicting_tweaks(&mut self) {
        self.record("suppress_tweaks".into());
    }

    fn repeat_trial_craft(&mut self) {
        self.record("repeat_trial".into());
    }

    fn begin_craft(
        &mut self,
        recipe: u32,
        quantity: u32,
        quick_synth: bool,
    ) -> Result<(), HostError> {
        self.record(format!("begin_craft:{recipe}:{quantity}:{quick_synth}"));
        Ok(())
    }

    fn repair(&mut self) -> Result<(), HostError> {
        self.record("repair".into());
        self.state().needs_repair = false;
        Ok(())
    }

    fn close_quick_synth(&mut self) -> Result<(), HostError> {
        self.record("close_quick_synth".into());
        Ok(())
    }

    fn request_exit_craft(&mut self) -> Result<(), HostError> {
        self.record("exit_craft".into());
        if self.state().fail_exit {
            return Err(HostError::AddonNotReady {
                addon: "RecipeNote".into(),
            });
        }
        Ok(())
    }
}
