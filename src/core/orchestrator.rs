//! # Orchestrator: the tick driver and the public automation operations.
//!
//! The [`Orchestrator`] owns the whole [`OrchestratorState`], both executors,
//! the host and the clock. Everything runs on the caller's thread, once per
//! host frame, in a fixed order:
//!
//! ```text
//! tick():
//!   0. drain host inbox (HostHandle) ─► interrupts/logout; fire due resume
//!   1. not logged in? ─► endurance off, lists off, primary cleared, SessionReset ─► return
//!   2. stats snapshot
//!   3. crafting state machine            (records completions)
//!   4. host compatibility tweaks
//!   5. precrafting                       (queues Repair/StartCraft on primary)
//!   6. endurance, then lists             (count completions, request crafts)
//!   7. repeat trial craft (one-shot, only with endurance off)
//!   8. ui.crafting_visible = !crafting idle
//!   9. lists ETA -= frame delta          (processing and not paused)
//!  10. control.run_tick(), then primary.run_tick()
//!  11. set_mode() ─► ModeChanged on change; exclusion asserted
//!      (dropping to None resets precrafting and clears primary)
//! ```
//!
//! ## Stop and interrupt
//! ```text
//! stop_crafting():  suspend mode ─► close quick synth ─► reset precrafting
//!                   ─► cancel pending resume (and the stop request it would clear)
//!                   ─► primary.clear() ─► control.force_exit()
//! duty queue pop:   stop_request = true ─► reset precrafting
//!                   ─► primary.clear() ─► control.force_exit()
//! duty ends:        pending resume at now + delay ─► (tick) stop_request = false
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::CommandError;
use crate::events::{Bus, Event, EventKind};
use crate::host::{ConditionFlag, Host, HostEvent, HostHandle};
use crate::interrupt::{InterruptAction, InterruptController, InterruptPolicy, PendingResume};
use crate::mode::{self, Mode, Transition, derive_mode};
use crate::session::{self, CraftState, OrchestratorState};
use crate::tasks::{Executor, ExecutorConfig, Task, TaskQueue};

use super::builder::OrchestratorBuilder;

/// Name of the executor reserved for forced exits.
pub const CONTROL: &str = "control";
/// Name of the executor running normal automation.
pub const PRIMARY: &str = "primary";

/// Single owner of all orchestration state.
pub struct Orchestrator {
    pub(crate) cfg: Config,
    pub(crate) config_path: Option<PathBuf>,
    host: Box<dyn Host>,
    clock: Arc<dyn Clock>,
    bus: Bus,
    inbox: mpsc::UnboundedReceiver<HostEvent>,
    handle: HostHandle,
    interrupts: InterruptController,
    control: Executor,
    primary: Executor,
    pub(crate) state: OrchestratorState,
    last_tick: Option<Instant>,
    ticks: u64,
}

impl Orchestrator {
    /// Starts building an orchestrator over `cfg`.
    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: Config,
        config_path: Option<PathBuf>,
        host: Box<dyn Host>,
        clock: Arc<dyn Clock>,
        bus: Bus,
    ) -> Self {
        let (tx, inbox) = mpsc::unbounded_channel();
        let state = OrchestratorState {
            endurance: session::EnduranceState {
                recipe_id: cfg.endurance.recipe_id,
                ..Default::default()
            },
            ..Default::default()
        };
        let control = Executor::new(
            CONTROL,
            ExecutorConfig {
                time_limit: cfg.executor.control_time_limit(),
                show_debug: cfg.executor.show_debug,
            },
        );
        let primary = Executor::new(
            PRIMARY,
            ExecutorConfig {
                time_limit: cfg.executor.time_limit(),
                show_debug: cfg.executor.show_debug,
            },
        );
        Self {
            interrupts: InterruptController::new(cfg.interrupt),
            cfg,
            config_path,
            host,
            clock,
            bus,
            inbox,
            handle: HostHandle::new(tx),
            control,
            primary,
            state,
            last_tick: None,
            ticks: 0,
        }
    }

    /// Runs one frame.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |prev| now.saturating_duration_since(prev));
        self.last_tick = Some(now);
        self.ticks += 1;

        self.drain_inbox();
        self.fire_due_resume(now);

        if !self.host.is_logged_in() {
            self.reset_session("not logged in");
            self.set_mode();
            return;
        }

        self.state.stats = self.host.character_stats();

        let obs = self.host.observe_craft();
        session::crafting::update(&mut self.state, &obs, &self.bus);

        self.host.suppress_conflicting_tweaks();

        session::precrafting::update(
            &mut self.state,
            &*self.host,
            &mut self.primary,
            now,
            self.cfg.precraft_timeout(),
            &self.bus,
        );

        session::endurance::update(
            &mut self.state,
            &*self.host,
            self.cfg.endurance.limit(),
            self.primary.queue().is_empty(),
            &self.bus,
        );
        session::lists::update(
            &mut self.state,
            &*self.host,
            &self.cfg.crafting_lists,
            self.primary.queue().is_empty(),
            &self.bus,
        );

        if self.state.repeat_trial && !self.state.endurance.enabled {
            self.state.repeat_trial = false;
            self.host.repeat_trial_craft();
        }

        self.state.ui.crafting_visible = !self.state.crafting.is_idle();

        if self.state.lists.processing && !self.state.lists.paused {
            self.state.lists.remaining_estimate =
                self.state.lists.remaining_estimate.saturating_sub(delta);
        }

        self.control
            .run_tick(&mut *self.host, &*self.clock, &self.bus);
        self.primary
            .run_tick(&mut *self.host, &*self.clock, &self.bus);

        self.set_mode();
    }

    /// Reports the owning mode from the subsystem flags.
    ///
    /// Never changes the flags; publishes `ModeChanged` when the reported mode moved.
    /// When the mode drops to `None`, the pending craft request and the primary
    /// backlog go with it.
    pub fn set_mode(&mut self) -> Mode {
        debug_assert!(
            self.state.modes_exclusive(),
            "endurance and lists active at the same time"
        );
        let mode = derive_mode(self.state.endurance.enabled, self.state.lists.processing);
        if mode != self.state.current_mode {
            if mode == Mode::None {
                self.release_automation("mode released");
            }
            info!(from = %self.state.current_mode, to = %mode, "mode changed");
            self.bus
                .publish(Event::new(EventKind::ModeChanged).with_mode(mode));
            self.state.current_mode = mode;
        }
        mode
    }

    /// Enters Endurance.
    pub fn start_endurance(&mut self) -> Result<Transition, CommandError> {
        let res = mode::start_endurance(&mut self.state, &*self.host);
        self.settle(res)
    }

    /// Leaves Endurance.
    pub fn stop_endurance(&mut self) -> Result<Transition, CommandError> {
        let res = mode::stop_endurance(&mut self.state);
        self.settle(res)
    }

    /// Starts Endurance when off, stops it when on.
    pub fn toggle_endurance(&mut self) -> Result<Transition, CommandError> {
        if self.state.endurance.enabled {
            self.stop_endurance()
        } else {
            self.start_endurance()
        }
    }

    /// Starts processing the list `id`.
    pub fn start_list(&mut self, id: u32) -> Result<Transition, CommandError> {
        let res = mode::start_list(
            &mut self.state,
            &self.cfg.crafting_lists,
            id,
            self.cfg.estimated_craft(),
        );
        self.settle(res)
    }

    /// Forces automation to a safe stop.
    ///
    /// Returns the mode that was suspended, if any. Calling it again leaves
    /// the same state behind.
    pub fn stop_crafting(&mut self) -> Option<Mode> {
        let suspended = mode::suspend(&mut self.state);

        if self.state.crafting.state == CraftState::QuickCraft {
            if let Err(err) = self.host.close_quick_synth() {
                warn!(error = %err, "failed to close quick synthesis");
            }
        }
        self.state.precrafting.reset();
        if self.state.pending_resume.take().is_some() {
            // the duty is over; nothing else would clear the request
            self.state.stop_request = false;
            debug!("pending resume cancelled, stop request cleared");
        }
        self.primary.clear(&self.bus, "crafting stopped");
        let deadline = self.exit_deadline();
        self.control
            .force_exit(deadline, &self.bus, "crafting stopped");

        info!(suspended = ?suspended, "crafting stopped");
        let mut ev = Event::new(EventKind::CraftingStopped);
        if let Some(mode) = suspended {
            ev = ev.with_mode(mode);
        }
        self.bus.publish(ev);
        self.set_mode();
        suspended
    }

    /// Restores the mode suspended by the last [`stop_crafting`](Self::stop_crafting).
    pub fn resume_crafting(&mut self) -> Result<Transition, CommandError> {
        match mode::resume(&mut self.state) {
            Ok(Transition::Entered(mode)) => {
                info!(%mode, "crafting resumed");
                self.bus
                    .publish(Event::new(EventKind::CraftingResumed).with_mode(mode));
                self.set_mode();
                Ok(Transition::Entered(mode))
            }
            Ok(other) => Ok(other),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Selects the recipe Endurance loops.
    pub fn set_endurance_recipe(&mut self, recipe: u32) {
        self.state.endurance.recipe_id = recipe;
    }

    /// Arms the one-shot "repeat trial craft".
    pub fn set_repeat_trial(&mut self, on: bool) {
        self.state.repeat_trial = on;
    }

    /// Replaces the interrupt policy. A resume that is already scheduled still fires.
    pub fn set_interrupt_policy(&mut self, policy: InterruptPolicy) {
        self.interrupts.set_policy(policy);
        self.cfg.interrupt = policy;
    }

    /// Applies a condition change right away.
    ///
    /// Host callbacks running off the frame thread go through [`handle`](Self::handle) instead.
    pub fn on_condition_change(&mut self, flag: ConditionFlag, value: bool) {
        let now = self.clock.now();
        match self.interrupts.evaluate(flag, value, self.state.stop_request) {
            InterruptAction::Suspend => {
                self.state.stop_request = true;
                self.state.precrafting.reset();
                self.primary.clear(&self.bus, "duty queue popped");
                let deadline = self.exit_deadline();
                self.control
                    .force_exit(deadline, &self.bus, "duty queue popped");
                info!("duty queue popped, automation suspended");
                self.bus.publish(Event::new(EventKind::InterruptRequested));
            }
            InterruptAction::ScheduleResume(delay) => {
                let pending =
                    PendingResume::merge(self.state.pending_resume, PendingResume::new(now, delay));
                self.state.pending_resume = Some(pending);
                let wait = pending.fire_at.saturating_duration_since(now);
                info!(delay_ms = wait.as_millis() as u64, "resume scheduled");
                self.bus
                    .publish(Event::new(EventKind::ResumeScheduled).with_delay(wait));
            }
            InterruptAction::Ignore => {}
        }
    }

    /// Applies a logout right away.
    pub fn on_logout(&mut self) {
        self.reset_session("logout");
        self.set_mode();
    }

    /// Sender for host notifications.
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Appends a task to the primary queue.
    pub fn enqueue(&mut self, task: impl Into<Task>) {
        self.primary.enqueue(task);
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn current_mode(&self) -> Mode {
        self.state.current_mode
    }

    pub fn primary_queue(&self) -> &TaskQueue {
        self.primary.queue()
    }

    pub fn control_queue(&self) -> &TaskQueue {
        self.control.queue()
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of ticks driven so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Logs and publishes a rejected operation, handing the error back.
    pub(crate) fn reject(&self, err: CommandError) -> CommandError {
        error!(label = err.as_label(), "{err}");
        self.bus.publish(
            Event::new(EventKind::CommandRejected)
                .with_task(err.as_label())
                .with_reason(err.to_string()),
        );
        err
    }

    fn settle(&mut self, res: Result<Transition, CommandError>) -> Result<Transition, CommandError> {
        match res {
            Ok(t) => {
                self.set_mode();
                Ok(t)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn drain_inbox(&mut self) {
        while let Ok(ev) = self.inbox.try_recv() {
            match ev {
                HostEvent::ConditionChanged { flag, value } => self.on_condition_change(flag, value),
                HostEvent::Logout => self.reset_session("logout"),
            }
        }
    }

    fn fire_due_resume(&mut self, now: Instant) {
        let Some(pending) = self.state.pending_resume else {
            return;
        };
        if !pending.is_due(now) {
            return;
        }
        self.state.pending_resume = None;
        self.state.stop_request = false;
        info!("stop request cleared, automation may resume");
        self.bus.publish(Event::new(EventKind::ResumeFired));
    }

    fn reset_session(&mut self, reason: &'static str) {
        let was_active = self.state.endurance.enabled || self.state.lists.processing;
        self.state.endurance.enabled = false;
        self.state.lists.processing = false;
        self.release_automation(reason);
        if was_active {
            info!(reason, "automation forced off");
            self.bus
                .publish(Event::new(EventKind::SessionReset).with_reason(reason));
        }
    }

    /// Drops the pending craft request and everything queued on primary.
    fn release_automation(&mut self, reason: &str) {
        self.state.precrafting.reset();
        self.primary.clear(&self.bus, reason);
    }

    fn exit_deadline(&self) -> Option<Instant> {
        self.cfg
            .executor
            .exit_craft_timeout()
            .map(|timeout| self.clock.now() + timeout)
    }
}
