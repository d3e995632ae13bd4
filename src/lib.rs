//! # autocraft
//!
//! **Autocraft** is a tick-driven orchestration core for crafting automation.
//!
//! It serializes in-session actions through two prioritized task queues,
//! arbitrates between mutually exclusive automation modes, and suspends or
//! resumes automation when the host reports duty-related conditions. The
//! solver, the UI and the host bindings live outside; the core reaches the
//! live session through the [`Host`] trait.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   user commands            host callbacks (any thread)
//!  /artisan <args>           HostHandle::{condition_changed, logout}
//!        │                                │
//!        ▼                                ▼ (inbox, drained at tick start)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator (single owner, frame thread)                        │
//! │  - OrchestratorState (modes, stop request, sessions, UI request)  │
//! │  - Mode machine (None / Endurance / Lists, mutually exclusive)    │
//! │  - InterruptController + PendingResume (duty suspend/resume)      │
//! │  - Executor "control" ──► TaskQueue (exit, cleanup)               │
//! │  - Executor "primary" ──► TaskQueue (repair, start craft, ...)    │
//! └──────┬─────────────────────────────────────────────────────┬──────┘
//!        │ Host calls                                          │ publishes
//!        ▼                                                     ▼
//!   ┌──────────┐                              ┌─────────────────────────┐
//!   │   Host   │                              │  Bus (broadcast channel)│
//!   └──────────┘                              └────────────┬────────────┘
//!                                                          ▼
//!                                              Runtime listener (optional)
//!                                                          ▼
//!                                                  SubscriberSet
//!                                              (per-subscriber queues)
//!                                           ┌──────────┼──────────┐
//!                                           ▼          ▼          ▼
//!                                        LogWriter   sub2 …     subN
//! ```
//!
//! ### One tick
//! ```text
//! Orchestrator::tick()
//!   ├─► drain host inbox (condition changes, logout)
//!   ├─► fire PendingResume if due ─► stop_request = false
//!   ├─► not logged in?  ─► reset session, return
//!   ├─► stats ─► crafting ─► host tweaks ─► precrafting ─► endurance ─► lists
//!   ├─► repeat trial (one-shot) ─► ui.crafting_visible ─► lists ETA
//!   ├─► control.run_tick()   (always first)
//!   ├─► primary.run_tick()
//!   └─► current_mode = derive_mode(flags)
//!
//! Executor::run_tick(budget B)
//!   first task always runs; next one only if elapsed + slowest ≤ B
//!   Done ─► dropped   Continue(step) ─► tail, same deadline, next tick
//!   Err / panic / expired ─► TaskFailed; failed forced exit clears the queue
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                           |
//! |--------------------|---------------------------------------------------------------|----------------------------------------------|
//! | **Orchestration**  | Tick driver, operations, host notifications.                  | [`Orchestrator`], [`OrchestratorBuilder`]    |
//! | **Execution**      | Budgeted FIFO executors and their steps.                      | [`Executor`], [`Task`], [`Step`], [`Action`] |
//! | **Modes**          | Endurance / Lists exclusion and resume.                       | [`Mode`], [`Transition`]                     |
//! | **Interrupts**     | Duty suspend and delayed resume.                              | [`InterruptPolicy`], [`PendingResume`]       |
//! | **Commands**       | `/artisan` argument parsing and dispatch.                     | [`Command`]                                  |
//! | **Subscriber API** | Observe orchestration events.                                 | [`Subscribe`], [`Event`]                     |
//! | **Configuration**  | TOML settings, crafting lists, legacy migration.              | [`Config`], [`CraftingList`]                 |
//! | **Runtime**        | Optional tokio frame loop with signal handling.               | [`Runtime`], [`RuntimeConfig`]               |
//! | **Errors**         | Typed errors for commands, steps and the host.                | [`CommandError`], [`TaskError`]              |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use autocraft::{Config, CraftObservation, CharacterStats, Host, HostError, Mode, Orchestrator};
//!
//! struct Bench;
//!
//! impl Host for Bench {
//!     fn is_logged_in(&self) -> bool { true }
//!     fn character_stats(&self) -> CharacterStats { CharacterStats::default() }
//!     fn observe_craft(&self) -> CraftObservation { CraftObservation::default() }
//!     fn has_ingredients(&self, _recipe: u32) -> bool { true }
//!     fn needs_repair(&self, _threshold: u8) -> bool { false }
//!     fn begin_craft(&mut self, _: u32, _: u32, _: bool) -> Result<(), HostError> { Ok(()) }
//!     fn repair(&mut self) -> Result<(), HostError> { Ok(()) }
//!     fn close_quick_synth(&mut self) -> Result<(), HostError> { Ok(()) }
//!     fn request_exit_craft(&mut self) -> Result<(), HostError> { Ok(()) }
//! }
//!
//! let mut cfg = Config::default();
//! cfg.endurance.recipe_id = 31000;
//!
//! let mut orch = Orchestrator::builder(cfg).build(Bench);
//! orch.run_command("endurance start").unwrap();
//! orch.tick();
//! assert_eq!(orch.current_mode(), Mode::Endurance);
//!
//! orch.stop_crafting();
//! assert_eq!(orch.current_mode(), Mode::None);
//! ```
mod clock;
mod commands;
mod config;
mod core;
mod error;
mod events;
mod host;
mod interrupt;
mod mode;
mod session;
mod subscribers;
mod tasks;

#[cfg(test)]
pub(crate) mod testing;

// ---- Public re-exports ----

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::Command;
pub use config::{
    Config, ConfigError, CraftingList, EnduranceConfig, ExecutorSettings, LegacyCraftingList,
    LegacyItemOption, ListItem, MacroEntry,
};
pub use core::{CONTROL, Orchestrator, OrchestratorBuilder, PRIMARY, Runtime, RuntimeConfig};
pub use error::{CommandError, HostError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use host::{CharacterStats, ConditionFlag, CraftObservation, Host, HostEvent, HostHandle};
pub use interrupt::{InterruptAction, InterruptController, InterruptPolicy, PendingResume};
pub use mode::{Mode, Transition, derive_mode};
pub use session::{
    CraftState, CraftingState, Editor, EnduranceState, ListsState, OpenWindow, OrchestratorState,
    PreCraftPhase, PreCrafting, UiState,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{
    Action, ActionFn, ActionRef, CraftRequest, Executor, ExecutorConfig, ExitPhase, Outcome, Step,
    Task, TaskContext, TaskQueue, TickReport,
};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
