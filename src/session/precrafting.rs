//! Pre-craft setup: turns a craft request into queued steps and waits for the
//! synthesis to actually start.
//!
//! ```text
//! Idle ──request()──► Pending(req) ──crafting idle && primary empty──► Preparing{req, since}
//!                                      enqueue [Repair?] StartCraft        │
//!  ▲                                                                       │
//!  └───────── crafting left idle ─────────────────────────────────────────┤
//!  └───────── precraft_timeout elapsed (PrecraftAbandoned) ───────────────┘
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::events::{Bus, Event, EventKind};
use crate::host::Host;
use crate::tasks::{CraftRequest, Executor, Step};

use super::state::OrchestratorState;

/// Phase of the pre-craft setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreCraftPhase {
    #[default]
    Idle,
    /// A craft was requested and is waiting for the queue to be free.
    Pending(CraftRequest),
    /// Steps are queued; waiting for the synthesis to start.
    Preparing { req: CraftRequest, since: Instant },
}

/// PreCrafting subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreCrafting {
    pub phase: PreCraftPhase,
    /// Quantity of the craft started last; consumed when it completes.
    pub in_flight: Option<u32>,
}

impl PreCrafting {
    /// Whether a request is pending or being prepared.
    #[inline]
    pub fn is_busy(&self) -> bool {
        !matches!(self.phase, PreCraftPhase::Idle)
    }

    /// Requests a craft. Ignored while another one is in progress.
    pub fn request(&mut self, req: CraftRequest) -> bool {
        if self.is_busy() {
            return false;
        }
        self.phase = PreCraftPhase::Pending(req);
        true
    }

    /// Drops any request in progress.
    pub fn reset(&mut self) {
        self.phase = PreCraftPhase::Idle;
        self.in_flight = None;
    }
}

pub(crate) fn update(
    state: &mut OrchestratorState,
    host: &dyn Host,
    primary: &mut Executor,
    now: Instant,
    timeout: Duration,
    bus: &Bus,
) {
    match state.precrafting.phase {
        PreCraftPhase::Idle => {}
        PreCraftPhase::Pending(req) => {
            if state.stop_request || !state.crafting.is_idle() || !primary.queue().is_empty() {
                return;
            }
            if let Some(threshold) = req.repair_threshold {
                if host.needs_repair(threshold) {
                    primary.enqueue(Step::Repair);
                }
            }
            primary.enqueue(Step::StartCraft(req));
            state.precrafting.in_flight = Some(req.quantity);
            state.precrafting.phase = PreCraftPhase::Preparing { req, since: now };
            debug!(recipe = req.recipe, quantity = req.quantity, "craft queued");
        }
        PreCraftPhase::Preparing { req, since } => {
            if !state.crafting.is_idle() {
                state.precrafting.phase = PreCraftPhase::Idle;
            } else if now.saturating_duration_since(since) >= timeout {
                warn!(
                    recipe = req.recipe,
                    waited_ms = timeout.as_millis() as u64,
                    "requested craft never started"
                );
                bus.publish(
                    Event::new(EventKind::PrecraftAbandoned)
                        .with_task("start_craft")
                        .with_reason(format!("recipe {} did not start", req.recipe)),
                );
                state.precrafting.reset();
            }
        }
    }
}
