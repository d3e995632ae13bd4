//! # LogWriter: events rendered through `tracing`
//!
//! A subscriber that turns every [`Event`] into one structured `tracing` record.
//! Failures and rejected commands log at `warn`, interrupt and mode events at
//! `info`, executor carry-over at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO autocraft::log: mode changed mode=Endurance
//! INFO autocraft::log: duty queue popped, automation suspended
//! WARN autocraft::log: task failed executor="control" task="exit_craft" reason="..."
//! INFO autocraft::log: resume scheduled delay_ms=5000
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

const TARGET: &str = "autocraft::log";

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let executor = e.executor.as_deref().unwrap_or("-");
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TaskFailed => {
                warn!(target: TARGET, seq = e.seq, executor, task, reason, "task failed");
            }
            EventKind::QueueCleared => {
                info!(target: TARGET, seq = e.seq, executor, dropped = ?e.count, reason, "queue cleared");
            }
            EventKind::BudgetExhausted => {
                debug!(target: TARGET, seq = e.seq, executor, deferred = ?e.count, "tick budget exhausted");
            }
            EventKind::ModeChanged => {
                info!(target: TARGET, seq = e.seq, mode = ?e.mode, "mode changed");
            }
            EventKind::CommandRejected => {
                warn!(target: TARGET, seq = e.seq, label = task, reason, "command rejected");
            }
            EventKind::CraftingStopped => {
                info!(target: TARGET, seq = e.seq, suspended = ?e.mode, "crafting stopped");
            }
            EventKind::CraftingResumed => {
                info!(target: TARGET, seq = e.seq, mode = ?e.mode, "crafting resumed");
            }
            EventKind::InterruptRequested => {
                info!(target: TARGET, seq = e.seq, "duty queue popped, automation suspended");
            }
            EventKind::ResumeScheduled => {
                info!(target: TARGET, seq = e.seq, delay_ms = ?e.delay_ms, "resume scheduled");
            }
            EventKind::ResumeFired => {
                info!(target: TARGET, seq = e.seq, "stop request cleared");
            }
            EventKind::SessionReset => {
                info!(target: TARGET, seq = e.seq, reason, "session reset, automation forced off");
            }
            EventKind::CraftCompleted => {
                debug!(target: TARGET, seq = e.seq, quantity = ?e.count, "craft completed");
            }
            EventKind::EnduranceFinished => {
                info!(target: TARGET, seq = e.seq, crafted = ?e.count, reason, "endurance finished");
            }
            EventKind::ListFinished => {
                info!(target: TARGET, seq = e.seq, list = ?e.count, "crafting list finished");
            }
            EventKind::ListPaused => {
                warn!(target: TARGET, seq = e.seq, reason, "crafting list paused");
            }
            EventKind::PrecraftAbandoned => {
                warn!(target: TARGET, seq = e.seq, task, reason, "requested craft never started");
            }
            EventKind::ShutdownRequested => {
                info!(target: TARGET, seq = e.seq, "shutdown requested");
            }
            EventKind::RuntimeStopped => {
                info!(target: TARGET, seq = e.seq, ticks = ?e.count, "runtime stopped");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: TARGET, seq = e.seq, subscriber = task, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(target: TARGET, seq = e.seq, subscriber = task, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
