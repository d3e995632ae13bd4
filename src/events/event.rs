//! # Runtime events emitted by the orchestrator and its executors.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Executor events**: step failures, queue clears, budget carry-over
//! - **Mode events**: mode ownership changes and rejected commands
//! - **Interrupt events**: duty suspension, resume scheduling and firing
//! - **Session events**: crafts completed, modes finishing naturally, session resets
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! executor and step names, reasons and counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use autocraft::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_executor("primary")
//!     .with_task("start_craft")
//!     .with_reason("addon not ready");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("start_craft"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::mode::Mode;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Runtime events ===
    /// Shutdown requested (OS signal or cancellation).
    ShutdownRequested,

    /// Frame loop exited.
    ///
    /// Sets:
    /// - `count`: number of ticks driven
    RuntimeStopped,

    // === Executor events ===
    /// A step failed, expired or panicked.
    ///
    /// Sets:
    /// - `executor`: executor name
    /// - `task`: step label
    /// - `reason`: error message
    TaskFailed,

    /// An executor queue was cleared.
    ///
    /// Sets:
    /// - `executor`: executor name
    /// - `count`: number of dropped tasks
    /// - `reason`: why (forced exit, stop, failed forced exit)
    QueueCleared,

    /// The tick budget ran out; remaining tasks carry over.
    ///
    /// Sets:
    /// - `executor`: executor name
    /// - `count`: tasks deferred to the next tick
    BudgetExhausted,

    // === Mode events ===
    /// The owning mode changed.
    ///
    /// Sets:
    /// - `mode`: new mode
    ModeChanged,

    /// A user operation was rejected.
    ///
    /// Sets:
    /// - `task`: error label
    /// - `reason`: user-visible message
    CommandRejected,

    /// `stop_crafting` ran.
    ///
    /// Sets:
    /// - `mode`: suspended mode, if any
    CraftingStopped,

    /// `resume_crafting` restored a mode.
    ///
    /// Sets:
    /// - `mode`: restored mode
    CraftingResumed,

    // === Interrupt events ===
    /// Duty queue popped; automation suspended.
    InterruptRequested,

    /// Resume scheduled after the duty ended.
    ///
    /// Sets:
    /// - `delay_ms`: settling delay
    ResumeScheduled,

    /// Deferred resume fired; stop request cleared.
    ResumeFired,

    // === Session events ===
    /// Tick ran while logged out, or a logout was reported; automation forced off.
    SessionReset,

    /// A craft finished.
    ///
    /// Sets:
    /// - `count`: crafted quantity
    CraftCompleted,

    /// Endurance finished on its own.
    ///
    /// Sets:
    /// - `reason`: "craft limit reached" or "out of ingredients"
    /// - `count`: crafts done
    EnduranceFinished,

    /// Lists processing exhausted its list.
    ///
    /// Sets:
    /// - `count`: list id
    ListFinished,

    /// Lists processing paused itself.
    ///
    /// Sets:
    /// - `reason`: why
    ListPaused,

    /// A requested craft never started.
    PrecraftAbandoned,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Executor name, if applicable.
    pub executor: Option<Arc<str>>,
    /// Step label or subject name, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, user messages, etc.).
    pub reason: Option<Arc<str>>,
    /// Mode involved, if applicable.
    pub mode: Option<Mode>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Generic counter (dropped tasks, crafted quantity, list id).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            executor: None,
            task: None,
            reason: None,
            mode: None,
            delay_ms: None,
            count: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a step label or subject name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an executor name.
    #[inline]
    pub fn with_executor(mut self, executor: impl Into<Arc<str>>) -> Self {
        self.executor = Some(executor.into());
        self
    }

    /// Attaches a mode.
    #[inline]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a counter.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
