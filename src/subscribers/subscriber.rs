//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging custom event handlers
//! (overlays, IPC bridges, audit logs) into the runtime.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently of the frame loop)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as `EventKind::SubscriberPanicked`)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue; it never stalls a tick.
//! - Queue overflow drops the event **for this subscriber only** and publishes
//!   `EventKind::SubscriberOverflow`.
//! - Events are processed sequentially (FIFO) per subscriber.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use autocraft::{Event, EventKind, Mode, Subscribe};
//!
//! struct ModeBridge;
//!
//! #[async_trait]
//! impl Subscribe for ModeBridge {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ModeChanged && ev.mode == Some(Mode::Endurance) {
//!             // notify a third-party integration...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "mode-bridge" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs and overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1. Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
