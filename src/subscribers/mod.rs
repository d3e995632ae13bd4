//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Orchestrator ── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet
//!                                                                     │
//!                                                     ┌───────────────┼──────────┐
//!                                                     ▼               ▼          ▼
//!                                                  LogWriter     IPC bridge    Custom
//! ```

mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
