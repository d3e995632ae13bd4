//! Runtime core: the tick driver and its async frame loop.
//!
//! The public API from this module is [`Orchestrator`] (built through
//! [`OrchestratorBuilder`]) and the optional [`Runtime`] that drives it.
//!
//! Internal modules:
//! - [`orchestrator`]: owns the state, runs one tick, exposes the automation operations;
//! - [`builder`]: wires config, host, clock and bus together;
//! - [`runtime`]: ticks an orchestrator from a tokio interval and feeds subscribers;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod orchestrator;
mod runtime;
mod shutdown;

pub use builder::OrchestratorBuilder;
pub use orchestrator::{CONTROL, Orchestrator, PRIMARY};
pub use runtime::{Runtime, RuntimeConfig};
