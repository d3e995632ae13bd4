//! # Tasks, queues and executors.
//!
//! This module provides the task-related types:
//! - [`Step`] / [`Task`] - tagged unit of in-session work plus optional deadline
//! - [`Action`] / [`ActionFn`] / [`ActionRef`] - caller-supplied steps
//! - [`TaskQueue`] - FIFO of pending tasks
//! - [`Executor`] - drains one queue per tick under a time budget

mod action;
mod action_fn;
mod executor;
mod queue;
mod task;

pub use action::{Action, TaskContext};
pub use action_fn::{ActionFn, ActionRef};
pub use executor::{Executor, ExecutorConfig, TickReport};
pub use queue::TaskQueue;
pub use task::{CraftRequest, ExitPhase, Outcome, Step, Task};
