//! # Function-backed action (`ActionFn`)
//!
//! [`ActionFn`] wraps a closure `F: Fn(&mut TaskContext) -> Result<Outcome, TaskError>`.
//! The closure is `Fn`, not `FnMut`: a step may be cloned into a continuation,
//! so shared state belongs in an explicit `Arc<...>` inside the closure.
//!
//! ## Example
//! ```rust
//! use autocraft::{Action, ActionFn, ActionRef, Outcome, TaskContext, TaskError};
//!
//! let a: ActionRef = ActionFn::arc("noop", |_ctx: &mut TaskContext<'_>| {
//!     Ok::<_, TaskError>(Outcome::Done)
//! });
//!
//! assert_eq!(a.name(), "noop");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::TaskError;

use super::action::{Action, TaskContext};
use super::task::Outcome;

/// Shared handle to an action.
pub type ActionRef = Arc<dyn Action>;

/// Function-backed action implementation.
#[derive(Debug)]
pub struct ActionFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ActionFn<F>
where
    F: Fn(&mut TaskContext<'_>) -> Result<Outcome, TaskError> + Send + Sync + 'static,
{
    /// Creates a new function-backed action.
    ///
    /// Prefer [`ActionFn::arc`] when you immediately need an [`ActionRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Action for ActionFn<F>
where
    F: Fn(&mut TaskContext<'_>) -> Result<Outcome, TaskError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<Outcome, TaskError> {
        (self.f)(ctx)
    }
}
