//! # FIFO task queue.
//!
//! Insertion order is execution order. Only the owning executor pops; the
//! orchestrator clears and re-seeds it on stop and interrupt, always from the
//! frame thread.

use std::collections::VecDeque;
use std::time::Instant;

use super::task::Task;

/// Ordered sequence of pending tasks.
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task at the tail.
    pub fn push_back(&mut self, task: impl Into<Task>) {
        self.tasks.push_back(task.into());
    }

    /// Removes the head.
    pub fn pop_front(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Drops every pending task and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        dropped
    }

    /// Clears the queue and seeds it with a single forced exit.
    ///
    /// Afterwards the queue holds exactly one task and it is a forced exit.
    /// Returns how many tasks were dropped.
    pub fn force_exit(&mut self, deadline: Option<Instant>) -> usize {
        let dropped = self.clear();
        self.tasks.push_back(Task::forced_exit(deadline));
        dropped
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The task that runs next.
    pub fn head(&self) -> Option<&Task> {
        self.tasks.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Labels of all pending tasks, head first.
    pub fn labels(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.label().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{CraftRequest, Step};

    #[test]
    fn fifo_order() {
        let mut q = TaskQueue::new();
        q.push_back(Step::Repair);
        q.push_back(Step::StartCraft(CraftRequest::single(1)));
        assert_eq!(q.labels(), vec!["repair", "start_craft"]);
        assert_eq!(q.pop_front().map(|t| t.label().to_string()).as_deref(), Some("repair"));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn force_exit_leaves_a_single_exit_task() {
        let mut q = TaskQueue::new();
        q.push_back(Step::Repair);
        q.push_back(Step::CloseQuickSynth);

        assert_eq!(q.force_exit(None), 2);
        assert_eq!(q.force_exit(None), 1);
        assert_eq!(q.len(), 1);
        assert!(q.head().is_some_and(Task::is_forced_exit));
    }
}
