//! # Budgeted single-owner executor.
//!
//! An [`Executor`] owns one [`TaskQueue`] and drains it once per tick.
//!
//! ```text
//! run_tick():
//!   snapshot len ──► loop ─► budget left? ─no─► stop (BudgetExhausted, rest carries over)
//!                     │        │yes
//!                     │        ▼
//!                     │   pop head ─► deadline passed? ─yes─► TaskFailed(Expired)
//!                     │        │no
//!                     │        ▼
//!                     │   run step (panic isolated)
//!                     │        ├─ Done
//!                     │        ├─ Continue(next) ─► push_back(next, same deadline)
//!                     │        └─ Err/panic ─► TaskFailed, queue kept
//!                     │                         (forced exit: queue cleared)
//!                     └──── at most `len` pops, so continuations wait for the next tick
//! ```
//!
//! ## Budget rule
//! The first task of a tick always runs. A later task starts only when
//! `elapsed + slowest_so_far <= budget`, so for a uniform task time `T <= B`
//! exactly `floor(B / T)` tasks run per tick.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{TaskError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::host::Host;

use super::action::TaskContext;
use super::queue::TaskQueue;
use super::task::{Outcome, Task};

/// Per-executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Per-tick time budget (`None` = unlimited).
    pub time_limit: Option<Duration>,
    /// Trace every executed step at debug level.
    pub show_debug: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_millis(1000)),
            show_debug: false,
        }
    }
}

/// What one [`Executor::run_tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Steps that ran to `Done` or `Continue`.
    pub executed: usize,
    /// Steps that failed, expired or panicked.
    pub failed: usize,
    /// Tasks left over because the budget ran out.
    pub deferred: usize,
}

/// Drains one task queue under a time budget.
#[derive(Debug)]
pub struct Executor {
    name: &'static str,
    cfg: ExecutorConfig,
    queue: TaskQueue,
}

impl Executor {
    pub fn new(name: &'static str, cfg: ExecutorConfig) -> Self {
        Self {
            name,
            cfg,
            queue: TaskQueue::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn config(&self) -> ExecutorConfig {
        self.cfg
    }

    #[inline]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Appends a task at the tail.
    pub fn enqueue(&mut self, task: impl Into<Task>) {
        self.queue.push_back(task);
    }

    /// Drops all pending tasks, publishing `QueueCleared` when anything was dropped.
    pub fn clear(&mut self, bus: &Bus, reason: &str) -> usize {
        let dropped = self.queue.clear();
        if dropped > 0 {
            self.publish_cleared(bus, dropped, reason);
        }
        dropped
    }

    /// Clears the queue and seeds it with one forced exit.
    pub fn force_exit(&mut self, deadline: Option<Instant>, bus: &Bus, reason: &str) {
        let dropped = self.queue.force_exit(deadline);
        if dropped > 0 {
            self.publish_cleared(bus, dropped, reason);
        }
        debug!(executor = self.name, dropped, reason, "forced exit queued");
    }

    /// Runs queued tasks until the queue is drained or the budget is spent.
    pub fn run_tick(&mut self, host: &mut dyn Host, clock: &dyn Clock, bus: &Bus) -> TickReport {
        let start = clock.now();
        let snapshot = self.queue.len();
        let mut report = TickReport::default();
        let mut popped = 0usize;
        let mut slowest = Duration::ZERO;
        let mut out_of_budget = false;

        while popped < snapshot {
            if popped > 0 {
                if let Some(limit) = self.cfg.time_limit {
                    let elapsed = clock.now().saturating_duration_since(start);
                    if elapsed + slowest > limit {
                        out_of_budget = true;
                        break;
                    }
                }
            }
            let Some(task) = self.queue.pop_front() else {
                break;
            };
            popped += 1;

            let began = clock.now();
            let result = self.run_one(&task, host, began);
            let took = clock.now().saturating_duration_since(began);
            slowest = slowest.max(took);

            match result {
                Ok(Outcome::Done) => report.executed += 1,
                Ok(Outcome::Continue(next)) => {
                    report.executed += 1;
                    self.queue.push_back(task.continue_with(next));
                }
                Err(err) => {
                    report.failed += 1;
                    self.on_failure(&task, &err, bus);
                }
            }
            if self.cfg.show_debug {
                debug!(
                    executor = self.name,
                    task = task.label(),
                    took_ms = took.as_millis() as u64,
                    "step executed"
                );
            }
        }

        if out_of_budget {
            report.deferred = snapshot.saturating_sub(popped).min(self.queue.len());
            bus.publish(
                Event::new(EventKind::BudgetExhausted)
                    .with_executor(self.name)
                    .with_count(report.deferred),
            );
        }
        report
    }

    fn run_one(
        &self,
        task: &Task,
        host: &mut dyn Host,
        now: Instant,
    ) -> Result<Outcome, TaskError> {
        if let Some(deadline) = task.deadline() {
            if now > deadline {
                return Err(TaskError::Expired {
                    overdue: now.duration_since(deadline),
                });
            }
        }
        let mut ctx = TaskContext { host, now };
        catch_unwind(AssertUnwindSafe(|| task.step().run(&mut ctx))).unwrap_or_else(|payload| {
            Err(TaskError::Panicked {
                info: panic_message(payload.as_ref()),
            })
        })
    }

    fn on_failure(&mut self, task: &Task, err: &TaskError, bus: &Bus) {
        warn!(
            executor = self.name,
            task = task.label(),
            label = err.as_label(),
            error = %err,
            "task failed"
        );
        bus.publish(
            Event::new(EventKind::TaskFailed)
                .with_executor(self.name)
                .with_task(task.label())
                .with_reason(err.to_string()),
        );
        if task.is_forced_exit() {
            let dropped = self.queue.clear();
            if dropped > 0 {
                self.publish_cleared(bus, dropped, "forced exit failed");
            }
        }
    }

    fn publish_cleared(&self, bus: &Bus, dropped: usize, reason: &str) {
        bus.publish(
            Event::new(EventKind::QueueCleared)
                .with_executor(self.name)
                .with_count(dropped)
                .with_reason(reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::tasks::{ActionFn, Step};
    use crate::testing::FakeHost;
    use std::sync::{Arc, Mutex};

    fn unlimited() -> ExecutorConfig {
        ExecutorConfig {
            time_limit: None,
            show_debug: true,
        }
    }

    fn timed(clock: &ManualClock, took: Duration, log: &Arc<Mutex<Vec<usize>>>, i: usize) -> Step {
        let clock = clock.clone();
        let log = Arc::clone(log);
        Step::Custom(ActionFn::arc(format!("t{i}"), move |_ctx: &mut TaskContext<'_>| {
            clock.advance(took);
            log.lock().unwrap().push(i);
            Ok(Outcome::Done)
        }))
    }

    #[test]
    fn unlimited_budget_runs_everything_in_fifo_order() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut host = FakeHost::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ex = Executor::new("primary", unlimited());
        for i in 0..5 {
            ex.enqueue(timed(&clock, Duration::from_millis(400), &log, i));
        }

        assert_eq!(ex.name(), "primary");
        assert_eq!(ex.config(), unlimited());

        let report = ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(report.executed, 5);
        assert_eq!(report.deferred, 0);
        assert!(ex.queue().is_empty());
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn budget_runs_floor_of_budget_over_task_time() {
        for (budget_ms, task_ms, expected) in [(1000, 300, 3), (1000, 250, 4), (1000, 1000, 1)] {
            let clock = ManualClock::new();
            let bus = Bus::new(16);
            let mut host = FakeHost::new();
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut ex = Executor::new(
                "primary",
                ExecutorConfig {
                    time_limit: Some(Duration::from_millis(budget_ms)),
                    show_debug: false,
                },
            );
            for i in 0..10 {
                ex.enqueue(timed(&clock, Duration::from_millis(task_ms), &log, i));
            }

            let report = ex.run_tick(&mut host, &clock, &bus);
            assert_eq!(report.executed, expected, "B={budget_ms} T={task_ms}");
            assert_eq!(report.deferred, 10 - expected);
            assert_eq!(ex.queue().len(), 10 - expected);
        }
    }

    #[test]
    fn leftovers_carry_over_to_the_next_tick() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut host = FakeHost::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ex = Executor::new("primary", ExecutorConfig::default());
        for i in 0..3 {
            ex.enqueue(timed(&clock, Duration::from_millis(600), &log, i));
        }

        ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(*log.lock().unwrap(), vec![0]);
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::BudgetExhausted);
        assert_eq!(ev.count, Some(2));

        ex.run_tick(&mut host, &clock, &bus);
        ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn continuation_goes_to_the_tail_and_waits_a_tick() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut host = FakeHost::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ex = Executor::new("primary", unlimited());

        let second = timed(&clock, Duration::ZERO, &log, 99);
        ex.enqueue(Step::Custom(ActionFn::arc(
            "first",
            move |_ctx: &mut TaskContext<'_>| Ok(Outcome::Continue(second.clone())),
        )));
        ex.enqueue(timed(&clock, Duration::ZERO, &log, 1));

        ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(*log.lock().unwrap(), vec![1]);
        assert_eq!(ex.queue().labels(), vec!["t99"]);

        ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(*log.lock().unwrap(), vec![1, 99]);
        assert!(ex.queue().is_empty());
    }

    #[test]
    fn failures_keep_the_rest_of_the_queue() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let mut host = FakeHost::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ex = Executor::new("primary", unlimited());

        ex.enqueue(Step::Custom(ActionFn::arc(
            "broken",
            |_ctx: &mut TaskContext<'_>| Err(TaskError::fail("boom")),
        )));
        ex.enqueue(Step::Custom(ActionFn::arc(
            "panicky",
            |_ctx: &mut TaskContext<'_>| -> Result<Outcome, TaskError> { panic!("kaboom") },
        )));
        ex.enqueue(timed(&clock, Duration::ZERO, &log, 7));

        let report = ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(report.failed, 2);
        assert_eq!(report.executed, 1);
        assert_eq!(*log.lock().unwrap(), vec![7]);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::TaskFailed);
        assert_eq!(first.task.as_deref(), Some("broken"));
        let second = rx.try_recv().unwrap();
        assert_eq!(second.task.as_deref(), Some("panicky"));
        assert!(second.reason.as_deref().unwrap().contains("kaboom"));
    }

    #[test]
    fn expired_forced_exit_clears_the_queue() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut host = FakeHost::new();
        let mut ex = Executor::new("control", unlimited());

        ex.force_exit(Some(clock.now() + Duration::from_secs(1)), &bus, "test");
        ex.enqueue(Step::Repair);
        clock.advance(Duration::from_secs(2));

        let report = ex.run_tick(&mut host, &clock, &bus);
        assert_eq!(report.failed, 1);
        assert!(ex.queue().is_empty());
        assert_eq!(host.count_calls("repair"), 0);
    }

    #[test]
    fn failed_forced_exit_clears_the_queue() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut host = FakeHost::new();
        host.state().fail_exit = true;
        host.state().craft.log_open = true;
        let mut ex = Executor::new("control", unlimited());

        ex.force_exit(None, &bus, "test");
        ex.enqueue(Step::Repair);

        ex.run_tick(&mut host, &clock, &bus);
        assert!(ex.queue().is_empty());
        assert_eq!(host.count_calls("exit_craft"), 1);
        assert_eq!(host.count_calls("repair"), 0);
    }

    #[test]
    fn failed_lone_forced_exit_reports_no_cleared_queue() {
        let clock = ManualClock::new();
        let bus = Bus::new(16);
        let mut host = FakeHost::new();
        host.state().fail_exit = true;
        host.state().craft.log_open = true;
        let mut ex = Executor::new("control", unlimited());
        ex.force_exit(None, &bus, "test");
        let mut rx = bus.subscribe();

        ex.run_tick(&mut host, &clock, &bus);
        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::TaskFailed]);
    }
}
