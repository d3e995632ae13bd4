//! # Example: duty_interrupt
//!
//! A duty queue popping in the middle of endurance crafting.
//!
//! Demonstrates how to:
//! - Configure an [`InterruptPolicy`] that suspends and later resumes automation.
//! - Feed host condition changes through a [`HostHandle`](autocraft::HostHandle) from another task.
//! - Observe the suspend/resume protocol on the event bus.
//!
//! ## Flow
//! ```text
//! t=0      endurance start
//! t=500ms  WaitingForDutyFinder=true ─► InterruptRequested
//!                                       stop_request, primary cleared, control=[ExitCraft]
//! t=800ms  BoundByDuty=true           (inside the duty, nothing happens)
//! t=1500ms BoundByDuty=false          ─► ResumeScheduled(1s)
//! t=2500ms tick at fire_at            ─► ResumeFired ─► endurance crafts again
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example duty_interrupt
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use autocraft::{
    CharacterStats, ConditionFlag, Config, CraftObservation, EnduranceConfig, EventKind, Host,
    HostError, InterruptPolicy, Orchestrator, Runtime, RuntimeConfig,
};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const RECIPE: u32 = 4242;

#[derive(Debug, Default)]
struct BenchState {
    busy_until: Option<Instant>,
    in_menu: bool,
    crafted: u32,
}

/// Bench with unlimited ingredients whose crafting menu can be left on request.
#[derive(Debug, Clone, Default)]
struct Bench {
    state: Arc<Mutex<BenchState>>,
}

impl Bench {
    fn lock(&self) -> MutexGuard<'_, BenchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Host for Bench {
    fn is_logged_in(&self) -> bool {
        true
    }

    fn character_stats(&self) -> CharacterStats {
        CharacterStats::default()
    }

    fn observe_craft(&self) -> CraftObservation {
        let mut s = self.lock();
        let synthesizing = match s.busy_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                s.busy_until = None;
                s.crafted += 1;
                false
            }
            None => false,
        };
        CraftObservation {
            log_open: s.in_menu,
            synthesizing,
            ..CraftObservation::default()
        }
    }

    fn has_ingredients(&self, _recipe: u32) -> bool {
        true
    }

    fn needs_repair(&self, _threshold_percent: u8) -> bool {
        false
    }

    fn begin_craft(&mut self, recipe: u32, _quantity: u32, _quick: bool) -> Result<(), HostError> {
        let mut s = self.lock();
        s.in_menu = true;
        s.busy_until = Some(Instant::now() + Duration::from_millis(200));
        println!("[bench] crafting {recipe}");
        Ok(())
    }

    fn repair(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn close_quick_synth(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn request_exit_craft(&mut self) -> Result<(), HostError> {
        println!("[bench] leaving the crafting menu");
        self.lock().in_menu = false;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autocraft=info")),
        )
        .init();

    let cfg = Config {
        interrupt: InterruptPolicy {
            request_to_stop_duty: true,
            request_to_resume_duty: true,
            request_to_resume_delay: 1,
        },
        endurance: EnduranceConfig {
            recipe_id: RECIPE,
            craft_limit: 0,
        },
        ..Config::default()
    };

    let bench = Bench::default();
    let mut orch = Orchestrator::builder(cfg).build(bench.clone());
    orch.start_endurance()?;

    let handle = orch.handle();
    let token = CancellationToken::new();

    // Host side: duty finder pops, the duty runs, the duty ends.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.condition_changed(ConditionFlag::WaitingForDutyFinder, true);
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.condition_changed(ConditionFlag::WaitingForDutyFinder, false);
        handle.condition_changed(ConditionFlag::BoundByDuty, true);
        tokio::time::sleep(Duration::from_millis(700)).await;
        handle.condition_changed(ConditionFlag::BoundByDuty, false);
    });

    // Watcher: print the protocol, stop shortly after the resume fired.
    let mut rx = orch.bus().subscribe();
    let stopper = token.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => match ev.kind {
                    EventKind::InterruptRequested => println!("[watcher] suspended"),
                    EventKind::ResumeScheduled => {
                        println!("[watcher] resume in {:?}ms", ev.delay_ms);
                    }
                    EventKind::ResumeFired => {
                        println!("[watcher] resumed");
                        tokio::time::sleep(Duration::from_millis(600)).await;
                        stopper.cancel();
                        break;
                    }
                    _ => {}
                },
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut orch = Runtime::new(orch, RuntimeConfig::default())
        .run(token)
        .await?;

    println!(
        "mode={} stop_request={} crafted={}",
        orch.current_mode(),
        orch.state().stop_request,
        bench.lock().crafted,
    );
    orch.stop_crafting();
    Ok(())
}
