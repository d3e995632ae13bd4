//! # Example: endurance_loop
//!
//! Endurance mode against a simulated crafting bench, driven by [`Runtime`].
//!
//! Demonstrates how to:
//! - Implement [`Host`] for a fake session.
//! - Start endurance through the `/artisan` command surface.
//! - Drive ticks with [`Runtime`] and watch the [`Bus`](autocraft::Bus) for completion.
//!
//! ## Flow
//! ```text
//! run_command("endurance start")
//!     └─► Runtime::run()  (16ms frames)
//!           ├─► endurance poller ─► precrafting ─► primary [StartCraft]
//!           ├─► bench "crafts" for 120ms ─► CraftCompleted
//!           ├─► ... repeat until craft_limit
//!           └─► EnduranceFinished ─► watcher cancels token ─► RuntimeStopped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=autocraft=debug cargo run --example endurance_loop
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use autocraft::{
    CharacterStats, Config, CraftObservation, EnduranceConfig, EventKind, Host, HostError,
    Orchestrator, Runtime, RuntimeConfig, Subscribe,
};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const RECIPE: u32 = 31000;

#[derive(Debug)]
struct BenchState {
    stock: u32,
    crafted: u32,
    busy_until: Option<Instant>,
}

/// Simulated bench: every craft consumes one set of ingredients and takes `craft_time`.
#[derive(Debug, Clone)]
struct Bench {
    state: Arc<Mutex<BenchState>>,
    craft_time: Duration,
}

impl Bench {
    fn new(stock: u32, craft_time: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BenchState {
                stock,
                crafted: 0,
                busy_until: None,
            })),
            craft_time,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BenchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Host for Bench {
    fn is_logged_in(&self) -> bool {
        true
    }

    fn character_stats(&self) -> CharacterStats {
        CharacterStats {
            level: 90,
            craftsmanship: 3500,
            control: 3300,
            cp: 600,
        }
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
            log_open: true,
            synthesizing,
            ..CraftObservation::default()
        }
    }

    fn has_ingredients(&self, recipe: u32) -> bool {
        recipe == RECIPE && self.lock().stock > 0
    }

    fn needs_repair(&self, _threshold_percent: u8) -> bool {
        false
    }

    fn begin_craft(&mut self, recipe: u32, _quantity: u32, _quick: bool) -> Result<(), HostError> {
        let mut s = self.lock();
        if s.stock == 0 {
            return Err(HostError::Rejected {
                reason: format!("no ingredients for {recipe}"),
            });
        }
        s.stock -= 1;
        s.busy_until = Some(Instant::now() + self.craft_time);
        println!("[bench] crafting {recipe} ({} sets left)", s.stock);
        Ok(())
    }

    fn repair(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn close_quick_synth(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn request_exit_craft(&mut self) -> Result<(), HostError> {
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Config: endurance on one recipe, stop after three crafts.
    let cfg = Config {
        endurance: EnduranceConfig {
            recipe_id: RECIPE,
            craft_limit: 3,
        },
        ..Config::default()
    };

    // 2. Orchestrator around the simulated bench.
    let bench = Bench::new(5, Duration::from_millis(120));
    let mut orch = Orchestrator::builder(cfg).build(bench.clone());
    orch.run_command("endurance start")?;

    // 3. Stop the runtime once endurance finishes by itself.
    let token = CancellationToken::new();
    let mut rx = orch.bus().subscribe();
    let stopper = token.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == EventKind::EnduranceFinished => {
                    println!("[watcher] endurance finished: {:?}", ev.reason);
                    stopper.cancel();
                    break;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    #[allow(unused_mut)]
    let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
    #[cfg(feature = "logging")]
    subs.push(Arc::new(autocraft::LogWriter::new()));

    let rt = RuntimeConfig {
        handle_signals: true,
        ..RuntimeConfig::default()
    };
    let orch = Runtime::new(orch, rt).with_subscribers(subs).run(token).await?;

    let s = bench.lock();
    println!(
        "done after {} ticks: mode={}, crafted={}, stock left={}",
        orch.ticks(),
        orch.current_mode(),
        s.crafted,
        s.stock,
    );
    Ok(())
}
