//! # Runtime: drives an [`Orchestrator`] from a tokio interval.
//!
//! For hosts without their own frame callback, [`Runtime`] ticks the
//! orchestrator at a fixed rate and fans bus events out to subscribers.
//!
//! ```text
//! Runtime::run(token):
//!   SubscriberSet::new(subscribers, bus)
//!   listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)     (fire-and-forget)
//!
//!   loop select! {
//!     token.cancelled()          ─► break
//!     OS signal (if enabled)     ─► ShutdownRequested ─► break
//!     interval.tick()            ─► orchestrator.tick()
//!   }
//!   RuntimeStopped ─► listener drains ─► SubscriberSet::shutdown()
//!   └─► Ok(orchestrator)   (handed back for inspection)
//! ```
//!
//! Host notifications reach the running orchestrator through the
//! [`HostHandle`](crate::HostHandle) taken before `run`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use autocraft::{Config, Orchestrator, Runtime, RuntimeConfig, Subscribe};
//! # use autocraft::{CharacterStats, CraftObservation, Host, HostError};
//! # struct MyHost;
//! # impl Host for MyHost {
//! #     fn is_logged_in(&self) -> bool { true }
//! #     fn character_stats(&self) -> CharacterStats { CharacterStats::default() }
//! #     fn observe_craft(&self) -> CraftObservation { CraftObservation::default() }
//! #     fn has_ingredients(&self, _: u32) -> bool { true }
//! #     fn needs_repair(&self, _: u8) -> bool { false }
//! #     fn begin_craft(&mut self, _: u32, _: u32, _: bool) -> Result<(), HostError> { Ok(()) }
//! #     fn repair(&mut self) -> Result<(), HostError> { Ok(()) }
//! #     fn close_quick_synth(&mut self) -> Result<(), HostError> { Ok(()) }
//! #     fn request_exit_craft(&mut self) -> Result<(), HostError> { Ok(()) }
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orch = Orchestrator::builder(Config::default()).build(MyHost);
//!     let handle = orch.handle();
//!
//!     let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     #[cfg(feature = "logging")]
//!     subs.push(Arc::new(autocraft::LogWriter::new()));
//!
//!     let rt = Runtime::new(orch, RuntimeConfig::default()).with_subscribers(subs);
//!     let orch = rt.run(CancellationToken::new()).await?;
//!     drop(handle);
//!     println!("ticks: {}", orch.ticks());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::orchestrator::Orchestrator;
use super::shutdown;

/// Frame driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Time between ticks.
    pub frame_interval: Duration,
    /// Stop on SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere).
    pub handle_signals: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            handle_signals: true,
        }
    }
}

/// Owns an orchestrator while it is driven.
pub struct Runtime {
    orchestrator: Orchestrator,
    cfg: RuntimeConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Runtime {
    pub fn new(orchestrator: Orchestrator, cfg: RuntimeConfig) -> Self {
        Self {
            orchestrator,
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Ticks until `token` is cancelled or a termination signal arrives.
    ///
    /// Returns the orchestrator so its final state can be inspected.
    pub async fn run(self, token: CancellationToken) -> Result<Orchestrator, RuntimeError> {
        if self.cfg.frame_interval.is_zero() {
            return Err(RuntimeError::ZeroFrameInterval);
        }
        let Runtime {
            mut orchestrator,
            cfg,
            subscribers,
        } = self;

        let bus = orchestrator.bus().clone();
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        let listener_stop = CancellationToken::new();
        let listener = subscriber_listener(&bus, Arc::clone(&subs), listener_stop.clone());

        let mut interval = tokio::time::interval(cfg.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let signal = wait_for_signal(cfg.handle_signals);
        tokio::pin!(signal);

        let result = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break Ok(()),
                res = &mut signal => {
                    if let Err(err) = res {
                        break Err(RuntimeError::Signal(err));
                    }
                    info!("termination signal received");
                    bus.publish(Event::new(EventKind::ShutdownRequested));
                    break Ok(());
                }
                _ = interval.tick() => orchestrator.tick(),
            }
        };

        info!(ticks = orchestrator.ticks(), "runtime stopped");
        bus.publish(
            Event::new(EventKind::RuntimeStopped)
                .with_count(orchestrator.ticks().min(usize::MAX as u64) as usize),
        );

        listener_stop.cancel();
        let _ = listener.await;
        if let Ok(set) = Arc::try_unwrap(subs) {
            set.shutdown().await;
        }
        result.map(|()| orchestrator)
    }
}

async fn wait_for_signal(enabled: bool) -> std::io::Result<()> {
    if enabled {
        shutdown::wait_for_shutdown_signal().await
    } else {
        std::future::pending().await
    }
}

/// Forwards bus events to the subscriber set until stopped, then drains what is left.
fn subscriber_listener(
    bus: &Bus,
    set: Arc<SubscriberSet>,
    stop: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
            }
        }
    })
}
