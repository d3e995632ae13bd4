use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::{
    clock::{Clock, SystemClock},
    config::Config,
    events::Bus,
    host::Host,
};

use super::orchestrator::Orchestrator;

/// Builder for constructing an [`Orchestrator`].
pub struct OrchestratorBuilder {
    cfg: Config,
    config_path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    bus: Option<Bus>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            config_path: None,
            clock: Arc::new(SystemClock),
            bus: None,
        }
    }

    /// Remembers where the config lives so user commands can save it.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Replaces the time source (tests use [`ManualClock`](crate::ManualClock)).
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Publishes on an existing bus instead of a fresh one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the orchestrator around `host`.
    ///
    /// Legacy crafting lists in the config are migrated first; when a config
    /// path is known the migrated config is written back.
    pub fn build(mut self, host: impl Host + 'static) -> Orchestrator {
        let migrated = self.cfg.convert_crafting_lists();
        if migrated > 0 {
            if let Some(path) = self.config_path.as_deref() {
                if let Err(err) = self.cfg.save(path) {
                    warn!(label = err.as_label(), error = %err, "failed to save migrated config");
                }
            }
        }
        let bus = self.bus.unwrap_or_default();
        Orchestrator::from_parts(self.cfg, self.config_path, Box::new(host), self.clock, bus)
    }
}
