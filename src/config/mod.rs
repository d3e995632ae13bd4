//! # Persisted configuration.
//!
//! Provides [`Config`], read from TOML at startup and on demand. The core
//! never writes it back except on an explicit user command (`automode`).
//!
//! ## Sentinel values
//! - `executor.time_limit_ms = 0` → unlimited tick budget
//! - `executor.exit_craft_timeout_ms = 0` → forced exit has no deadline
//! - `endurance.craft_limit = 0` → endurance runs until stopped or out of ingredients
//!
//! ## Example
//! ```toml
//! auto_mode = false
//! estimated_craft_secs = 40
//!
//! [interrupt]
//! request_to_stop_duty = true
//! request_to_resume_duty = true
//! request_to_resume_delay = 5
//!
//! [[crafting_lists]]
//! id = 1
//! name = "weekly"
//! recipes = [{ id = 31000, quantity = 3 }]
//! ```

mod error;
mod lists;

pub use error::ConfigError;
pub use lists::{CraftingList, LegacyCraftingList, LegacyItemOption, ListItem, MacroEntry};

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::interrupt::InterruptPolicy;

/// Executor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Per-tick time budget of the primary executor (ms, `0` = unlimited).
    pub time_limit_ms: u64,
    /// Per-tick time budget of the control executor (ms, `0` = unlimited).
    pub control_time_limit_ms: u64,
    /// Trace every executed step at debug level.
    pub show_debug: bool,
    /// Deadline given to forced-exit tasks (ms, `0` = none).
    pub exit_craft_timeout_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            time_limit_ms: 1000,
            control_time_limit_ms: 1000,
            show_debug: false,
            exit_craft_timeout_ms: 10_000,
        }
    }
}

impl ExecutorSettings {
    /// Primary budget as an `Option` (`None` = unlimited).
    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        non_zero_ms(self.time_limit_ms)
    }

    /// Control budget as an `Option` (`None` = unlimited).
    #[inline]
    pub fn control_time_limit(&self) -> Option<Duration> {
        non_zero_ms(self.control_time_limit_ms)
    }

    /// Forced-exit deadline offset as an `Option`.
    #[inline]
    pub fn exit_craft_timeout(&self) -> Option<Duration> {
        non_zero_ms(self.exit_craft_timeout_ms)
    }
}

/// Endurance defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnduranceConfig {
    /// Recipe crafted by endurance (`0` = none selected).
    pub recipe_id: u32,
    /// Stop after this many crafts (`0` = no limit).
    pub craft_limit: u32,
}

impl EnduranceConfig {
    /// Craft limit as an `Option`.
    #[inline]
    pub fn limit(&self) -> Option<u32> {
        (self.craft_limit != 0).then_some(self.craft_limit)
    }
}

/// Global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Automatic action execution toggle (owned by the solver, only toggled here).
    pub auto_mode: bool,

    /// How long precrafting waits for a requested craft to start (ms).
    pub precraft_timeout_ms: u64,

    /// Estimated duration of one craft, used for the lists ETA.
    pub estimated_craft_secs: u64,

    /// Duty interrupt policy.
    pub interrupt: InterruptPolicy,

    /// Executor budgets and tracing.
    pub executor: ExecutorSettings,

    /// Endurance defaults.
    pub endurance: EnduranceConfig,

    pub crafting_lists: Vec<CraftingList>,

    /// Lists in the pre-migration format; emptied by [`Config::convert_crafting_lists`].
    pub legacy_crafting_lists: Vec<LegacyCraftingList>,

    pub macros: Vec<MacroEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_mode: false,
            precraft_timeout_ms: 10_000,
            estimated_craft_secs: 40,
            interrupt: InterruptPolicy::default(),
            executor: ExecutorSettings::default(),
            endurance: EnduranceConfig::default(),
            crafting_lists: Vec::new(),
            legacy_crafting_lists: Vec::new(),
            macros: Vec::new(),
        }
    }
}

impl Config {
    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let cfg = Self::from_toml_str(&text).map_err(|e| ConfigError::parse_toml(path, e))?;
        debug!(path = %path.display(), lists = cfg.crafting_lists.len(), "loaded config");
        Ok(cfg)
    }

    /// Loads a config file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Writes the config as TOML, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Looks up a crafting list by id.
    pub fn find_list(&self, id: u32) -> Option<&CraftingList> {
        self.crafting_lists.iter().find(|l| l.id == id)
    }

    /// Looks up a macro by id.
    pub fn find_macro(&self, id: u32) -> Option<&MacroEntry> {
        self.macros.iter().find(|m| m.id == id)
    }

    /// Precraft start timeout.
    #[inline]
    pub fn precraft_timeout(&self) -> Duration {
        Duration::from_millis(self.precraft_timeout_ms)
    }

    /// Estimated duration of a single craft.
    #[inline]
    pub fn estimated_craft(&self) -> Duration {
        Duration::from_secs(self.estimated_craft_secs)
    }

    /// Migrates legacy lists into `crafting_lists`.
    ///
    /// Lists whose id already exists in the new format are skipped. Legacy
    /// lists are cleared afterwards. Returns the number of migrated lists.
    pub fn convert_crafting_lists(&mut self) -> usize {
        let mut migrated = 0;
        for legacy in std::mem::take(&mut self.legacy_crafting_lists) {
            if self.find_list(legacy.id).is_some() {
                continue;
            }
            self.crafting_lists.push(legacy.convert());
            migrated += 1;
        }
        if migrated > 0 {
            info!(migrated, "converted legacy crafting lists");
        }
        migrated
    }
}

#[inline]
fn non_zero_ms(ms: u64) -> Option<Duration> {
    (ms != 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.executor.time_limit(), Some(Duration::from_millis(1000)));
        assert_eq!(cfg.endurance.limit(), None);
        assert!(!cfg.interrupt.request_to_stop_duty);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = Config::from_toml_str(
            r#"
            estimated_craft_secs = 30

            [interrupt]
            request_to_stop_duty = true
            request_to_resume_duty = true
            request_to_resume_delay = 5

            [executor]
            time_limit_ms = 0

            [[crafting_lists]]
            id = 7
            name = "weekly"
            recipes = [{ id = 100, quantity = 2 }, { id = 101, quantity = 1, quick_synth = true }]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.estimated_craft(), Duration::from_secs(30));
        assert_eq!(cfg.interrupt.resume_delay(), Duration::from_secs(5));
        assert_eq!(cfg.executor.time_limit(), None);
        assert_eq!(cfg.executor.control_time_limit_ms, 1000);
        let list = cfg.find_list(7).unwrap();
        assert_eq!(list.recipes.len(), 2);
        assert!(list.recipes[1].quick_synth);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("autocraft.toml");

        let mut cfg = Config::default();
        cfg.auto_mode = true;
        cfg.macros.push(MacroEntry {
            id: 3,
            name: "basic".into(),
        });
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());

        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.as_label(), "config_read_file");
    }

    #[test]
    fn conversion_skips_existing_ids_and_clears_legacy() {
        let mut cfg = Config::default();
        cfg.crafting_lists.push(CraftingList {
            id: 1,
            name: "kept".into(),
            ..CraftingList::default()
        });
        cfg.legacy_crafting_lists = vec![
            LegacyCraftingList {
                id: 1,
                name: "dup".into(),
                items: vec![5],
                ..LegacyCraftingList::default()
            },
            LegacyCraftingList {
                id: 2,
                name: "new".into(),
                items: vec![5, 5],
                ..LegacyCraftingList::default()
            },
        ];

        assert_eq!(cfg.convert_crafting_lists(), 1);
        assert!(cfg.legacy_crafting_lists.is_empty());
        assert_eq!(cfg.find_list(1).unwrap().name, "kept");
        assert_eq!(cfg.find_list(2).unwrap().recipes[0].quantity, 2);
        assert_eq!(cfg.convert_crafting_lists(), 0);
    }
}
