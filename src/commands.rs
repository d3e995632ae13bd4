//! # `/artisan` command surface.
//!
//! [`Command::parse`] turns the argument text into a [`Command`];
//! [`Orchestrator::execute`] applies it. Commands only trigger orchestrator
//! operations or record a window request in [`UiState`](crate::UiState).
//!
//! ```text
//! ""                       → toggle main window
//! automode                 → flip config.auto_mode (saved when a path is known)
//! lists <id>               → list editor        (refused while a list is processing)
//! lists <id> start         → start_list(id)     (opens the lists window while endurance runs)
//! macros <id>              → macro editor       (refused while crafting)
//! endurance start|stop     → start/stop endurance
//! lists|endurance|settings|macros|builder|workshop(s)|sim|<other>
//!                          → open that window (Overview for anything unknown)
//! ```

use tracing::{info, warn};

use crate::core::Orchestrator;
use crate::error::CommandError;
use crate::session::{Editor, OpenWindow};

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// No arguments: show or hide the main window.
    ToggleWindow,
    /// Flip automatic action execution.
    AutoMode,
    /// `lists <id> [start]`; the id is validated on execution.
    List { id: String, start: bool },
    /// `macros <id>`; the id is validated on execution.
    Macro { id: String },
    EnduranceStart,
    EnduranceStop,
    /// Open a window.
    Open(OpenWindow),
}

impl Command {
    /// Parses the text after the command name.
    pub fn parse(args: &str) -> Command {
        let parts: Vec<&str> = args.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Command::ToggleWindow;
        };
        let first = first.to_ascii_lowercase();
        if first == "automode" {
            return Command::AutoMode;
        }

        if let Some(second) = parts.get(1) {
            match first.as_str() {
                "lists" => {
                    return Command::List {
                        id: (*second).to_string(),
                        start: parts
                            .get(2)
                            .is_some_and(|s| s.eq_ignore_ascii_case("start")),
                    };
                }
                "macros" => {
                    return Command::Macro {
                        id: (*second).to_string(),
                    };
                }
                "endurance" if second.eq_ignore_ascii_case("start") => {
                    return Command::EnduranceStart;
                }
                "endurance" if second.eq_ignore_ascii_case("stop") => {
                    return Command::EnduranceStop;
                }
                _ => {}
            }
        }
        Command::Open(window_for(&first))
    }
}

fn window_for(name: &str) -> OpenWindow {
    match name {
        "lists" => OpenWindow::Lists,
        "endurance" => OpenWindow::Endurance,
        "settings" => OpenWindow::Main,
        "macros" => OpenWindow::Macro,
        "builder" => OpenWindow::SpecialList,
        "workshop" | "workshops" => OpenWindow::FcWorkshop,
        "sim" => OpenWindow::Simulator,
        _ => OpenWindow::Overview,
    }
}

fn parse_id(raw: &str) -> Result<u32, CommandError> {
    raw.parse().map_err(|_| CommandError::InvalidId {
        raw: raw.to_string(),
    })
}

impl Orchestrator {
    /// Parses and executes `/artisan` arguments.
    pub fn run_command(&mut self, args: &str) -> Result<(), CommandError> {
        self.execute(Command::parse(args))
    }

    /// Executes a parsed command.
    ///
    /// Rejections are logged and published as `CommandRejected`; state is untouched.
    pub fn execute(&mut self, cmd: Command) -> Result<(), CommandError> {
        match cmd {
            Command::ToggleWindow => {
                self.state.ui.is_open = !self.state.ui.is_open;
                Ok(())
            }
            Command::AutoMode => {
                self.toggle_auto_mode();
                Ok(())
            }
            Command::List { id, start } => {
                if self.state.lists.processing {
                    return Err(self.reject(CommandError::ListBusy));
                }
                let id = parse_id(&id).map_err(|e| self.reject(e))?;
                if self.cfg.find_list(id).is_none() {
                    return Err(self.reject(CommandError::ListNotFound { id }));
                }
                if !start {
                    self.state.ui.editor = Some(Editor::List(id));
                    return Ok(());
                }
                if self.state.endurance.enabled {
                    self.open(OpenWindow::Lists);
                    return Ok(());
                }
                self.start_list(id).map(|_| ())
            }
            Command::Macro { id } => {
                if !self.state.crafting.is_idle() {
                    return Err(self.reject(CommandError::CraftingBusy));
                }
                let id = parse_id(&id).map_err(|e| self.reject(e))?;
                if self.cfg.find_macro(id).is_none() {
                    return Err(self.reject(CommandError::MacroNotFound { id }));
                }
                self.state.ui.editor = Some(Editor::Macro(id));
                Ok(())
            }
            Command::EnduranceStart => self.start_endurance().map(|_| ()),
            Command::EnduranceStop => self.stop_endurance().map(|_| ()),
            Command::Open(window) => {
                self.open(window);
                Ok(())
            }
        }
    }

    fn open(&mut self, window: OpenWindow) {
        self.state.ui.is_open = true;
        self.state.ui.window = window;
    }

    fn toggle_auto_mode(&mut self) {
        self.cfg.auto_mode = !self.cfg.auto_mode;
        info!(auto_mode = self.cfg.auto_mode, "auto mode toggled");
        let Some(path) = self.config_path.as_deref() else {
            return;
        };
        if let Err(err) = self.cfg.save(path) {
            warn!(label = err.as_label(), error = %err, "failed to save config");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, CraftingList, ListItem, MacroEntry};
    use crate::events::EventKind;
    use crate::host::CraftObservation;
    use crate::mode::Mode;
    use crate::testing::FakeHost;

    fn orchestrator() -> (Orchestrator, FakeHost) {
        let cfg = Config {
            crafting_lists: vec![CraftingList {
                id: 3,
                name: "gear".into(),
                recipes: vec![ListItem {
                    id: 70,
                    quantity: 2,
                    quick_synth: false,
                }],
                ..CraftingList::default()
            }],
            macros: vec![MacroEntry {
                id: 8,
                name: "opener".into(),
            }],
            ..Config::default()
        };
        let host = FakeHost::new();
        (Orchestrator::builder(cfg).build(host.clone()), host)
    }

    #[test]
    fn parses_subcommands() {
        assert_eq!(Command::parse(""), Command::ToggleWindow);
        assert_eq!(Command::parse("AutoMode"), Command::AutoMode);
        assert_eq!(
            Command::parse("lists 3 START"),
            Command::List {
                id: "3".into(),
                start: true
            }
        );
        assert_eq!(
            Command::parse("macros x"),
            Command::Macro { id: "x".into() }
        );
        assert_eq!(Command::parse("endurance stop"), Command::EnduranceStop);
        assert_eq!(
            Command::parse("endurance"),
            Command::Open(OpenWindow::Endurance)
        );
        assert_eq!(
            Command::parse("endurance pause"),
            Command::Open(OpenWindow::Endurance)
        );
        assert_eq!(
            Command::parse("workshops"),
            Command::Open(OpenWindow::FcWorkshop)
        );
        assert_eq!(Command::parse("what"), Command::Open(OpenWindow::Overview));
    }

    #[test]
    fn list_errors_follow_check_order() {
        let (mut orch, _host) = orchestrator();
        assert_eq!(
            orch.run_command("lists abc"),
            Err(CommandError::InvalidId { raw: "abc".into() })
        );
        assert_eq!(
            orch.run_command("lists 9 start"),
            Err(CommandError::ListNotFound { id: 9 })
        );

        orch.run_command("lists 3 start").unwrap();
        assert_eq!(orch.current_mode(), Mode::Lists);
        assert_eq!(orch.run_command("lists abc"), Err(CommandError::ListBusy));
    }

    #[test]
    fn list_without_start_opens_the_editor() {
        let (mut orch, _host) = orchestrator();
        orch.run_command("lists 3").unwrap();
        assert_eq!(orch.state().ui.editor, Some(Editor::List(3)));
        assert!(!orch.state().lists.processing);
    }

    #[test]
    fn list_start_during_endurance_opens_the_window() {
        let (mut orch, host) = orchestrator();
        host.set_ingredients(70, true);
        orch.set_endurance_recipe(70);
        orch.run_command("endurance start").unwrap();

        orch.run_command("lists 3 start").unwrap();
        assert_eq!(orch.current_mode(), Mode::Endurance);
        assert!(orch.state().ui.is_open);
        assert_eq!(orch.state().ui.window, OpenWindow::Lists);
    }

    #[test]
    fn macros_require_idle_crafting() {
        let (mut orch, host) = orchestrator();
        assert_eq!(
            orch.run_command("macros 1"),
            Err(CommandError::MacroNotFound { id: 1 })
        );
        orch.run_command("macros 8").unwrap();
        assert_eq!(orch.state().ui.editor, Some(Editor::Macro(8)));

        host.set_craft(CraftObservation {
            synthesizing: true,
            ..CraftObservation::default()
        });
        orch.tick();
        assert_eq!(
            orch.run_command("macros 8"),
            Err(CommandError::CraftingBusy)
        );
    }

    #[test]
    fn endurance_commands_report_user_messages() {
        let (mut orch, _host) = orchestrator();
        let mut rx = orch.bus().subscribe();

        let err = orch.run_command("endurance start").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot start endurance without setting a recipe."
        );
        let err = orch.run_command("endurance stop").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Endurance is not running so cannot be stopped."
        );

        let rejected = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::CommandRejected)
            .count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn windows_open_and_toggle() {
        let (mut orch, _host) = orchestrator();
        orch.run_command("sim").unwrap();
        assert!(orch.state().ui.is_open);
        assert_eq!(orch.state().ui.window, OpenWindow::Simulator);

        orch.run_command("").unwrap();
        assert!(!orch.state().ui.is_open);
    }

    #[test]
    fn automode_is_saved_when_a_path_is_known() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autocraft.toml");
        let mut orch = Orchestrator::builder(Config::default())
            .with_config_path(&path)
            .build(FakeHost::new());

        orch.run_command("automode").unwrap();
        assert!(orch.config().auto_mode);
        assert!(Config::load(&path).unwrap().auto_mode);
    }
}
