//! TOML-based drill configuration and preset definitions.
//!
//! A drill is a scripted operator exercise: a generator selection, a run
//! length, and a list of timed commands issued against one session.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::choreography::Scenario;
use crate::sim::manual::ManualAction;
use crate::sim::topology::GeneratorId;

/// Longest drill accepted, in simulated seconds (one day).
pub const MAX_DURATION_SECS: u64 = 86_400;

/// Top-level drill configuration parsed from TOML.
///
/// Load from TOML with [`DrillConfig::from_toml_file`] or pick a built-in
/// preset with [`DrillConfig::from_preset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrillConfig {
    /// Initial session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Run length and label.
    #[serde(default)]
    pub run: RunConfig,
    /// Timed commands, in any order; ties keep file order.
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandConfig>,
}

/// Initial session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Generator on the DG selector when the drill starts.
    pub selected_generator: GeneratorId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selected_generator: GeneratorId::Dg1,
        }
    }
}

/// Run length and label.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Label printed in reports.
    pub name: String,
    /// Simulated seconds to run (must be in `1..=86400`).
    pub duration_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "drill".to_string(),
            duration_secs: 60,
        }
    }
}

/// Kind of a drill command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Scenario,
    Manual,
    Reset,
    Select,
}

/// One timed command as written in the drill file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Simulated second the command is issued at.
    pub at_secs: u64,
    pub kind: CommandKind,
    /// Scenario or manual action name; unused by `reset` and `select`.
    #[serde(default)]
    pub name: String,
    /// Generator override for `scenario`, target for `manual`, new
    /// selection for `select`.
    #[serde(default)]
    pub generator: Option<GeneratorId>,
}

/// A validated drill command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Trigger(Scenario, Option<GeneratorId>),
    Manual(ManualAction, Option<GeneratorId>),
    Reset,
    Select(GeneratorId),
}

/// One problem found in a drill configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted path of the offending field, e.g. `command[2].name`.
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl CommandConfig {
    fn new(at_secs: u64, kind: CommandKind, name: &str) -> Self {
        Self {
            at_secs,
            kind,
            name: name.to_string(),
            generator: None,
        }
    }

    fn with_generator(mut self, g: GeneratorId) -> Self {
        self.generator = Some(g);
        self
    }

    /// Resolves names into a typed command.
    ///
    /// `index` is only used for the error's field path.
    pub fn resolve(&self, index: usize) -> Result<Command, ConfigError> {
        let field = |f: &str| format!("command[{index}].{f}");
        match self.kind {
            CommandKind::Scenario => Scenario::from_name(&self.name)
                .map(|s| Command::Trigger(s, self.generator))
                .ok_or_else(|| {
                    ConfigError::new(
                        field("name"),
                        format!(
                            "unknown scenario \"{}\", available: {}",
                            self.name,
                            Scenario::ALL.map(Scenario::name).join(", ")
                        ),
                    )
                }),
            CommandKind::Manual => ManualAction::from_name(&self.name)
                .map(|a| Command::Manual(a, self.generator))
                .ok_or_else(|| {
                    ConfigError::new(
                        field("name"),
                        format!(
                            "unknown manual action \"{}\", available: {}",
                            self.name,
                            ManualAction::ALL.map(ManualAction::name).join(", ")
                        ),
                    )
                }),
            CommandKind::Reset => Ok(Command::Reset),
            CommandKind::Select => self
                .generator
                .map(Command::Select)
                .ok_or_else(|| ConfigError::new(field("generator"), "required for select")),
        }
    }
}

impl DrillConfig {
    /// A single total utility failure carried by DG-1.
    pub fn total_eb_fail() -> Self {
        Self::preset(
            "total_eb_fail",
            40,
            vec![CommandConfig::new(0, CommandKind::Scenario, "total_eb_fail")],
        )
    }

    /// EB-1 feeder failure bridged from EB-2.
    pub fn eb1_fail() -> Self {
        Self::preset(
            "eb1_fail",
            20,
            vec![CommandConfig::new(0, CommandKind::Scenario, "eb1_fail")],
        )
    }

    /// EB-2 feeder failure bridged from EB-1.
    pub fn eb2_fail() -> Self {
        Self::preset(
            "eb2_fail",
            20,
            vec![CommandConfig::new(0, CommandKind::Scenario, "eb2_fail")],
        )
    }

    /// EB-1 failure followed by the simple restoration.
    pub fn eb1_fail_and_restore() -> Self {
        Self::preset(
            "eb1_fail_and_restore",
            40,
            vec![
                CommandConfig::new(0, CommandKind::Scenario, "eb1_fail"),
                CommandConfig::new(20, CommandKind::Scenario, "eb_restore"),
            ],
        )
    }

    /// Total failure on DG-2, then the generator-carrying restoration
    /// including the full cool-down.
    pub fn full_dg_cycle() -> Self {
        Self::preset(
            "full_dg_cycle",
            240,
            vec![
                CommandConfig::new(0, CommandKind::Select, "").with_generator(GeneratorId::Dg2),
                CommandConfig::new(0, CommandKind::Scenario, "total_eb_fail"),
                CommandConfig::new(40, CommandKind::Scenario, "eb_restore"),
            ],
        )
    }

    /// Operator changeover to DG-1 and back, entirely in manual mode.
    pub fn manual_changeover() -> Self {
        let m = |at, name| CommandConfig::new(at, CommandKind::Manual, name);
        Self::preset(
            "manual_changeover",
            40,
            vec![
                m(0, "open_eb_all"),
                m(1, "start_gen").with_generator(GeneratorId::Dg1),
                m(12, "close_gen_incomer").with_generator(GeneratorId::Dg1),
                m(13, "close_coupler_1"),
                m(14, "close_coupler_2"),
                m(30, "restore_eb_supply"),
                m(31, "open_coupler_2"),
                m(32, "open_coupler_1"),
                m(33, "open_gen_incomer").with_generator(GeneratorId::Dg1),
                m(34, "close_eb1"),
                m(35, "close_eb2"),
                m(36, "stop_gen").with_generator(GeneratorId::Dg1),
            ],
        )
    }

    fn preset(name: &str, duration_secs: u64, commands: Vec<CommandConfig>) -> Self {
        Self {
            session: SessionConfig::default(),
            run: RunConfig {
                name: name.to_string(),
                duration_secs,
            },
            commands,
        }
    }

    /// Names accepted by [`from_preset`](Self::from_preset).
    pub const PRESETS: &[&str] = &[
        "total_eb_fail",
        "eb1_fail",
        "eb2_fail",
        "eb1_fail_and_restore",
        "full_dg_cycle",
        "manual_changeover",
    ];

    /// Returns a built-in preset by name.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on field `preset` for an unknown name.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "total_eb_fail" => Ok(Self::total_eb_fail()),
            "eb1_fail" => Ok(Self::eb1_fail()),
            "eb2_fail" => Ok(Self::eb2_fail()),
            "eb1_fail_and_restore" => Ok(Self::eb1_fail_and_restore()),
            "full_dg_cycle" => Ok(Self::full_dg_cycle()),
            "manual_changeover" => Ok(Self::manual_changeover()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Loads a drill from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("drill", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a drill from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on syntax errors or unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Checks the drill for semantic errors.
    ///
    /// Returns every error found, each with the dotted path of its field. An
    /// empty vector means the drill is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let duration = self.run.duration_secs;

        if duration == 0 {
            errors.push(ConfigError::new("run.duration_secs", "must be > 0"));
        }
        if duration > MAX_DURATION_SECS {
            errors.push(ConfigError::new(
                "run.duration_secs",
                format!("must be <= {MAX_DURATION_SECS}"),
            ));
        }

        for (i, cmd) in self.commands.iter().enumerate() {
            if cmd.at_secs > duration {
                errors.push(ConfigError::new(
                    format!("command[{i}].at_secs"),
                    "must be <= run.duration_secs",
                ));
            }
            if let Err(e) = cmd.resolve(i) {
                errors.push(e);
            }
        }

        errors
    }

    /// Resolved commands ordered by `at_secs`, ties in file order.
    ///
    /// # Errors
    ///
    /// Returns every resolution error; see [`validate`](Self::validate).
    pub fn schedule(&self) -> Result<Vec<(u64, Command)>, Vec<ConfigError>> {
        let mut resolved = Vec::with_capacity(self.commands.len());
        let mut errors = Vec::new();
        for (i, cmd) in self.commands.iter().enumerate() {
            match cmd.resolve(i) {
                Ok(c) => resolved.push((cmd.at_secs, c)),
                Err(e) => errors.push(e),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        resolved.sort_by_key(|(at, _)| *at);
        Ok(resolved)
    }
}
