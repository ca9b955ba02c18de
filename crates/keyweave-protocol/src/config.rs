use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the backend's per-event modifier field can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierMode {
    /// The event carries the modifier state as of just before the key action.
    #[default]
    Reported,
    /// The event field is unreliable; modifiers are tracked from key actions.
    Tracked,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Terminate the owning process on Ctrl+Alt+Delete or Ctrl+Alt+End.
    #[arg(long, default_value_t = false)]
    pub emergency_terminate: bool,

    /// Process to signal on emergency terminate (defaults to this process).
    #[arg(long)]
    pub terminate_pid: Option<u32>,

    /// Maximum number of undelivered events held by the queue sink.
    #[arg(long, default_value_t = 256)]
    pub event_capacity: usize,

    #[arg(long, value_enum, default_value_t = ModifierMode::Reported)]
    pub modifier_mode: ModifierMode,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            emergency_terminate: false,
            terminate_pid: None,
            event_capacity: 256,
            modifier_mode: ModifierMode::Reported,
        }
    }
}

impl DriverConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read driver config: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse driver config: {}", e))
    }

    /// Copies every field the user set explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &DriverConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(emergency_terminate, "emergency_terminate");
        update_if_present!(terminate_pid, "terminate_pid");
        update_if_present!(event_capacity, "event_capacity");
        update_if_present!(modifier_mode, "modifier_mode");
    }
}
