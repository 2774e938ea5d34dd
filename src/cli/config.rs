use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::label::allocator::LabelScheme;
use crate::settings::settings::Settings;

pub const DEFAULT_CONFIG_PATH: &str = "ninja-surfing.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "ninja-surfing",
    version,
    about = "Keyboard label overlays for links and controls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: ninja-surfing.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the labels a scheme assigns to the first N elements
    Labels {
        /// How many labels to print
        #[arg(long, default_value_t = 26)]
        count: usize,

        /// Label scheme: default, characters_only, numbers_only
        #[arg(long)]
        scheme: Option<LabelScheme>,

        /// First element index
        #[arg(long, default_value_t = 0)]
        start: usize,
    },

    /// Run overlay scenarios from YAML files
    Run {
        /// Path to a scenario YAML file or a directory of them
        #[arg(long)]
        scenario: String,

        /// Append a JSONL session trace to this file
        #[arg(long)]
        trace: Option<String>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the resolved settings as YAML
    Settings {
        /// Write KEY=VALUE into the configured storage file first (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `ninja-surfing.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base settings before stored values apply
    #[serde(default)]
    pub settings: Settings,

    /// Flat YAML settings store, in extension storage key format
    #[serde(default)]
    pub storage: Option<String>,

    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Default trace file for `run`
    pub trace: Option<String>,
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}
