use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::protocol::client::{DEFAULT_ENDPOINT, DEFAULT_MODEL, REQUEST_TIMEOUT_MS};
use crate::store::credentials::DEFAULT_STORE_PATH;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Fills captured document snapshots from a completion service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Completion API endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Completion model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a document snapshot and print its field descriptors
    Scan {
        /// Path to the document snapshot JSON
        #[arg(long)]
        doc: String,

        /// Eligibility mode: only_empty or all_eligible
        #[arg(long)]
        mode: Option<String>,

        /// Output format: console, json
        #[arg(long, default_value = "console")]
        format: String,
    },

    /// Fill a document snapshot and emit the updated snapshot
    Fill {
        /// Path to the document snapshot JSON
        #[arg(long)]
        doc: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Eligibility mode: only_empty or all_eligible
        #[arg(long)]
        mode: Option<String>,

        /// Completion service: heuristic or openai
        #[arg(long, default_value = "heuristic")]
        service: String,
    },

    /// Run scenario YAML files
    Run {
        /// Path to a scenario YAML file or a directory of YAML files
        #[arg(long)]
        scenario: String,

        /// Completion service for unscripted fills: heuristic or openai
        #[arg(long, default_value = "heuristic")]
        service: String,
    },

    /// Show or update the stored credential and profile data
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Update stored values; omitted flags keep their current value
    Set {
        /// API key for the completion service
        #[arg(long)]
        api_key: Option<String>,

        /// Free-text profile data values are grounded in
        #[arg(long)]
        data: Option<String>,

        /// Read the profile data from a file instead
        #[arg(long, conflicts_with = "data")]
        data_file: Option<String>,
    },

    /// Print the store with the key redacted
    Show,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fill: FillConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fill: FillConfig::default(),
            openai: OpenAiConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// Default eligibility mode when the CLI does not pass one
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Path of the credential/profile store
    #[serde(default = "default_store")]
    pub store: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            mode: "only_empty".to_string(),
            store: DEFAULT_STORE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenAiConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl OpenAiConfig {
    pub fn endpoint_or_default(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn model_or_default(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn timeout_or_default(&self) -> u64 {
        self.timeout_ms.unwrap_or(REQUEST_TIMEOUT_MS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_trace_file")]
    pub file: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: "autofill_trace.jsonl".to_string(),
        }
    }
}

// Serde default helpers
fn default_mode() -> String {
    "only_empty".to_string()
}
fn default_store() -> String {
    DEFAULT_STORE_PATH.to_string()
}
fn default_trace_file() -> String {
    "autofill_trace.jsonl".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
