//! Metric definitions and global polling options.
//!
//! The configuration file is a JSON array of definitions:
//!
//! ```json
//! [
//!     { "name": "disk_latency", "command": "./probes/disk.sh", "frequency": 10 },
//!     { "name": "open_conns", "command": "ss -tn | wc -l" }
//! ]
//! ```
//!
//! A definition without `frequency` inherits [`PollOptions::frequency`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PollError, Result};

/// Config file read when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "./settings.json";

/// Polling frequency used when neither the definition nor the caller sets one.
pub const DEFAULT_FREQUENCY_SECS: u64 = 30;

/// One probe as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique identifier (e.g. `"disk_latency"`).
    pub name: String,
    /// Shell command whose stdout starts with a number.
    pub command: String,
    /// Polling interval in seconds; falls back to the global default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
}

impl MetricDefinition {
    /// Effective polling interval given the global default in seconds.
    pub fn interval(&self, default_secs: u64) -> Duration {
        Duration::from_secs(self.frequency.unwrap_or(default_secs))
    }
}

/// Session-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Default polling frequency in seconds.
    pub frequency: u64,
    /// Number of ticks each group runs before stopping; `None` polls until interrupted.
    pub samples: Option<u32>,
    /// Print every sample as it is taken.
    pub verbose: bool,
    /// Where to write the JSON snapshot at session end.
    pub out: Option<PathBuf>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY_SECS,
            samples: None,
            verbose: false,
            out: None,
        }
    }
}

/// Read, parse and validate a configuration file.
pub fn load_definitions(path: &Path) -> Result<Vec<MetricDefinition>> {
    let contents = std::fs::read_to_string(path).map_err(|e| PollError::Configuration {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_definitions(&contents).map_err(|reason| PollError::Configuration {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse and validate configuration text.
pub fn parse_definitions(json: &str) -> std::result::Result<Vec<MetricDefinition>, String> {
    let definitions: Vec<MetricDefinition> =
        serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
    validate(&definitions)?;
    Ok(definitions)
}

fn validate(definitions: &[MetricDefinition]) -> std::result::Result<(), String> {
    if definitions.is_empty() {
        return Err("no metrics configured".to_string());
    }

    let mut seen = HashSet::new();
    for (i, def) in definitions.iter().enumerate() {
        let name = def.name.trim();
        if name.is_empty() {
            return Err(format!("metric #{} has an empty name", i + 1));
        }
        if !seen.insert(name) {
            return Err(format!("duplicate metric name '{name}'"));
        }
        if def.command.trim().is_empty() {
            return Err(format!("metric '{name}' has an empty command"));
        }
        if def.frequency == Some(0) {
            return Err(format!("metric '{name}' has a zero frequency"));
        }
    }
    Ok(())
}
