use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the transcode job orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Spacing between engine readiness probes, in milliseconds
    pub poll_interval_ms: u64,
    /// Readiness probes attempted before giving up with a load timeout
    pub max_probe_attempts: u32,
    /// Name the input buffer is staged under in engine working storage
    pub input_name: String,
    /// Name the engine writes the transcoded output under
    pub output_name: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl OrchestratorConfig {
    /// Create a default configuration with sensible values
    pub fn default_config() -> Self {
        Self {
            poll_interval_ms: 200,
            max_probe_attempts: 25,
            input_name: "input.dat".to_string(),
            output_name: "output.mp4".to_string(),
        }
    }

    /// Load configuration from a file, or return defaults if path is None or file doesn't exist
    pub fn load_config(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default_config();

        if let Some(config_path) = path {
            if config_path.exists() {
                let content = std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

                // Try JSON first, then TOML
                if config_path.extension().and_then(|s| s.to_str()) == Some("toml") {
                    let file_config: OrchestratorConfig = toml::from_str(&content)
                        .with_context(|| format!("Failed to parse TOML config: {}", config_path.display()))?;
                    config = file_config;
                } else {
                    let file_config: OrchestratorConfig = serde_json::from_str(&content)
                        .with_context(|| format!("Failed to parse JSON config: {}", config_path.display()))?;
                    config = file_config;
                }
            }
        }

        Ok(config)
    }
}
