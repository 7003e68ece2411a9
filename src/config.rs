//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.finlab.toml` files.

use crate::cli::OutputFormat;
use crate::models::Mode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".finlab.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Mode used when no `--agent` flag is given.
    #[serde(default)]
    pub default_mode: Mode,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Analysis backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the simple-query endpoint.
    #[serde(default = "default_simple_path")]
    pub simple_path: String,

    /// Path of the agent-query endpoint.
    #[serde(default = "default_agent_path")]
    pub agent_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Context limit sent with simple queries.
    #[serde(default = "default_simple_limit")]
    pub simple_limit: usize,

    /// Context limit sent with agent queries.
    #[serde(default = "default_agent_limit")]
    pub agent_limit: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            simple_path: default_simple_path(),
            agent_path: default_agent_path(),
            timeout_seconds: default_timeout(),
            simple_limit: default_simple_limit(),
            agent_limit: default_agent_limit(),
        }
    }
}

impl BackendConfig {
    /// Limit to send for the given mode.
    pub fn limit_for(&self, mode: Mode) -> usize {
        match mode {
            Mode::Simple => self.simple_limit,
            Mode::Agent => self.agent_limit,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_simple_path() -> String {
    "/rag".to_string()
}

fn default_agent_path() -> String {
    "/agent".to_string()
}

fn default_timeout() -> u64 {
    120 // multi-stream analysis routinely takes over a minute
}

fn default_simple_limit() -> usize {
    5
}

fn default_agent_limit() -> usize {
    3
}

/// Report output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Format used for saved reports and one-shot output.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.finlab.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.backend_url {
            self.backend.base_url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }

        if args.agent {
            self.general.default_mode = Mode::Agent;
        }

        // --limit applies to whichever mode is active at startup
        if let Some(limit) = args.limit {
            match self.general.default_mode {
                Mode::Simple => self.backend.simple_limit = limit,
                Mode::Agent => self.backend.agent_limit = limit,
            }
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
