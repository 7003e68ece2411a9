//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Finlab - investment intelligence from your terminal
///
/// Ask anything about companies, stocks, or market trends. Pass --agent
/// for a multi-stream analysis (fundamental, momentum and sentiment).
/// Without a query, starts an interactive session.
///
/// Examples:
///   finlab "What drove NVDA earnings last quarter?"
///   finlab --agent AAPL
///   finlab --agent AAPL --format json --output aapl.json
///   finlab
///   finlab --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Question or ticker to analyze
    ///
    /// When omitted, an interactive session is started.
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Run a multi-stream agent analysis instead of a simple query
    #[arg(short, long)]
    pub agent: bool,

    /// Analysis backend base URL
    ///
    /// Can also be set via FINLAB_BACKEND_URL or .finlab.toml.
    #[arg(long, value_name = "URL", env = "FINLAB_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Context limit sent with the query
    ///
    /// Defaults to 5 for simple queries and 3 for agent analyses.
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Save the rendered result to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .finlab.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .finlab.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for rendered results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether to start the interactive session.
    pub fn is_interactive(&self) -> bool {
        self.query.is_none()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.backend_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err("Limit must be at least 1".to_string());
            }
        }

        if self.output.is_some() && self.is_interactive() {
            return Err("--output requires a QUERY".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// The interactive session defaults to WARN so log lines don't
    /// interleave with the prompt.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else if self.is_interactive() {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            query: Some("AAPL".to_string()),
            agent: false,
            backend_url: None,
            timeout: None,
            limit: None,
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::parse_from(["finlab", "--agent", "--limit", "2", "AAPL"]);
        assert!(args.agent);
        assert_eq!(args.limit, Some(2));
        assert_eq!(args.query.as_deref(), Some("AAPL"));
        assert!(!args.is_interactive());

        let args = Args::parse_from(["finlab", "--format", "json", "MSFT"]);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.backend_url = Some("backend:8000".to_string());
        assert!(args.validate().is_err());

        args.backend_url = Some("https://analysis.example.com".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.limit = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_needs_query() {
        let mut args = make_args();
        args.query = None;
        args.output = Some(PathBuf::from("report.md"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);

        args.quiet = false;
        args.query = None;
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }
}
