//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::TOP_SOURCES;
use clap::Parser;
use std::path::PathBuf;

/// findings-insights - security findings dashboard data from the command line
///
/// Fetches the severity summary and a page of findings from the findings
/// backend, then reports domain and source histograms, a daily trend and
/// executive metrics as Markdown or JSON.
///
/// Examples:
///   findings-insights
///   findings-insights --api-url http://localhost:9000 --limit 500
///   findings-insights --origin https://dash.example.com --format json
///   findings-insights --health
///   findings-insights --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Backend base URL
    ///
    /// When omitted, the URL is taken from the config file, then from the
    /// build-time FINDINGS_API_URL, then derived from --origin.
    #[arg(long, value_name = "URL", env = "FINDINGS_API_URL")]
    pub api_url: Option<String>,

    /// Origin the dashboard is served from
    ///
    /// Loopback backend URLs are rewritten to this host when it is not local.
    #[arg(long, value_name = "URL", env = "FINDINGS_ORIGIN")]
    pub origin: Option<String>,

    /// Number of findings to request
    #[arg(short, long, value_name = "COUNT")]
    pub limit: Option<u32>,

    /// Days in the trend window, ending today
    #[arg(long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Number of sources to keep in the source histogram
    #[arg(long, value_name = "COUNT")]
    pub top_sources: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .findings-insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if the backend reports findings at or above this severity
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is exceeded.
    /// Values: critical, high, medium, low
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Check backend health and exit
    #[arg(long)]
    pub health: bool,

    /// Generate a default .findings-insights.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !is_http_url(url) {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref origin) = self.origin {
            if !is_http_url(origin) {
                return Err("Origin must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if self.days == Some(0) {
            return Err("Trend window must be at least 1 day".to_string());
        }

        if let Some(top) = self.top_sources {
            if top == 0 || top > TOP_SOURCES {
                return Err(format!("Top sources must be between 1 and {}", TOP_SOURCES));
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 millisecond".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            api_url: Some("http://localhost:8080".to_string()),
            origin: None,
            limit: None,
            days: None,
            top_sources: None,
            timeout: None,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            health: false,
            init_config: false,
        }
    }

    #[test]
    fn test_valid_args() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("ftp://backend".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.origin = Some("dash.example.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.limit = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.days = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.top_sources = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_top_sources_cap() {
        let mut args = make_args();
        args.top_sources = Some(8);
        assert!(args.validate().is_ok());

        let args = Args::parse_from(["findings-insights", "--top-sources", "20"]);
        let err = args.validate().unwrap_err();
        assert!(err.contains("between 1 and 8"));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "findings-insights",
            "--limit",
            "50",
            "--format",
            "json",
            "--fail-on",
            "high",
        ]);
        assert_eq!(args.limit, Some(50));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.fail_on, Some(FailOnLevel::High));
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
    }
}
