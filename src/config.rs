//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.findings-insights.toml` files.

use crate::analysis::{InsightOptions, DEFAULT_TREND_DAYS, TOP_SOURCES};
use crate::client::{DEFAULT_FINDINGS_LIMIT, DEFAULT_ORIGIN, REQUEST_TIMEOUT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".findings-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Insights settings.
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Write the report here instead of stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL. When unset, it is derived from `origin`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Origin the dashboard is served from.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Client-side request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Page size requested from the findings endpoint.
    #[serde(default = "default_findings_limit")]
    pub findings_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            origin: default_origin(),
            timeout_ms: default_timeout_ms(),
            findings_limit: default_findings_limit(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_timeout_ms() -> u64 {
    REQUEST_TIMEOUT.as_millis() as u64
}

fn default_findings_limit() -> u32 {
    DEFAULT_FINDINGS_LIMIT
}

/// Insights settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Days in the trend window, ending today.
    #[serde(default = "default_trend_days")]
    pub trend_days: u32,

    /// Sources kept in the source histogram.
    #[serde(default = "default_top_sources")]
    pub top_sources: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            top_sources: default_top_sources(),
        }
    }
}

impl InsightsConfig {
    pub fn options(&self) -> InsightOptions {
        InsightOptions {
            trend_days: self.trend_days,
            top_sources: self.top_sources,
        }
    }
}

fn default_trend_days() -> u32 {
    DEFAULT_TREND_DAYS
}

fn default_top_sources() -> usize {
    TOP_SOURCES
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

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.findings-insights.toml` from a directory.
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
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = Some(url.clone());
        }
        if let Some(ref origin) = args.origin {
            self.api.origin = origin.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_ms = timeout;
        }
        if let Some(limit) = args.limit {
            self.api.findings_limit = limit;
        }

        if let Some(days) = args.days {
            self.insights.trend_days = days;
        }
        if let Some(top) = args.top_sources {
            self.insights.top_sources = top;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Reject values the client and insights cannot work with.
    ///
    /// Run after `merge_with_args`, since config files bypass CLI validation.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_ms == 0 {
            bail!("[api] timeout_ms must be at least 1");
        }
        if self.api.findings_limit == 0 {
            bail!("[api] findings_limit must be at least 1");
        }
        if self.insights.trend_days == 0 {
            bail!("[insights] trend_days must be at least 1");
        }
        if self.insights.top_sources == 0 || self.insights.top_sources > TOP_SOURCES {
            bail!(
                "[insights] top_sources must be between 1 and {}, got {}",
                TOP_SOURCES,
                self.insights.top_sources
            );
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
