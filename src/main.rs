//! findings-insights - security findings dashboard data layer
//!
//! Fetches the severity summary and a page of findings from the findings
//! backend and derives the dashboard views (domain and source histograms,
//! daily trend, executive metrics).
//!
//! Exit codes:
//!   0 - Success (no findings above threshold, or no --fail-on set)
//!   1 - Runtime error (timeout, network, bad status, config, etc.)
//!   2 - Backend reports findings at or above the --fail-on threshold

mod analysis;
mod cli;
mod client;
mod config;
mod errors;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, FailOnLevel, OutputFormat};
use client::{ApiClient, ClientConfig, RuntimeContext};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata, Severity};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("findings-insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .findings-insights.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the backend URL, timeout and trend window.");
    Ok(())
}

/// Initialize logging on stderr; `RUST_LOG` overrides the CLI verbosity.
fn init_logging(args: &Args) {
    let level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Resolve the backend, fetch, compute and emit the report. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let client = build_client(&config)?;

    if args.health {
        return check_health(&client).await;
    }

    let limit = config.api.findings_limit;
    let spinner = fetch_spinner(args.quiet, client.base_url());

    let fetched = client.fetch_dashboard(limit).await;
    spinner.finish_and_clear();

    let (summary, findings) = match fetched {
        Ok(data) => data,
        Err(e) => {
            if e.is_timeout() {
                warn!(
                    "Backend did not answer within {}ms; raise --timeout if it is slow",
                    client.timeout().as_millis()
                );
            }
            if let Some(path) = e.path() {
                debug!("Failing request: {}", path);
            }
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to fetch findings from {}", client.base_url())));
        }
    };

    info!(
        "Fetched {} findings ({} in backend summary)",
        findings.len(),
        summary.total()
    );

    let options = config.insights.options();
    let insights = analysis::build_insights(&summary, &findings, &options);

    let report = Report {
        metadata: ReportMetadata {
            api_base_url: client.base_url().to_string(),
            generated_at: Utc::now(),
            findings_limit: limit,
            trend_days: options.trend_days,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        summary,
        insights,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!("Report saved to {}", path);
        }
        None => print!("{}", output),
    }

    if let Some(fail_level) = args.fail_on {
        let threshold = fail_on_to_severity(fail_level);
        let above = report.summary.count_at_or_above(threshold);

        if above > 0 {
            eprintln!(
                "\n⛔ {} findings at or above {} severity. Failing (exit code 2).",
                above, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Resolve the backend base address once and build the client around it.
fn build_client(config: &Config) -> Result<ApiClient> {
    let runtime = RuntimeContext::from_origin(&config.api.origin)?;

    let configured = config
        .api
        .base_url
        .as_deref()
        .or_else(|| client::build_time_base_url());
    let base_url = client::resolve_base_url(configured, &runtime);

    if configured.is_some_and(|c| c.trim() != base_url) {
        warn!(
            "Configured backend URL rewritten to {} for host {}",
            base_url, runtime.hostname
        );
    }
    info!("Using backend at {}", base_url);

    let client_config = ClientConfig::new(base_url).with_timeout(config.api.timeout());
    Ok(ApiClient::new(client_config)?)
}

/// Handle --health: probe the backend and report its status.
async fn check_health(client: &ApiClient) -> Result<i32> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Health check against {} failed", client.base_url()))?;

    match health.database {
        Some(ref database) => println!("{} ({})", health.status, database),
        None => println!("{}", health.status),
    }

    Ok(if health.is_ok() { 0 } else { 1 })
}

fn fetch_spinner(quiet: bool, base_url: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching findings from {}", base_url));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Convert FailOnLevel to Severity for comparison.
fn fail_on_to_severity(level: FailOnLevel) -> Severity {
    match level {
        FailOnLevel::Low => Severity::Low,
        FailOnLevel::Medium => Severity::Medium,
        FailOnLevel::High => Severity::High,
        FailOnLevel::Critical => Severity::Critical,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
