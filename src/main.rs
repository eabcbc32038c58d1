//! Sumi-Audit main entry point
//!
//! This is the command-line interface for the Sumi-Audit broken-link auditor.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use sumi_audit::config::{
    load_config_with_hash, validate, validate_run, Config, OutputFormat, RunEntry,
};
use sumi_audit::crawler::Coordinator;
use sumi_audit::output::{print_statistics, writer_for};
use sumi_audit::url::{parse_start_url, ScopeFilter};
use tracing_subscriber::EnvFilter;

/// Sumi-Audit: a documentation-site broken-link auditor
///
/// Sumi-Audit crawls every page of a documentation version tree, checks the
/// status of every link it finds, and writes one report of broken links per
/// site.
#[derive(Parser, Debug)]
#[command(name = "sumi-audit")]
#[command(version = "1.0.0")]
#[command(about = "A documentation-site broken-link auditor", long_about = None)]
struct Cli {
    /// Start URL of a site to audit, in addition to the runs in the config
    #[arg(value_name = "START_URL")]
    start_url: Option<String>,

    /// Label of the run started from START_URL
    #[arg(short, long, default_value = "Site")]
    label: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Maximum number of concurrent requests
    #[arg(long, value_name = "N")]
    max_workers: Option<u32>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate settings and show what would be audited without any request
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, if any
    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid command-line settings")?;

    let runs = resolve_runs(&config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &runs)?;
    } else {
        handle_audit(&config, &runs, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_audit=info,warn"),
            1 => EnvFilter::new("sumi_audit=debug,info"),
            2 => EnvFilter::new("sumi_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.to_string_lossy().to_string();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(max_workers) = cli.max_workers {
        config.crawler.max_workers = max_workers;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.request_timeout_ms = timeout_ms;
    }
}

/// Collects the runs from the config file and the command line
fn resolve_runs(config: &Config, cli: &Cli) -> anyhow::Result<Vec<RunEntry>> {
    let mut runs = config.runs.clone();

    if let Some(start_url) = &cli.start_url {
        let run = RunEntry {
            start_url: start_url.clone(),
            label: cli.label.clone(),
        };
        validate_run(&run).context("Invalid start URL or label")?;
        runs.push(run);
    }

    if runs.is_empty() {
        bail!("Nothing to audit: pass a START_URL or add [[run]] entries to the config file");
    }

    Ok(runs)
}

/// Handles the --dry-run mode: shows what would be audited
fn handle_dry_run(config: &Config, runs: &[RunEntry]) -> anyhow::Result<()> {
    println!("=== Sumi-Audit Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max workers: {}", config.crawler.max_workers);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nHeaders:");
    println!("  User-Agent: {}", config.headers.user_agent);
    println!("  Accept: {}", config.headers.accept);
    println!("  Accept-Language: {}", config.headers.accept_language);

    println!("\nFilters:");
    println!(
        "  Excluded extensions: {}",
        config.scope.excluded_extensions.join(", ")
    );
    println!(
        "  Ignored substrings: {}",
        config.scope.ignore_substrings.join(", ")
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Format: {:?}", config.output.format);
    if config.output.format == OutputFormat::Sqlite {
        println!("  Database: {}", config.output.database_name);
    }

    println!("\nRuns ({}):", runs.len());
    for run in runs {
        let start = parse_start_url(&run.start_url)?;
        let filter = ScopeFilter::new(&start, &config.scope);
        println!("  - {}: {}", run.label, start);
        println!("    scope: {}", filter.scope());
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would audit {} site(s)", runs.len());

    Ok(())
}

/// Handles the main audit: one run per site, one report per run
async fn handle_audit(
    config: &Config,
    runs: &[RunEntry],
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let writer = writer_for(&config.output);

    for run in runs {
        tracing::info!("Auditing '{}' from {}", run.label, run.start_url);

        let coordinator = Coordinator::new(&run.start_url, &run.label, config)
            .with_context(|| format!("Failed to start audit '{}'", run.label))?
            .with_config_hash(config_hash.clone());

        let sink = coordinator.run().await;

        let path = sink
            .flush(writer.as_ref())
            .with_context(|| format!("Failed to write report for '{}'", run.label))?;

        print_statistics(sink.summary());
        println!("\nReport: {}\n", path.display());
    }

    tracing::info!("All audits completed");
    Ok(())
}
