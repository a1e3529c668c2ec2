//! Tidewatch main entry point
//!
//! This is the command-line interface for the Tidewatch listing tracker.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tidewatch::config::{load_config_with_hash, validate, Config, EnvOverrides, RunOptions};
use tidewatch::output::print_outcome;
use tidewatch::runner::full_crawl_reason;
use tidewatch::storage::{ArticleStore, JsonArticleStore};
use tidewatch::{run_tracker, StateStore};
use tracing_subscriber::EnvFilter;

/// Tidewatch: an incremental news listing tracker
///
/// Tidewatch walks a paginated news listing, keeps only articles newer than
/// its previous run, and merges them into a deduplicated JSON/CSV record set.
#[derive(Parser, Debug)]
#[command(name = "tidewatch")]
#[command(version = "1.0.0")]
#[command(about = "An incremental news listing tracker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum listing pages to visit (overrides MAX_PAGES)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Ignore the previous crawl time and collect everything
    #[arg(long)]
    force_full_crawl: bool,

    /// Print the run outcome as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "show_state")]
    dry_run: bool,

    /// Show the persisted crawl state and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_state: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    // Environment first, then command-line flags on top
    let mut options = RunOptions::from_config(&config);
    EnvOverrides::from_env()?.apply(&mut config, &mut options);
    if let Some(max_pages) = cli.max_pages {
        options.max_pages = max_pages;
    }
    if cli.force_full_crawl {
        options.force_full_crawl = true;
    }
    validate(&config).context("Invalid configuration after applying overrides")?;

    if cli.show_state {
        handle_show_state(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if cli.dry_run {
        handle_dry_run(&config, &options);
        Ok(ExitCode::SUCCESS)
    } else {
        handle_run(&config, &options, cli.json).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the summary or JSON outcome.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidewatch=info,warn"),
            1 => EnvFilter::new("tidewatch=debug,info"),
            2 => EnvFilter::new("tidewatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --show-state mode: prints the persisted crawl state
fn handle_show_state(config: &Config) -> anyhow::Result<()> {
    let store = StateStore::new(&config.output.state_path);
    let state = store.load();

    println!("State file: {}\n", store.path().display());
    println!("{}", serde_json::to_string_pretty(&state)?);

    Ok(())
}

/// Handles the --dry-run mode: shows the effective settings and planned mode
fn handle_dry_run(config: &Config, options: &RunOptions) {
    let state = StateStore::new(&config.output.state_path).load();
    let records_exist = JsonArticleStore::from_config(&config.output).exists();
    let full_crawl = full_crawl_reason(&state, options, records_exist);

    println!("=== Tidewatch Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Max pages: {}", options.max_pages);
    println!(
        "  Full crawl page ceiling: {}",
        config.crawler.full_crawl_page_ceiling
    );
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!(
        "  Cutoff buffer: {} minutes",
        config.crawler.cutoff_buffer_minutes
    );

    println!("\nFetcher:");
    println!(
        "  Timeout: {}s (+{}s per retry)",
        config.fetcher.timeout_secs, config.fetcher.timeout_step_secs
    );
    println!("  Attempts per page: {}", config.fetcher.max_retries);
    println!("  User agents: {}", config.fetcher.user_agents.len());

    println!("\nOutput:");
    println!("  Records: {}", config.output.json_path);
    if let Some(csv) = &config.output.csv_path {
        println!("  CSV: {}", csv);
    }
    println!("  State: {}", config.output.state_path);

    println!("\n✓ Configuration is valid");
    if let Some(reason) = full_crawl {
        println!(
            "✓ Would run a full crawl of up to {} pages ({})",
            options.effective_max_pages(true, config.crawler.full_crawl_page_ceiling),
            reason
        );
    } else if let Some(last) = state.last_crawl_time {
        println!(
            "✓ Would run an incremental crawl of up to {} pages (last crawl: {})",
            options.max_pages,
            last.to_rfc3339()
        );
    }
}

/// Handles the main run: crawl, merge, persist, report
async fn handle_run(
    config: &Config,
    options: &RunOptions,
    json: bool,
) -> anyhow::Result<ExitCode> {
    tracing::info!(
        "Starting tracker: max_pages={}, force_full_crawl={}",
        options.max_pages,
        options.force_full_crawl
    );

    let outcome = run_tracker(config, options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, &config.output);
    }

    match outcome.failure() {
        Some(failure) => tracing::error!("Run failed: {}", failure.message),
        None => tracing::info!("Run completed successfully"),
    }

    Ok(ExitCode::from(outcome.exit_code()))
}
