//! Link-Scout main entry point
//!
//! This is the command-line interface for the Link-Scout metadata scraper.

use anyhow::Context;
use clap::Parser;
use link_scout::config::{apply_env_overrides, load_config_with_hash, validate, Config};
use link_scout::scrape::print_statistics;
use link_scout::url::{normalize_protocol, validate_url_with_blocklist};
use link_scout::Scraper;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Scout: URL metadata scraper
///
/// Link-Scout fetches titles, descriptions, images and authors for URLs,
/// trying an external scrape service first and falling back to oEmbed,
/// OpenGraph and finally the URL itself. Results are printed as JSON.
#[derive(Parser, Debug)]
#[command(name = "link-scout")]
#[command(version = "1.0.0")]
#[command(about = "URL metadata scraper", long_about = None)]
struct Cli {
    /// URLs to scrape
    #[arg(value_name = "URL", required_unless_present = "status")]
    urls: Vec<String>,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the scrape service status and exit
    #[arg(long, conflicts_with = "check")]
    status: bool,

    /// Validate the URLs without scraping them
    #[arg(long, conflicts_with = "status")]
    check: bool,

    /// Print pipeline statistics to stderr after scraping
    #[arg(long, conflicts_with_all = ["status", "check"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.check {
        handle_check(&config, &cli.urls)?;
        return Ok(());
    }

    let scraper = Scraper::new(config).context("Failed to initialise scraper")?;

    if cli.status {
        println!("{}", serde_json::to_string_pretty(&scraper.status())?);
        return Ok(());
    }

    handle_scrape(&scraper, &cli.urls).await?;

    if cli.stats {
        print_statistics(&scraper.stats());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only JSON.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_scout=info,warn"),
            1 => EnvFilter::new("link_scout=debug,info"),
            2 => EnvFilter::new("link_scout=trace,debug"),
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

/// Loads the configuration file, or defaults plus environment overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            validate(&config).context("Invalid configuration from environment")?;
            tracing::debug!("Using default configuration");
            Ok(config)
        }
    }
}

/// Handles --check: prints one validation verdict per URL
fn handle_check(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let verdicts: Vec<_> = urls
        .iter()
        .map(|url| {
            validate_url_with_blocklist(
                &normalize_protocol(url),
                &config.security.extra_blocked_hosts,
            )
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&verdicts)?);
    Ok(())
}

/// Scrapes the URLs and prints the results
///
/// A single URL that is rejected is an error; in a batch, rejected URLs are
/// skipped.
async fn handle_scrape(scraper: &Scraper, urls: &[String]) -> anyhow::Result<()> {
    let output = match urls {
        [url] => {
            let metadata = scraper.scrape_url(url).await?;
            serde_json::to_string_pretty(&metadata)?
        }
        _ => {
            let results = scraper.scrape_urls(urls).await;
            tracing::info!("Scraped {} of {} URLs", results.len(), urls.len());
            serde_json::to_string_pretty(&results)?
        }
    };

    println!("{}", output);
    Ok(())
}
