//! Paper-Trawl main entry point
//!
//! This is the command-line interface for the Paper-Trawl listing crawler.

use clap::Parser;
use paper_trawl::browser::{ChromiumFactory, Discovery, LaunchOptions};
use paper_trawl::config::{load_config_with_hash, resolve_schema, validate, Config};
use paper_trawl::crawler::crawl;
use paper_trawl::output::{print_statistics, JsonOutput, OutputHandler};
use paper_trawl::url::{listing_url, ListingQuery};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Paper-Trawl: a rank-preserving listing crawler
///
/// Paper-Trawl walks the result pages of a document search, opens every
/// discovered document in a browser and writes one structured record per
/// document, in the order the search listed them.
#[derive(Parser, Debug)]
#[command(name = "paper-trawl")]
#[command(version = "1.0.0")]
#[command(about = "A rank-preserving listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write results to this path instead of the configured one
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Search for this term instead of the configured one
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Crawl this many listing pages instead of the configured number
    #[arg(long, value_name = "N")]
    pages: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Command-line overrides are validated like the file itself
    if let Some(output) = &cli.output {
        config.output.results_path = output.display().to_string();
    }
    if let Some(search) = cli.search {
        config.search.query = search;
    }
    if let Some(pages) = cli.pages {
        config.search.pages = pages;
    }
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
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
            0 => EnvFilter::new("paper_trawl=info,warn"),
            1 => EnvFilter::new("paper_trawl=debug,info"),
            2 => EnvFilter::new("paper_trawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Paper-Trawl Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", config.search.query);
    match config.search.sort {
        Some(sort) => println!("  Sort: {}", sort),
        None => println!("  Sort: relevance"),
    }
    println!("  Result entries: {}", config.search.result_selector);
    println!("  Detail links: {}", config.search.link_selector);
    for prefix in &config.search.exclude_prefixes {
        println!("  Excluding: {}*", prefix);
    }

    println!("\nListing Pages:");
    for page in config.search.page_range() {
        let query = ListingQuery::new(config.search.query.as_str(), page, config.search.sort);
        println!("  {}: {}", page, listing_url(&config.search.listing_url, &query)?);
    }

    println!("\nCrawler Configuration:");
    println!("  Consumers: {}", config.crawler.consumers);
    println!("  Query timeout: {}ms", config.crawler.query_timeout_ms);
    println!("  Ready timeout: {}ms", config.crawler.ready_timeout_ms);
    println!("  Navigation timeout: {}ms", config.crawler.navigation_timeout_ms);
    match config.retry.max_attempts {
        0 => println!("  Retries: unbounded"),
        n => println!("  Retries: {} attempts, {}ms backoff", n, config.retry.backoff_ms),
    }

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Max concurrent operations: {}",
        config.browser.max_concurrent_operations
    );
    for entry in &config.browser.drivers {
        let browsers: Vec<String> = entry.browsers.iter().map(|b| b.to_string()).collect();
        println!("  Driver {}: {}", entry.driver, browsers.join(", "));
    }

    let schema = resolve_schema(&config.output)?;
    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    match &config.output.schema_path {
        Some(path) => println!("  Schema: {} ({} fields)", path, schema.fields.len()),
        None => println!("  Schema: built-in ({} fields)", schema.fields.len()),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} listing pages with {} sessions",
        config.search.pages,
        config.search.pages as usize + config.crawler.consumers
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let schema = resolve_schema(&config.output)?;
    tracing::info!("Extracting {} fields per document", schema.fields.len());

    let installation = match Discovery::from_env()?.discover(&config.browser.drivers) {
        Ok(installation) => installation,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let factory = ChromiumFactory::new(LaunchOptions {
        executable: installation.browser_path,
        headless: config.browser.headless,
        navigation_timeout: config.crawler.navigation_timeout(),
    });
    let output = JsonOutput::new(&config.output.results_path);

    // Run the crawler
    let report = match crawl(config, factory, schema).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    output.write_records(&report.records)?;
    tracing::info!("Results written to {}", output.destination());

    print_statistics(&report.statistics);
    println!(
        "Execution time: {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
