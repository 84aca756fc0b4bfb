//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the Catalog-Harvest storefront crawler.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, validate_category, Config};
use catalog_harvest::crawler::{listing_url, Harvester};
use catalog_harvest::output::{print_statistics, write_json, CrawlStatistics};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: a storefront catalog crawler
///
/// Catalog-Harvest walks the listing pages of each configured category,
/// decodes the swatch configuration embedded in every product page, and
/// resolves each color/size variant through the store's lookup endpoint.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A storefront catalog crawler", long_about = None)]
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

    /// Crawl only this category instead of the configured list (repeatable)
    #[arg(short, long = "category", value_name = "NAME")]
    categories: Vec<String>,

    /// Write the JSON document here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if !cli.categories.is_empty() {
        for category in &cli.categories {
            validate_category(category)?;
        }
        config.categories = cli.categories.clone();
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.path));

    if cli.dry_run {
        handle_dry_run(&config, &output_path)?;
    } else {
        handle_harvest(config, &output_path).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and first listing URLs
fn handle_dry_run(config: &Config, output_path: &std::path::Path) -> anyhow::Result<()> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Store: {}", config.store);

    println!("\nSite:");
    println!("  Listing base: {}", config.site.listing_base_url);
    println!("  Lookup endpoint: {}", config.site.lookup_url);
    println!("  Page size: {}", config.site.page_size);
    println!(
        "  Attribute ids: color={} size={}",
        config.site.color_attribute_id, config.site.size_attribute_id
    );
    match config.site.max_pages {
        Some(max) => println!("  Max pages per category: {}", max),
        None => println!("  Max pages per category: unbounded"),
    }

    println!("\nClient:");
    println!("  User agent: {}", config.client.user_agent);
    println!(
        "  Concurrency: {} products, {} variants",
        config.client.max_concurrent_products, config.client.max_concurrent_variants
    );
    println!(
        "  Fixed headers: {} page, {} lookup",
        config.headers.page.len(),
        config.headers.lookup.len()
    );

    println!("\nCategories ({}):", config.categories.len());
    for category in &config.categories {
        let url = listing_url(&config.site.listing_base_url, category, 1)?;
        println!("  - {} ({})", category, url);
    }

    println!("\nOutput: {}", output_path.display());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, output_path: &std::path::Path) -> anyhow::Result<()> {
    let pretty = config.output.pretty;

    tracing::info!(
        "Store: {}, categories: {}",
        config.store,
        config.categories.join(", ")
    );

    let harvester = Harvester::new(config).context("failed to set up the crawler")?;
    let result = harvester.run().await;

    print_statistics(&CrawlStatistics::from_result(&result));

    write_json(&result, output_path, pretty)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    tracing::info!("Scraped data saved to {}", output_path.display());

    Ok(())
}
