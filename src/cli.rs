//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::analysis::{self, ListingFilter, Summary};
use crate::models::PropertyType;
use crate::scrapers::{HttpFetcher, OtthonterkepScraper, PageFetcher, ScrapeParams};
use crate::storage::{ListingStore, SqliteStore};

#[derive(Parser)]
#[command(name = "estate-scout")]
#[command(about = "Hungarian property listing scraper and market report")]
#[command(version)]
pub struct Cli {
    /// SQLite database holding the latest scrape
    #[arg(long, global = true, env = "ESTATE_SCOUT_DB", default_value = "real_estate.db")]
    pub db: PathBuf,

    /// CSV file of known city names
    #[arg(long, global = true, env = "ESTATE_SCOUT_CITIES", default_value = "turabazis.csv")]
    pub cities: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape all listings and replace the stored dataset
    Scrape {
        /// Pages fetched at once (1 = sequential)
        #[arg(short, long, env = "ESTATE_SCOUT_CONCURRENCY", default_value = "1")]
        concurrency: usize,
        /// Per-request timeout in seconds
        #[arg(long, env = "ESTATE_SCOUT_TIMEOUT", default_value = "10")]
        timeout: u64,
        /// Stop after this many pages
        #[arg(long, default_value = "500")]
        max_pages: u32,
        /// How pages are retrieved
        #[arg(long, value_enum, default_value = "http")]
        fetcher: FetcherKind,
        /// Also write the scraped records to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Do not touch the database
        #[arg(long)]
        no_store: bool,
    },

    /// Summarize the stored listings
    Report {
        /// City to report on (defaults to Debrecen, or the first city stored)
        #[arg(long)]
        city: Option<String>,
        /// Property types to include (repeatable; default: either)
        #[arg(long = "type")]
        types: Vec<PropertyType>,
        /// Lowest price in Forint
        #[arg(long)]
        min_price: Option<Decimal>,
        /// Highest price in Forint
        #[arg(long)]
        max_price: Option<Decimal>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FetcherKind {
    Http,
    Browser,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            concurrency,
            timeout,
            max_pages,
            fetcher,
            json,
            no_store,
        } => {
            let params = ScrapeParams {
                concurrency,
                timeout: Duration::from_secs(timeout),
                max_pages,
                cities_path: cli.cities,
                ..ScrapeParams::default()
            };
            cmd_scrape(params, fetcher, &cli.db, json, no_store).await
        }
        Commands::Report {
            city,
            types,
            min_price,
            max_price,
            json,
        } => {
            let filter = ListingFilter {
                city,
                types,
                min_price,
                max_price,
            };
            cmd_report(&cli.db, filter, json)
        }
    }
}

fn build_fetcher(kind: FetcherKind, params: &ScrapeParams) -> Result<Box<dyn PageFetcher>> {
    match kind {
        FetcherKind::Http => Ok(Box::new(HttpFetcher::new(params)?)),
        #[cfg(feature = "browser")]
        FetcherKind::Browser => Ok(Box::new(crate::scrapers::BrowserFetcher::new(params)?)),
        #[cfg(not(feature = "browser"))]
        FetcherKind::Browser => bail!("estate-scout was built without the `browser` feature"),
    }
}

async fn cmd_scrape(
    params: ScrapeParams,
    fetcher: FetcherKind,
    db: &std::path::Path,
    json: Option<PathBuf>,
    no_store: bool,
) -> Result<()> {
    let fetcher = build_fetcher(fetcher, &params)?;
    let scraper = OtthonterkepScraper::new(fetcher, params)?;

    let outcome = scraper.run().await;
    if outcome.is_empty() {
        error!("No data scraped");
        bail!("no data scraped; the stored dataset was left unchanged");
    }

    println!(
        "Scraped {} listings ({} reported, {} pages, {} failed, {} discarded)",
        outcome.records.len(),
        outcome.estate_count,
        outcome.pages_planned,
        outcome.failed_pages.len(),
        outcome.discarded,
    );

    if let Some(path) = json {
        let body = serde_json::to_string_pretty(&outcome.records)?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved all listings to {}", path.display());
    }

    if !no_store {
        let mut store = SqliteStore::open(db)?;
        let written = store.replace_all(&outcome.records)?;
        println!("Stored {} listings in {}", written, db.display());
    }

    Ok(())
}

fn cmd_report(db: &std::path::Path, mut filter: ListingFilter, json: bool) -> Result<()> {
    let store = SqliteStore::open(db)?;
    let rows = analysis::clean(&store.fetch_all()?);

    if rows.is_empty() {
        println!("The database is empty. Populate it with `estate-scout scrape`.");
        return Ok(());
    }

    if filter.city.is_none() {
        filter.city = analysis::default_city(&rows).map(str::to_string);
    }
    let city = filter.city.clone().unwrap_or_default();
    let selected = filter.apply(&rows);

    let Some(summary) = Summary::compute(&selected) else {
        println!("No listings in {} match the filter.", city);
        println!("Cities with data: {}", analysis::cities(&rows).join(", "));
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&city, &summary);
    }
    Ok(())
}

fn print_summary(city: &str, summary: &Summary) {
    println!("Real estate listings in {}", city);
    println!();
    println!("  Total listings:      {}", summary.total_listings);
    println!("  Average price:       {}", format_ft(summary.average_price));
    println!("  Average size:        {} m²", summary.average_place_size);
    println!("  Average price / m²:  {}", format_ft(summary.average_price_per_sqm));

    println!();
    println!("By property type:");
    for (kind, count) in &summary.type_counts {
        let avg = summary.average_price_by_type.get(kind).copied().unwrap_or_default();
        println!("  {:<10} {:>5} listings, average {}", kind.as_str(), count, format_ft(avg));
    }

    println!();
    println!("By number of rooms:");
    for (rooms, size) in &summary.average_size_by_rooms {
        let median = summary.median_price_by_rooms.get(rooms).copied().unwrap_or_default();
        println!("  {:>2} rooms: average {} m², median {}", rooms, size, format_ft(median));
    }

    println!();
    println!("Top cities by average price:");
    for (i, (name, price)) in summary.top_cities_by_price.iter().enumerate() {
        println!("  {:>2}. {} ({})", i + 1, name, format_ft(*price));
    }
}

/// Whole Forint with space grouping, e.g. `45 900 000 Ft`
pub fn format_ft(amount: Decimal) -> String {
    let digits = amount.round().abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if amount.is_sign_negative() && !amount.round().is_zero() { "-" } else { "" };
    format!("{sign}{grouped} Ft")
}
