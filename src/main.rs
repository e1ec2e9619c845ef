// src/main.rs
mod extractors;
mod myneta;
mod scrape;
mod storage;
mod utils;

use clap::{ArgGroup, Parser};
use extractors::SectionPatterns;
use myneta::{models::DEFAULT_BASE_URL, MynetaClient, Site};
use scrape::{Scope, ScrapeOptions, Scraper};
use std::path::PathBuf;
use std::time::Duration;
use storage::{RunSummary, StorageManager};
use utils::error::ConfigError;
use utils::AppError;

/// Environment override for the election-cycle root.
const BASE_URL_ENV: &str = "MYNETA_BASE_URL";

/// Command Line Interface for the MyNeta candidate disclosure extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("scope")
        .required(true)
        .args(["candidate_id", "constituency_id", "state_id", "all"])
))]
struct Args {
    /// Single candidate ID (e.g. 6163)
    #[arg(long)]
    candidate_id: Option<u32>,

    /// All candidates in one constituency (e.g. 22 for KADAPA)
    #[arg(long)]
    constituency_id: Option<u32>,

    /// All candidates in one state (e.g. 2 for Andhra Pradesh)
    #[arg(long)]
    state_id: Option<u32>,

    /// All candidates across the whole election
    #[arg(long)]
    all: bool,

    /// Output directory for extracted records
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// CSV file name inside the output directory
    #[arg(long, default_value = "output_candidates.csv")]
    output_csv: String,

    /// JSON file name inside the output directory
    #[arg(long, default_value = "output_candidates.json")]
    output_json: String,

    /// Delay between requests in seconds
    #[arg(long, default_value_t = 1.5)]
    delay: f64,

    /// Election-cycle root URL (falls back to $MYNETA_BASE_URL, then LokSabha2024)
    #[arg(long)]
    base_url: Option<String>,

    /// JSON file overriding the section heading patterns
    #[arg(long)]
    section_patterns: Option<PathBuf>,

    /// Debug mode - save raw and annotated candidate pages
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn scope(&self) -> Scope {
        if let Some(id) = self.candidate_id {
            Scope::Candidate(id)
        } else if let Some(id) = self.constituency_id {
            Scope::Constituency(id)
        } else if let Some(id) = self.state_id {
            Scope::State(id)
        } else {
            Scope::All
        }
    }

    fn delay(&self) -> Result<Duration, ConfigError> {
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "delay",
                reason: format!("{} is not a non-negative number of seconds", self.delay),
            });
        }
        Ok(Duration::from_secs_f64(self.delay))
    }

    fn base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    fn section_patterns(&self) -> Result<SectionPatterns, ConfigError> {
        match &self.section_patterns {
            Some(path) => SectionPatterns::from_json_file(path),
            None => Ok(SectionPatterns::default()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Resolve configuration
    let scope = args.scope();
    let delay = args.delay()?;
    let patterns = args.section_patterns()?;
    let site = Site::new(&args.base_url());
    tracing::debug!("Using site root {} and delay {:?}", site.base_url(), delay);

    // 4. Initialize storage and client
    let storage = StorageManager::new(&args.output_dir)?;
    let client = MynetaClient::new(site)?;

    // 5. Scrape
    let options = ScrapeOptions {
        delay,
        debug_dir: args.debug.then(|| storage.base_dir().join("debug")),
    };
    let outcomes = Scraper::new(&client, &patterns, options).run(scope).await;

    // 6. Persist and report
    let summary = RunSummary::from_outcomes(&scope.to_string(), &outcomes);
    storage.save_all(&outcomes, &summary, &args.output_json, &args.output_csv)?;
    summary.log();

    if !outcomes.is_empty() && summary.failures == outcomes.len() {
        return Err(AppError::Processing(format!(
            "Failed to download any of {} candidate pages",
            outcomes.len()
        )));
    }

    Ok(())
}
