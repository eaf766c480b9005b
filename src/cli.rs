//! Command-line interface definitions for the newsletter digest.
//!
//! Flags override values from the YAML configuration file. Paths can also
//! be supplied through environment variables.

use crate::models::ScoringMode;
use clap::Parser;

/// Command-line arguments for the digest generator.
///
/// # Examples
///
/// ```sh
/// # Fetch, score and render with defaults
/// newsletter_digest -n my_newsletters.csv -o digest.html
///
/// # Favor recent posts, three featured, two wildcards, reproducible picks
/// newsletter_digest -n my_newsletters.csv --scoring daily-average --featured 3 --wildcards 2 --seed 42
///
/// # Re-score a previous run without fetching
/// newsletter_digest --from-archive articles.csv -o digest.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// CSV file listing the subscribed newsletters
    #[arg(short, long, default_value = "my_newsletters.csv")]
    pub newsletters: String,

    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "DIGEST_CONFIG")]
    pub config: Option<String>,

    /// Output path for the HTML digest
    #[arg(short, long, default_value = "digest_output.html")]
    pub output: String,

    /// Write the scored articles to this CSV file for later re-runs
    #[arg(long)]
    pub archive: Option<String>,

    /// Skip fetching and re-score articles from a previously written archive
    #[arg(long)]
    pub from_archive: Option<String>,

    /// Also write the selection as JSON into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Lookback window in days
    #[arg(long)]
    pub days_back: Option<i64>,

    /// Number of featured articles
    #[arg(long)]
    pub featured: Option<usize>,

    /// Number of wildcard picks
    #[arg(long)]
    pub wildcards: Option<usize>,

    /// Scoring model
    #[arg(long, value_enum)]
    pub scoring: Option<ScoringMode>,

    /// Show capped raw scores instead of the 1-100 scale
    #[arg(long)]
    pub no_normalize: bool,

    /// Seed for wildcard sampling (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}
