//! # Newsletter Digest
//!
//! Builds a static HTML digest from a list of subscribed newsletters.
//!
//! ## Usage
//!
//! ```sh
//! newsletter_digest -n my_newsletters.csv -o digest.html --archive articles.csv
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Loading**: Read the newsletter list (or a previous article archive)
//! 2. **Fetching**: Download each feed and every recent article's engagement counts
//! 3. **Scoring**: Rank articles by weighted engagement plus length
//! 4. **Selection**: Split into featured, wildcard and per-category sections
//! 5. **Output**: Write the HTML digest, plus optional CSV archive and JSON

use chrono::Utc;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod archive;
mod cli;
mod config;
mod fetch;
mod models;
mod newsletters;
mod outputs;
mod scoring;
mod selection;
mod utils;

use cli::Cli;
use config::DigestConfig;
use fetch::{Fetcher, HttpFetcher, RetryFetch};
use outputs::html::{DigestMeta, render_digest};
use scoring::ScoringEngine;
use selection::SelectionEngine;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsletter_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => DigestConfig::load(path).await?,
        None => DigestConfig::default(),
    }
    .apply_cli(&args);
    info!(
        days_back = config.days_back,
        featured = config.featured_count,
        wildcards = config.wildcard_count,
        scoring = %config.scoring_mode,
        normalize = config.normalize,
        "Digest configuration"
    );

    // Early check: ensure the HTML output location is writable
    let output_dir = Path::new(&args.output).parent().unwrap_or(Path::new(""));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %args.output,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let now = Utc::now();

    // ---- Load or fetch articles ----
    let (articles, newsletter_count) = match &args.from_archive {
        Some(path) => {
            let articles = archive::read_articles(path)?;
            let sources = articles
                .iter()
                .map(|a| a.newsletter.name.as_str())
                .collect::<std::collections::HashSet<_>>()
                .len();
            info!(count = articles.len(), sources, "Re-scoring archived articles");
            (articles, sources)
        }
        None => {
            let newsletters = newsletters::load_newsletters(&args.newsletters)?;
            let http = HttpFetcher::new(
                &config.user_agent,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            let client = RetryFetch::new(
                http,
                config.max_retries,
                Duration::from_millis(config.retry_base_delay_ms),
            );
            let report = Fetcher::new(client)
                .fetch_all(&newsletters, config.days_back, now)
                .await;
            (report.articles, newsletters.len())
        }
    };

    if articles.is_empty() {
        warn!(days_back = config.days_back, "No articles found; try increasing the lookback period");
    }

    // ---- Score ----
    let scored = ScoringEngine::new(config.weights).score(
        articles,
        config.scoring_mode,
        config.normalize,
        now,
    );

    if let Some(path) = &args.archive {
        if let Err(e) = archive::write_scored(path, &scored) {
            error!(path = %path, error = %e, "Failed to write article archive");
        }
    }

    // ---- Select ----
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let selection = SelectionEngine::new(config.wildcard_pool_factor).select(
        scored,
        config.featured_count,
        config.wildcard_count,
        &mut rng,
    );

    // ---- Render ----
    let meta = DigestMeta {
        generated_at: now,
        scoring_mode: config.scoring_mode,
        days_back: config.days_back,
        newsletter_count,
        category_limit: config.category_limit,
    };
    let html = render_digest(&selection, &meta);
    tokio::fs::write(&args.output, html).await?;
    info!(path = %args.output, articles = selection.total(), "Wrote digest HTML");

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = outputs::json::write_selection(&selection, dir, now.date_naive()).await {
            error!(error = %e, "Failed to write selection JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
