//! Article fetching from newsletter feeds.
//!
//! Each newsletter goes through the same two phases:
//!
//! 1. **Feed**: download the RSS feed and keep items inside the lookback window
//! 2. **Engagement**: download each article page and read its like, comment
//!    and restack counts
//!
//! Newsletters are processed one after another. A failing feed is logged and
//! skipped; a failing article page leaves that article's counts at zero.
//!
//! # Submodules
//!
//! - [`retry`]: the [`FetchText`] trait, HTTP implementation and backoff decorator
//! - [`rss`]: feed parsing
//! - [`engagement`]: engagement widget scraping

pub mod engagement;
pub mod retry;
pub mod rss;

use crate::models::{Article, Newsletter};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, info, instrument, warn};

pub use retry::{FetchText, HttpFetcher, RetryFetch};

/// Outcome of fetching every newsletter.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub articles: Vec<Article>,
    /// Newsletters that returned at least one recent article.
    pub productive: usize,
    /// Newsletters whose feed could not be fetched or parsed.
    pub failed: usize,
}

/// Sequential newsletter fetcher over any [`FetchText`] implementation.
#[derive(Debug)]
pub struct Fetcher<T> {
    client: T,
}

impl<T: FetchText> Fetcher<T> {
    pub fn new(client: T) -> Self {
        Self { client }
    }

    /// Fetch articles from every newsletter published within `days_back` days of `now`.
    #[instrument(level = "info", skip_all, fields(newsletters = newsletters.len(), days_back = days_back))]
    pub async fn fetch_all(
        &self,
        newsletters: &[Newsletter],
        days_back: i64,
        now: DateTime<Utc>,
    ) -> FetchReport {
        let cutoff = now - Duration::days(days_back);
        let total = newsletters.len();

        let results: Vec<(usize, Result<Vec<Article>, Box<dyn Error>>)> =
            stream::iter(newsletters.iter().enumerate())
                .then(|(i, newsletter)| async move {
                    info!(
                        index = i + 1,
                        total,
                        newsletter = %newsletter.name,
                        "Fetching newsletter"
                    );
                    (i, self.fetch_newsletter(newsletter, cutoff).await)
                })
                .collect()
                .await;

        let mut report = FetchReport::default();
        for (i, result) in results {
            let newsletter = &newsletters[i];
            match result {
                Ok(articles) if articles.is_empty() => {
                    debug!(newsletter = %newsletter.name, "No recent articles");
                }
                Ok(articles) => {
                    info!(newsletter = %newsletter.name, count = articles.len(), "Fetched articles");
                    report.productive += 1;
                    report.articles.extend(articles);
                }
                Err(e) => {
                    warn!(newsletter = %newsletter.name, url = %newsletter.rss_url, error = %e, "Feed fetch failed; skipping newsletter");
                    report.failed += 1;
                }
            }
        }

        info!(
            total_articles = report.articles.len(),
            productive = report.productive,
            failed = report.failed,
            "Finished fetching"
        );
        report
    }

    /// Fetch one newsletter's recent articles with their engagement counts.
    #[instrument(level = "info", skip_all, fields(newsletter = %newsletter.name))]
    pub async fn fetch_newsletter(
        &self,
        newsletter: &Newsletter,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        let xml = self.client.fetch_text(&newsletter.rss_url).await?;
        let mut articles = match rss::parse_feed(&xml, newsletter, cutoff) {
            Ok(articles) => articles,
            Err(e) => {
                debug!(preview = %truncate_for_log(&xml, 300), "Unparseable feed body");
                return Err(e);
            }
        };

        for article in articles.iter_mut() {
            if article.link.is_empty() {
                continue;
            }
            match self.client.fetch_text(&article.link).await {
                Ok(page) => {
                    let counts = engagement::parse_engagement(&page);
                    article.reaction_count = counts.reactions;
                    article.comment_count = counts.comments;
                    article.restack_count = counts.restacks;
                    debug!(link = %article.link, ?counts, "Parsed engagement");
                }
                Err(e) => {
                    debug!(link = %article.link, error = %e, "Engagement fetch failed; counts stay at zero");
                }
            }
        }
        Ok(articles)
    }
}
