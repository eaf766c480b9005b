//! CSV archive of scored articles.
//!
//! A run can write every scored article to CSV. A later run can read that
//! file back with `--from-archive` and re-score or re-render without
//! touching the network. Stored scores are informational only; they are
//! always recomputed on import.

use crate::models::{Article, NewsletterRef, ScoredArticle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument, warn};

const AUTHOR_SEPARATOR: &str = "; ";

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveRecord {
    title: String,
    link: String,
    published: DateTime<Utc>,
    authors: String,
    newsletter_name: String,
    newsletter_category: String,
    newsletter_url: String,
    word_count: Option<i64>,
    reaction_count: Option<i64>,
    comment_count: Option<i64>,
    restack_count: Option<i64>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    raw_score: Option<f64>,
    #[serde(default)]
    score: Option<f64>,
}

impl From<&ScoredArticle> for ArchiveRecord {
    fn from(s: &ScoredArticle) -> Self {
        let a = &s.article;
        Self {
            title: a.title.clone(),
            link: a.link.clone(),
            published: a.published,
            authors: a.authors.join(AUTHOR_SEPARATOR),
            newsletter_name: a.newsletter.name.clone(),
            newsletter_category: a.newsletter.category.clone(),
            newsletter_url: a.newsletter.url.clone(),
            word_count: Some(a.word_count as i64),
            reaction_count: Some(a.reaction_count as i64),
            comment_count: Some(a.comment_count as i64),
            restack_count: Some(a.restack_count as i64),
            summary: a.summary.clone(),
            raw_score: Some(s.raw_score),
            score: Some(s.score),
        }
    }
}

impl From<ArchiveRecord> for Article {
    fn from(r: ArchiveRecord) -> Self {
        let authors = r
            .authors
            .split(AUTHOR_SEPARATOR.trim())
            .map(str::to_string)
            .collect();
        let newsletter = NewsletterRef {
            name: r.newsletter_name,
            category: r.newsletter_category,
            url: r.newsletter_url,
        };
        let mut article = Article::new(r.title, r.link, r.published, authors, newsletter);
        article.summary = r.summary;
        article.word_count = count(r.word_count);
        article.reaction_count = count(r.reaction_count);
        article.comment_count = count(r.comment_count);
        article.restack_count = count(r.restack_count);
        article
    }
}

fn count(value: Option<i64>) -> u64 {
    value.map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Write scored articles to `path`, one row each, in the given order.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), count = articles.len()))]
pub fn write_scored(path: impl AsRef<Path>, articles: &[ScoredArticle]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for article in articles {
        writer.serialize(ArchiveRecord::from(article))?;
    }
    writer.flush()?;
    info!("Wrote article archive");
    Ok(())
}

/// Read articles back from an archive written by [`write_scored`].
///
/// Rows that fail to parse are skipped with a warning.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_articles(path: impl AsRef<Path>) -> Result<Vec<Article>, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_path(path.as_ref())?;
    let mut articles = Vec::new();
    for (line, record) in reader.deserialize::<ArchiveRecord>().enumerate() {
        match record {
            Ok(record) => articles.push(Article::from(record)),
            Err(e) => warn!(row = line + 1, error = %e, "Skipping unreadable archive row"),
        }
    }
    info!(count = articles.len(), "Read article archive");
    Ok(articles)
}
