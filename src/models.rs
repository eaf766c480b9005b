//! Data models for newsletters, fetched articles, and their scored forms.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Newsletter`]: A subscribed source loaded from the newsletter list
//! - [`Article`]: A fetched article with its engagement counts
//! - [`ScoredArticle`]: An article after the scoring engine has ranked it
//! - [`SelectionResult`]: The featured / wildcard / categorized partition
//!
//! Articles are plain values. The scoring engine wraps them into
//! [`ScoredArticle`] so a score can never be read before it was computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category used when the newsletter list leaves the column empty.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A subscribed newsletter.
///
/// The same newsletter may appear several times with different
/// `author_filter` values; each `(name, author_filter)` pair is its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    /// Display name of the newsletter.
    pub name: String,
    /// Website URL as given in the newsletter list.
    pub url: String,
    /// RSS feed derived from `url`.
    pub rss_url: String,
    /// Category label used to group articles in the digest.
    pub category: String,
    /// Optional case-insensitive partial match on the article byline.
    pub author_filter: Option<String>,
    /// Optional display handle of the writer.
    pub handle: Option<String>,
}

impl Newsletter {
    /// The part of the newsletter that every article carries with it.
    pub fn reference(&self) -> NewsletterRef {
        NewsletterRef {
            name: self.name.clone(),
            category: self.category.clone(),
            url: self.url.clone(),
        }
    }

    /// Returns `true` when `authors` satisfies this entry's author filter.
    ///
    /// Entries without a filter accept everything.
    pub fn accepts_authors(&self, authors: &[String]) -> bool {
        match self.author_filter.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(filter) => {
                let filter = filter.to_lowercase();
                authors.iter().any(|a| a.to_lowercase().contains(&filter))
            }
        }
    }
}

/// Newsletter identity attached to an [`Article`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewsletterRef {
    pub name: String,
    pub category: String,
    pub url: String,
}

/// A fetched article.
///
/// Counts default to zero when the source does not expose them. `authors`
/// is never empty; see [`Article::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Plain-text teaser, already stripped of markup.
    pub summary: String,
    pub published: DateTime<Utc>,
    pub authors: Vec<String>,
    pub newsletter: NewsletterRef,
    pub word_count: u64,
    pub reaction_count: u64,
    pub comment_count: u64,
    pub restack_count: u64,
}

impl Article {
    /// Build an article with zeroed engagement counts.
    ///
    /// Blank author names are dropped. When nothing remains, the author list
    /// becomes the sentinel from [`unknown_author`], scoped to the newsletter so
    /// bylines missing from two unrelated sources never count as the same person.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published: DateTime<Utc>,
        authors: Vec<String>,
        newsletter: NewsletterRef,
    ) -> Self {
        let authors = normalize_authors(authors, &newsletter.name);
        Self {
            title: title.into(),
            link: link.into(),
            summary: String::new(),
            published,
            authors,
            newsletter,
            word_count: 0,
            reaction_count: 0,
            comment_count: 0,
            restack_count: 0,
        }
    }

    /// Identity used for duplicate removal: title, author set, newsletter name.
    pub fn dedupe_key(&self) -> (String, Vec<String>, String) {
        let mut authors = self.authors.clone();
        authors.sort();
        authors.dedup();
        (self.title.clone(), authors, self.newsletter.name.clone())
    }

    /// Returns `true` when the two articles share at least one author.
    pub fn shares_author_with(&self, other: &Article) -> bool {
        self.authors.iter().any(|a| other.authors.contains(a))
    }

    /// Whole days between publication and `now`, never negative.
    pub fn days_ago(&self, now: DateTime<Utc>) -> i64 {
        (now - self.published).num_days().max(0)
    }
}

/// Sentinel author name for a newsletter without bylines.
pub fn unknown_author(newsletter_name: &str) -> String {
    format!("Unknown ({newsletter_name})")
}

fn normalize_authors(authors: Vec<String>, newsletter_name: &str) -> Vec<String> {
    let authors: Vec<String> = authors
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if authors.is_empty() {
        vec![unknown_author(newsletter_name)]
    } else {
        authors
    }
}

/// An article together with the scores assigned by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    /// Unbounded engagement + length composite. Ranking key.
    pub raw_score: f64,
    /// Display score: `[1, 100]` when normalized, capped raw score otherwise.
    pub score: f64,
}

/// How engagement is weighed against article age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Total engagement, regardless of age.
    #[default]
    Standard,
    /// Engagement divided by age in days.
    DailyAverage,
}

impl ScoringMode {
    /// Human readable label used in logs and the digest header.
    pub fn label(&self) -> &'static str {
        match self {
            ScoringMode::Standard => "Standard",
            ScoringMode::DailyAverage => "Daily Average",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Three-way partition produced by the selection engine.
///
/// No article appears in more than one bucket. Categories iterate in
/// lexicographic order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionResult {
    pub featured: Vec<ScoredArticle>,
    pub wildcards: Vec<ScoredArticle>,
    pub categorized: BTreeMap<String, Vec<ScoredArticle>>,
}

impl SelectionResult {
    /// Number of articles across all buckets.
    pub fn total(&self) -> usize {
        self.featured.len()
            + self.wildcards.len()
            + self.categorized.values().map(Vec::len).sum::<usize>()
    }
}
