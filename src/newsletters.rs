//! Newsletter list loading.
//!
//! Reads the subscription export CSV:
//!
//! ```text
//! Newsletter Name,Website URL,Category,Author,Handle
//! Lenny's Newsletter,https://www.lennysnewsletter.com,Product,,
//! The Pragmatic Engineer,newsletter.pragmaticengineer.com,Tech,Gergely,gergelyorosz
//! ```
//!
//! `Category`, `Author` and `Handle` are optional. The feed URL is derived
//! from the website URL (`<site>/feed`). Rows repeating an existing
//! `(name, author)` pair are dropped.

use crate::models::{DEFAULT_CATEGORY, Newsletter};
use itertools::Itertools;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct NewsletterRow {
    #[serde(rename = "Newsletter Name")]
    name: String,
    #[serde(rename = "Website URL")]
    url: String,
    #[serde(rename = "Category", default)]
    category: Option<String>,
    #[serde(rename = "Author", default)]
    author: Option<String>,
    #[serde(rename = "Handle", default)]
    handle: Option<String>,
}

/// Load newsletters from a CSV file on disk.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_newsletters(path: impl AsRef<Path>) -> Result<Vec<Newsletter>, Box<dyn Error>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(format!("newsletter list {} not found", path.display()).into());
    }
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let newsletters = parse_newsletters(reader)?;
    info!(count = newsletters.len(), "Loaded newsletters");
    Ok(newsletters)
}

/// Parse newsletters from any CSV reader.
pub fn parse_newsletters<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<Newsletter>, Box<dyn Error>> {
    let mut newsletters = Vec::new();
    for (line, row) in reader.deserialize::<NewsletterRow>().enumerate() {
        let row = row?;
        match newsletter_from_row(row) {
            Some(n) => newsletters.push(n),
            None => warn!(row = line + 1, "Skipping newsletter row with unusable URL"),
        }
    }

    let before = newsletters.len();
    let newsletters: Vec<Newsletter> = newsletters
        .into_iter()
        .unique_by(|n| (n.name.clone(), n.author_filter.clone()))
        .collect();
    if newsletters.len() < before {
        debug!(dropped = before - newsletters.len(), "Dropped duplicate newsletter entries");
    }
    Ok(newsletters)
}

fn newsletter_from_row(row: NewsletterRow) -> Option<Newsletter> {
    let name = row.name.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let (url, rss_url) = feed_urls(&row.url)?;
    Some(Newsletter {
        name,
        url,
        rss_url,
        category: non_empty(row.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        author_filter: non_empty(row.author),
        handle: non_empty(row.handle).map(|h| h.trim_start_matches('@').to_string()),
    })
}

/// Website URL and its RSS feed URL.
///
/// Adds `https://` when the scheme is missing. URLs that already point at a
/// feed are used as-is.
pub fn feed_urls(website: &str) -> Option<(String, String)> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }
    let with_scheme = if website.starts_with("http://") || website.starts_with("https://") {
        website.to_string()
    } else {
        format!("https://{website}")
    };
    let parsed = Url::parse(&with_scheme).ok()?;
    parsed.host_str()?;

    let base = with_scheme.trim_end_matches('/').to_string();
    let path = parsed.path().trim_end_matches('/');
    let rss = if path.ends_with("/feed") || path.ends_with(".xml") || path.ends_with(".rss") {
        base.clone()
    } else {
        format!("{base}/feed")
    };
    Some((base, rss))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
