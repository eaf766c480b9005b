//! RSS 2.0 feed parsing.
//!
//! Substack-style feeds carry the byline in `dc:creator` and the full post
//! body in `content:encoded`; plain feeds fall back to `author` and
//! `description`.

use crate::models::{Article, Newsletter};
use crate::utils::{clean_summary, word_count};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:creator", alias = "creator", default)]
    creators: Vec<String>,
    #[serde(default)]
    author: Vec<String>,
    #[serde(rename = "content:encoded", alias = "encoded")]
    content: Option<String>,
    description: Option<String>,
}

/// Parse a feed body into articles published at or after `cutoff`.
///
/// Items without a parseable date or older than the cutoff are skipped, as
/// are items whose byline does not satisfy the newsletter's author filter.
#[instrument(level = "debug", skip_all, fields(newsletter = %newsletter.name))]
pub fn parse_feed(
    xml: &str,
    newsletter: &Newsletter,
    cutoff: DateTime<Utc>,
) -> Result<Vec<Article>, Box<dyn Error>> {
    let xml = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml)?;
    let total = rss.channel.items.len();

    let mut out = Vec::with_capacity(total);
    for item in rss.channel.items {
        let Some(published) = item.pub_date.as_deref().and_then(parse_date) else {
            continue;
        };
        if published < cutoff {
            continue;
        }

        let authors: Vec<String> = if item.creators.is_empty() {
            item.author
        } else {
            item.creators
        };
        let authors: Vec<String> = authors
            .iter()
            .flat_map(|a| split_byline(a))
            .collect();
        if !newsletter.accepts_authors(&authors) {
            continue;
        }

        let body = item
            .content
            .as_deref()
            .or(item.description.as_deref())
            .unwrap_or_default();
        let mut article = Article::new(
            item.title.unwrap_or_default().trim(),
            item.link.unwrap_or_default().trim(),
            published,
            authors,
            newsletter.reference(),
        );
        article.word_count = word_count(body);
        article.summary = clean_summary(item.description.as_deref().unwrap_or_default());
        out.push(article);
    }

    debug!(total, kept = out.len(), "Parsed feed");
    Ok(out)
}

/// Parse an RSS (RFC 2822) or Atom-style (RFC 3339) timestamp.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Split a combined byline like `"Ann Lee and Bob Roy"` into names.
fn split_byline(byline: &str) -> Vec<String> {
    byline
        .split([',', '&'])
        .flat_map(|part| part.split(" and "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
