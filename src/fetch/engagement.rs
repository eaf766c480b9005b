//! Engagement counts scraped from an article page.
//!
//! Two sources are tried, in order:
//!
//! 1. The `interactionStatistic` meta tag: a JSON array of schema.org
//!    `InteractionCounter` objects (`LikeAction`, `CommentAction`, `ShareAction`).
//! 2. Button `aria-label`s such as `Like (12)`, `View comments (3)` and
//!    `Restack (4)`, used for any count the meta tag left at zero.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="interactionStatistic"]"#).unwrap());
static BUTTON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("button[aria-label], a[aria-label]").unwrap());

static LIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Like \((\d[\d,]*)\)").unwrap());
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^View comments \((\d[\d,]*)\)").unwrap());
static RESTACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Restack \((\d[\d,]*)\)").unwrap());

/// Counts extracted from one page. Missing values stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub reactions: u64,
    pub comments: u64,
    pub restacks: u64,
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct InteractionCounter {
    #[serde(default)]
    interactionType: String,
    #[serde(default)]
    userInteractionCount: serde_json::Value,
}

/// Parse engagement counts from an article page.
pub fn parse_engagement(html: &str) -> Engagement {
    let document = Html::parse_document(html);
    let mut engagement = Engagement::default();

    for meta in document.select(&META_SELECTOR) {
        let Some(content) = meta.value().attr("content") else {
            continue;
        };
        let Ok(counters) = serde_json::from_str::<Vec<InteractionCounter>>(content) else {
            continue;
        };
        for counter in counters {
            let count = non_negative(&counter.userInteractionCount);
            match counter.interactionType.rsplit('/').next() {
                Some("LikeAction") => engagement.reactions = count,
                Some("CommentAction") => engagement.comments = count,
                Some("ShareAction") => engagement.restacks = count,
                _ => {}
            }
        }
    }

    for element in document.select(&BUTTON_SELECTOR) {
        let Some(label) = element.value().attr("aria-label") else {
            continue;
        };
        let label = label.trim();
        if engagement.reactions == 0 {
            if let Some(n) = capture_count(&LIKE_RE, label) {
                engagement.reactions = n;
            }
        }
        if engagement.comments == 0 {
            if let Some(n) = capture_count(&COMMENT_RE, label) {
                engagement.comments = n;
            }
        }
        if engagement.restacks == 0 {
            if let Some(n) = capture_count(&RESTACK_RE, label) {
                engagement.restacks = n;
            }
        }
    }

    engagement
}

fn capture_count(re: &Regex, label: &str) -> Option<u64> {
    re.captures(label)?
        .get(1)?
        .as_str()
        .replace(',', "")
        .parse()
        .ok()
}

/// Counts may arrive as numbers or strings; negatives and junk become zero.
fn non_negative(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_tag_counts() {
        let html = r#"<html><head>
            <meta property="interactionStatistic" content='[
                {"@type":"InteractionCounter","interactionType":"https://schema.org/LikeAction","userInteractionCount":42},
                {"@type":"InteractionCounter","interactionType":"https://schema.org/CommentAction","userInteractionCount":7},
                {"@type":"InteractionCounter","interactionType":"https://schema.org/ShareAction","userInteractionCount":"3"}
            ]'>
            </head><body></body></html>"#;
        assert_eq!(
            parse_engagement(html),
            Engagement {
                reactions: 42,
                comments: 7,
                restacks: 3
            }
        );
    }

    #[test]
    fn test_aria_label_fallback() {
        let html = r#"<html><body>
            <button aria-label="Like (1,204)"></button>
            <button aria-label="View comments (18)"></button>
            <a aria-label="Restack (5)"></a>
            </body></html>"#;
        assert_eq!(
            parse_engagement(html),
            Engagement {
                reactions: 1204,
                comments: 18,
                restacks: 5
            }
        );
    }

    #[test]
    fn test_fallback_only_fills_zeros() {
        let html = r#"<html><head>
            <meta property="interactionStatistic" content='[{"interactionType":"https://schema.org/LikeAction","userInteractionCount":9}]'>
            </head><body>
            <button aria-label="Like (100)"></button>
            <button aria-label="View comments (2)"></button>
            </body></html>"#;
        let e = parse_engagement(html);
        assert_eq!(e.reactions, 9);
        assert_eq!(e.comments, 2);
    }

    #[test]
    fn test_bad_meta_and_negative_counts() {
        let html = r#"<html><head>
            <meta property="interactionStatistic" content='not json'>
            <meta property="interactionStatistic" content='[{"interactionType":"https://schema.org/CommentAction","userInteractionCount":-4}]'>
            </head><body></body></html>"#;
        assert_eq!(parse_engagement(html), Engagement::default());
    }

    #[test]
    fn test_page_without_widgets() {
        assert_eq!(parse_engagement("<p>nothing here</p>"), Engagement::default());
    }
}
