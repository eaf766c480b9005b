//! HTML digest rendering.
//!
//! Produces a single self-contained `<div>` with inline styles so the result
//! can be pasted straight into a newsletter editor. Sections, in order:
//!
//! 1. Header with date, counts and scoring description
//! 2. Featured articles, numbered
//! 3. Wildcard picks
//! 4. One section per category, alphabetical, capped at `category_limit` entries

use crate::models::{ScoredArticle, ScoringMode, SelectionResult};
use crate::utils::thousands;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const SANS: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif";
const SECTION_STYLE: &str = "font-size: 24px; font-weight: 700; color: #1a1a1a; margin: 40px 0 20px 0; padding-bottom: 8px; border-bottom: 1px solid #eee;";
const META_STYLE: &str = "font-size: 13px; color: #666; line-height: 1.6;";

/// Run-level facts shown in the digest header.
#[derive(Debug, Clone)]
pub struct DigestMeta {
    pub generated_at: DateTime<Utc>,
    pub scoring_mode: ScoringMode,
    pub days_back: i64,
    pub newsletter_count: usize,
    pub category_limit: usize,
}

/// Render the full digest.
pub fn render_digest(selection: &SelectionResult, meta: &DigestMeta) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<div style="font-family: Georgia, serif; max-width: 700px; margin: 0 auto; line-height: 1.7; color: #1a1a1a;">"#,
    );
    html.push('\n');

    render_header(&mut html, selection, meta);

    if !selection.featured.is_empty() {
        section_heading(&mut html, "Featured Articles");
        for (i, article) in selection.featured.iter().enumerate() {
            render_featured(&mut html, article, &format!("{}. ", i + 1), meta.generated_at);
        }
    }

    if !selection.wildcards.is_empty() {
        let heading = if selection.wildcards.len() == 1 {
            "Wildcard Pick"
        } else {
            "Wildcard Picks"
        };
        section_heading(&mut html, heading);
        for article in &selection.wildcards {
            render_featured(&mut html, article, "🎲 ", meta.generated_at);
        }
    }

    for (category, articles) in &selection.categorized {
        if articles.is_empty() {
            continue;
        }
        section_heading(&mut html, category);
        for article in articles.iter().take(meta.category_limit) {
            render_compact(&mut html, article, meta.generated_at);
        }
    }

    html.push_str("</div>\n");
    html
}

fn render_header(html: &mut String, selection: &SelectionResult, meta: &DigestMeta) {
    let _ = write!(
        html,
        r#"<div style="text-align: center; padding: 40px 20px; margin-bottom: 40px;">
<h1 style="font-size: 36px; font-weight: 700; color: #1a1a1a; margin: 0 0 10px 0; font-family: {SANS};">Newsletter Digest</h1>
<div style="font-size: 16px; color: #666; margin-bottom: 8px;">{date}</div>
<div style="font-size: 14px; color: #666; margin-bottom: 8px;">{featured} Featured • {total} Total Articles</div>
<div style="font-size: 13px; color: #888; font-style: italic;">{label} scoring (engagement + length) • {days} day lookback • {newsletters} newsletters</div>
</div>
"#,
        date = meta.generated_at.format("%A, %B %d, %Y"),
        featured = selection.featured.len(),
        total = selection.total(),
        label = meta.scoring_mode.label(),
        days = meta.days_back,
        newsletters = meta.newsletter_count,
    );
}

fn section_heading(html: &mut String, title: &str) {
    let _ = writeln!(
        html,
        r#"<h2 style="{SECTION_STYLE} font-family: {SANS};">{}</h2>"#,
        encode_text(title)
    );
}

fn render_featured(html: &mut String, scored: &ScoredArticle, prefix: &str, now: DateTime<Utc>) {
    let article = &scored.article;
    let _ = writeln!(
        html,
        r#"<div style="margin-bottom: 40px;">
<div style="font-size: 22px; font-weight: 700; line-height: 1.3; margin-bottom: 8px; font-family: {SANS};">
<a href="{href}" style="color: #1a1a1a; text-decoration: none;">{prefix}{title}</a>
</div>
{meta}"#,
        href = encode_double_quoted_attribute(&article.link),
        title = encode_text(&article.title),
        meta = meta_block(scored, now),
    );
    if !article.summary.is_empty() {
        let _ = writeln!(
            html,
            r#"<div style="font-size: 17px; line-height: 1.7; color: #1a1a1a; margin-top: 12px;">{}</div>"#,
            encode_text(&article.summary)
        );
    }
    html.push_str("</div>\n");
}

fn render_compact(html: &mut String, scored: &ScoredArticle, now: DateTime<Utc>) {
    let article = &scored.article;
    let _ = writeln!(
        html,
        r#"<div style="padding: 15px 0;">
<div style="font-size: 18px; font-weight: 600; line-height: 1.4; margin-bottom: 5px;">
<a href="{href}" style="color: #1a1a1a; text-decoration: none;">{title}</a>
</div>
{meta}</div>"#,
        href = encode_double_quoted_attribute(&article.link),
        title = encode_text(&article.title),
        meta = meta_block(scored, now),
    );
}

/// Byline, engagement and score lines shared by both article layouts.
fn meta_block(scored: &ScoredArticle, now: DateTime<Utc>) -> String {
    let article = &scored.article;
    let mut out = format!(r#"<div style="{META_STYLE}">"#);

    let byline = format!(
        "{} • by {} • {}d ago",
        article.newsletter.name,
        article.authors.join(" & "),
        article.days_ago(now)
    );
    let _ = write!(out, "<div>{}</div>", encode_text(&byline));

    let mut metrics = Vec::new();
    if article.comment_count > 0 {
        metrics.push(format!("{} comments", thousands(article.comment_count)));
    }
    if article.reaction_count > 0 {
        metrics.push(format!("{} likes", thousands(article.reaction_count)));
    }
    if article.restack_count > 0 {
        metrics.push(format!("{} restacks", thousands(article.restack_count)));
    }
    if !metrics.is_empty() {
        let _ = write!(out, "<div>{}</div>", metrics.join(" • "));
    }

    let mut score_line = format!("Score: {:.1}", scored.score);
    if article.word_count > 0 {
        let _ = write!(score_line, " • {} words", thousands(article.word_count));
    }
    let _ = write!(out, "<div>{score_line}</div>");
    out.push_str("</div>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, NewsletterRef};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn scored(title: &str, category: &str, score: f64) -> ScoredArticle {
        let mut article = Article::new(
            title,
            format!("https://x.substack.com/p/{}?a=1&b=2", title.len()),
            now() - Duration::days(3),
            vec!["Ann".to_string(), "Bob".to_string()],
            NewsletterRef {
                name: "X Letter".to_string(),
                category: category.to_string(),
                url: "https://x.substack.com".to_string(),
            },
        );
        article.comment_count = 4;
        article.reaction_count = 1500;
        article.word_count = 2300;
        article.summary = "A teaser".to_string();
        ScoredArticle {
            article,
            raw_score: score,
            score,
        }
    }

    fn meta() -> DigestMeta {
        DigestMeta {
            generated_at: now(),
            scoring_mode: ScoringMode::DailyAverage,
            days_back: 7,
            newsletter_count: 12,
            category_limit: 2,
        }
    }

    fn selection() -> SelectionResult {
        let mut categorized = BTreeMap::new();
        categorized.insert(
            "Zeta".to_string(),
            vec![scored("z1", "Zeta", 10.0), scored("z2", "Zeta", 9.0), scored("z3", "Zeta", 8.0)],
        );
        categorized.insert("Alpha".to_string(), vec![scored("a1", "Alpha", 20.0)]);
        SelectionResult {
            featured: vec![scored("Tom & Jerry <3", "Tech", 100.0)],
            wildcards: vec![scored("wild", "Tech", 40.0)],
            categorized,
        }
    }

    #[test]
    fn test_header_counts_and_label() {
        let html = render_digest(&selection(), &meta());
        assert!(html.contains("Saturday, May 10, 2025"));
        assert!(html.contains("1 Featured • 6 Total Articles"));
        assert!(html.contains("Daily Average scoring"));
        assert!(html.contains("7 day lookback • 12 newsletters"));
    }

    #[test]
    fn test_text_and_links_are_escaped() {
        let html = render_digest(&selection(), &meta());
        assert!(html.contains("1. Tom &amp; Jerry &lt;3"));
        assert!(html.contains("?a=1&amp;b=2"));
        assert!(!html.contains("<3"));
    }

    #[test]
    fn test_sections_in_order() {
        let html = render_digest(&selection(), &meta());
        let featured = html.find("Featured Articles").unwrap();
        let wildcard = html.find("Wildcard Pick").unwrap();
        let alpha = html.find(">Alpha</h2>").unwrap();
        let zeta = html.find(">Zeta</h2>").unwrap();
        assert!(featured < wildcard && wildcard < alpha && alpha < zeta);
        assert!(html.contains("🎲 wild"));
    }

    #[test]
    fn test_category_limit() {
        let html = render_digest(&selection(), &meta());
        assert!(html.contains(">z2</a>"));
        assert!(!html.contains(">z3</a>"));
    }

    #[test]
    fn test_meta_lines() {
        let html = render_digest(&selection(), &meta());
        assert!(html.contains("X Letter • by Ann &amp; Bob • 3d ago"));
        assert!(html.contains("4 comments • 1,500 likes"));
        assert!(html.contains("Score: 100.0 • 2,300 words"));
    }

    #[test]
    fn test_empty_selection_renders_header_only() {
        let html = render_digest(&SelectionResult::default(), &meta());
        assert!(html.contains("0 Featured • 0 Total Articles"));
        assert!(!html.contains("Featured Articles"));
        assert!(!html.contains("<h2"));
    }
}
