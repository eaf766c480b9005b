//! Scoring engine.
//!
//! Blends weighted engagement with content length into an unbounded raw
//! score, then maps the population onto a 1-100 display scale. Values above
//! 100 are capped before the range is measured, so one viral post does not
//! squash everything else towards 1.
//!
//! ```text
//! engagement = likes * w_like + comments * w_comment + restacks * w_restack
//! raw_score  = engagement [/ days_old] + (words / 100) * w_length
//! score      = (min(raw, 100) - lo) / (hi - lo) * 99 + 1
//! ```
//!
//! The output is ordered by `raw_score`, not by the display score.

use crate::config::ScoringWeights;
use crate::models::{Article, ScoredArticle, ScoringMode};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Upper bound applied to raw scores before normalization.
pub const SCORE_CAP: f64 = 100.0;
/// Score given to every article when the capped range is empty.
pub const MIDPOINT_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Weighted engagement before any age adjustment.
    pub fn engagement(&self, article: &Article) -> f64 {
        article.reaction_count as f64 * self.weights.like
            + article.comment_count as f64 * self.weights.comment
            + article.restack_count as f64 * self.weights.restack
    }

    /// Raw score of a single article at time `now`.
    pub fn raw_score(&self, article: &Article, mode: ScoringMode, now: DateTime<Utc>) -> f64 {
        let engagement = self.engagement(article);
        let engagement = match mode {
            ScoringMode::Standard => engagement,
            ScoringMode::DailyAverage => engagement / days_old(article, now) as f64,
        };
        let length = (article.word_count as f64 / 100.0) * self.weights.length;
        engagement + length
    }

    /// Score and rank `articles`.
    ///
    /// Returns the articles sorted descending by raw score. The sort is
    /// stable: equal raw scores keep their input order.
    #[instrument(level = "info", skip_all, fields(count = articles.len(), %mode, normalize = normalize))]
    pub fn score(
        &self,
        articles: Vec<Article>,
        mode: ScoringMode,
        normalize: bool,
        now: DateTime<Utc>,
    ) -> Vec<ScoredArticle> {
        if articles.is_empty() {
            debug!("No articles to score");
            return Vec::new();
        }

        let raw: Vec<f64> = articles
            .iter()
            .map(|a| self.raw_score(a, mode, now))
            .collect();

        let capped = raw.iter().map(|r| r.min(SCORE_CAP));
        let (lo, hi) = capped.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });
        let degenerate = hi == lo;
        debug!(lo, hi, degenerate, "Capped score range");

        let mut scored: Vec<ScoredArticle> = articles
            .into_iter()
            .zip(raw)
            .map(|(article, raw_score)| {
                let capped = raw_score.min(SCORE_CAP);
                let score = if !normalize {
                    capped
                } else if degenerate {
                    MIDPOINT_SCORE
                } else {
                    ((capped - lo) / (hi - lo)) * 99.0 + 1.0
                };
                ScoredArticle {
                    article,
                    raw_score,
                    score,
                }
            })
            .collect();

        sort_by_raw_score(&mut scored);

        info!(count = scored.len(), "Scored articles");
        for (i, s) in scored.iter().take(5).enumerate() {
            info!(
                rank = i + 1,
                title = %s.article.title,
                score = %format!("{:.1}", s.score),
                raw_score = %format!("{:.2}", s.raw_score),
                comments = s.article.comment_count,
                likes = s.article.reaction_count,
                restacks = s.article.restack_count,
                words = s.article.word_count,
                days_old = s.article.days_ago(now),
                "Top article"
            );
        }
        scored
    }
}

/// Age in whole days, floored at one.
pub fn days_old(article: &Article, now: DateTime<Utc>) -> i64 {
    (now - article.published).num_days().max(1)
}

/// Stable descending sort by raw score.
pub fn sort_by_raw_score(articles: &mut [ScoredArticle]) {
    articles.sort_by(|a, b| b.raw_score.total_cmp(&a.raw_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsletterRef;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap()
    }

    fn article(title: &str, likes: u64, comments: u64, restacks: u64, words: u64, age_days: i64) -> Article {
        let newsletter = NewsletterRef {
            name: "Letter".to_string(),
            category: "Tech".to_string(),
            url: "https://letter.substack.com".to_string(),
        };
        let mut a = Article::new(
            title,
            format!("https://letter.substack.com/p/{title}"),
            now() - Duration::days(age_days),
            vec!["Ann".to_string()],
            newsletter,
        );
        a.reaction_count = likes;
        a.comment_count = comments;
        a.restack_count = restacks;
        a.word_count = words;
        a
    }

    /// Article whose standard raw score equals `likes` exactly.
    fn with_raw(title: &str, likes: u64) -> Article {
        article(title, likes, 0, 0, 0, 2)
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    #[test]
    fn test_empty_input_is_noop() {
        assert!(engine().score(vec![], ScoringMode::Standard, true, now()).is_empty());
    }

    #[test]
    fn test_zero_everything_scores_exactly_zero() {
        let a = article("zero", 0, 0, 0, 0, 3);
        let raw = engine().raw_score(&a, ScoringMode::DailyAverage, now());
        assert_eq!(raw, 0.0);
        let raw = engine().raw_score(&a, ScoringMode::Standard, now());
        assert_eq!(raw, 0.0);
    }

    #[test]
    fn test_weights_favor_restacks_then_comments() {
        let e = engine();
        let like = e.engagement(&article("l", 1, 0, 0, 0, 1));
        let comment = e.engagement(&article("c", 0, 1, 0, 0, 1));
        let restack = e.engagement(&article("r", 0, 0, 1, 0, 1));
        assert_eq!((like, comment, restack), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_length_component() {
        let a = article("long", 0, 0, 0, 2000, 1);
        let raw = engine().raw_score(&a, ScoringMode::Standard, now());
        assert!((raw - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_average_divides_by_age() {
        let a = article("old", 10, 0, 0, 0, 5);
        assert_eq!(engine().raw_score(&a, ScoringMode::DailyAverage, now()), 2.0);
        assert_eq!(engine().raw_score(&a, ScoringMode::Standard, now()), 10.0);
    }

    #[test]
    fn test_today_and_yesterday_both_count_as_one_day() {
        let today = article("today", 10, 0, 0, 0, 0);
        let yesterday = article("yesterday", 10, 0, 0, 0, 1);
        let e = engine();
        assert_eq!(
            e.raw_score(&today, ScoringMode::DailyAverage, now()),
            e.raw_score(&yesterday, ScoringMode::DailyAverage, now())
        );
    }

    #[test]
    fn test_future_published_date_floors_to_one_day() {
        let future = article("future", 10, 0, 0, 0, -3);
        assert_eq!(engine().raw_score(&future, ScoringMode::DailyAverage, now()), 10.0);
    }

    #[test]
    fn test_normalization_caps_outliers() {
        let scored = engine().score(
            vec![with_raw("a", 10), with_raw("b", 50), with_raw("c", 200)],
            ScoringMode::Standard,
            true,
            now(),
        );
        let by_title = |t: &str| scored.iter().find(|s| s.article.title == t).unwrap().score;
        assert!((by_title("a") - 1.0).abs() < 1e-9);
        assert!((by_title("b") - 45.0).abs() < 1e-9);
        assert!((by_title("c") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_bounded_when_normalized() {
        let articles = vec![
            article("a", 500, 40, 3, 3000, 1),
            article("b", 0, 0, 0, 100, 6),
            article("c", 12, 1, 0, 900, 2),
            article("d", 99, 9, 9, 0, 4),
        ];
        for s in engine().score(articles, ScoringMode::DailyAverage, true, now()) {
            assert!((1.0..=100.0).contains(&s.score), "score {} out of range", s.score);
        }
    }

    #[test]
    fn test_cap_holds_without_normalization() {
        let scored = engine().score(
            vec![with_raw("big", 250), with_raw("small", 7)],
            ScoringMode::Standard,
            false,
            now(),
        );
        assert_eq!(scored[0].score, 100.0);
        assert_eq!(scored[0].raw_score, 250.0);
        assert_eq!(scored[1].score, 7.0);
    }

    #[test]
    fn test_identical_scores_get_midpoint() {
        let scored = engine().score(
            vec![with_raw("a", 20), with_raw("b", 20), with_raw("c", 20)],
            ScoringMode::Standard,
            true,
            now(),
        );
        assert!(scored.iter().all(|s| s.score == MIDPOINT_SCORE));
    }

    #[test]
    fn test_all_capped_outliers_get_midpoint() {
        let scored = engine().score(
            vec![with_raw("a", 300), with_raw("b", 150)],
            ScoringMode::Standard,
            true,
            now(),
        );
        assert!(scored.iter().all(|s| s.score == MIDPOINT_SCORE));
        // Raw order survives the tie on the display scale.
        assert_eq!(scored[0].article.title, "a");
    }

    #[test]
    fn test_sorted_by_raw_not_display_score() {
        let scored = engine().score(
            vec![with_raw("mid", 120), with_raw("top", 900), with_raw("low", 5)],
            ScoringMode::Standard,
            true,
            now(),
        );
        let titles: Vec<&str> = scored.iter().map(|s| s.article.title.as_str()).collect();
        assert_eq!(titles, vec!["top", "mid", "low"]);
        assert_eq!(scored[0].score, scored[1].score);
    }

    #[test]
    fn test_zero_engagement_falls_back_to_length() {
        let scored = engine().score(
            vec![
                article("short", 0, 0, 0, 300, 1),
                article("long", 0, 0, 0, 4000, 1),
            ],
            ScoringMode::Standard,
            true,
            now(),
        );
        assert_eq!(scored[0].article.title, "long");
        assert!(scored[1].raw_score > 0.0);
    }

    #[test]
    fn test_resort_is_stable_noop() {
        let mut scored = engine().score(
            vec![with_raw("a", 5), with_raw("b", 9), with_raw("c", 5), with_raw("d", 5)],
            ScoringMode::Standard,
            true,
            now(),
        );
        let titles: Vec<String> = scored.iter().map(|s| s.article.title.clone()).collect();
        assert_eq!(titles, vec!["b", "a", "c", "d"]);
        sort_by_raw_score(&mut scored);
        let again: Vec<String> = scored.iter().map(|s| s.article.title.clone()).collect();
        assert_eq!(titles, again);
    }

    #[test]
    fn test_custom_weights() {
        let e = ScoringEngine::new(ScoringWeights {
            like: 0.0,
            comment: 10.0,
            restack: 0.0,
            length: 0.0,
        });
        let a = article("a", 100, 1, 100, 5000, 1);
        assert_eq!(e.raw_score(&a, ScoringMode::Standard, now()), 10.0);
    }
}
