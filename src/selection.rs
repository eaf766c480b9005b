//! Selection engine.
//!
//! Splits the ranked articles into three buckets:
//!
//! 1. **Featured**: the top `featured_count` articles after duplicate removal.
//! 2. **Wildcards**: random picks from a bounded slice of what remains, skipping
//!    any author who already holds a featured slot and never picking two
//!    articles that share an author.
//! 3. **Categorized**: everything else, grouped by newsletter category.
//!
//! Input must already be sorted by the scoring engine. Small or empty inputs
//! shrink the buckets, they never fail.

use crate::models::{ScoredArticle, SelectionResult};
use itertools::Itertools;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Default breadth of the wildcard pool, per requested wildcard.
pub const DEFAULT_POOL_FACTOR: usize = 10;

#[derive(Debug, Clone)]
pub struct SelectionEngine {
    pool_factor: usize,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_FACTOR)
    }
}

impl SelectionEngine {
    pub fn new(pool_factor: usize) -> Self {
        Self { pool_factor }
    }

    #[instrument(level = "info", skip_all, fields(count = articles.len(), featured_count = featured_count, wildcard_count = wildcard_count))]
    pub fn select<R: Rng>(
        &self,
        articles: Vec<ScoredArticle>,
        featured_count: usize,
        wildcard_count: usize,
        rng: &mut R,
    ) -> SelectionResult {
        let input_len = articles.len();
        let mut remaining = dedupe(articles);
        if remaining.len() < input_len {
            info!(removed = input_len - remaining.len(), "Removed duplicate articles");
        }

        let featured_len = featured_count.min(remaining.len());
        if featured_len < featured_count {
            warn!(
                requested = featured_count,
                available = featured_len,
                "Fewer articles than featured slots; shrinking featured section"
            );
        }
        let featured: Vec<ScoredArticle> = remaining.drain(..featured_len).collect();

        let picked = self.pick_wildcards(&featured, &remaining, wildcard_count, rng);
        if picked.len() < wildcard_count {
            warn!(
                requested = wildcard_count,
                picked = picked.len(),
                "Author diversity left too few candidates to fill every wildcard slot"
            );
        }

        // Pull the picks out of the remainder in pick order.
        let mut slots: Vec<Option<ScoredArticle>> = remaining.into_iter().map(Some).collect();
        let wildcards: Vec<ScoredArticle> = picked
            .iter()
            .filter_map(|&i| slots[i].take())
            .collect();

        let mut categorized: BTreeMap<String, Vec<ScoredArticle>> = BTreeMap::new();
        for article in slots.into_iter().flatten() {
            categorized
                .entry(article.article.newsletter.category.clone())
                .or_default()
                .push(article);
        }

        info!(
            featured = featured.len(),
            wildcards = wildcards.len(),
            categories = categorized.len(),
            "Selection complete"
        );
        SelectionResult {
            featured,
            wildcards,
            categorized,
        }
    }

    /// Indices into `remaining` chosen as wildcards, in pick order.
    fn pick_wildcards<R: Rng>(
        &self,
        featured: &[ScoredArticle],
        remaining: &[ScoredArticle],
        wildcard_count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        if wildcard_count == 0 {
            return Vec::new();
        }

        let featured_authors: HashSet<&str> = featured
            .iter()
            .flat_map(|s| s.article.authors.iter().map(String::as_str))
            .collect();

        let eligible: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                !s.article
                    .authors
                    .iter()
                    .any(|a| featured_authors.contains(a.as_str()))
            })
            .map(|(i, _)| i)
            .collect();

        let pool_len = self
            .pool_factor
            .saturating_mul(wildcard_count)
            .min(eligible.len());
        let mut pool: Vec<usize> = eligible.into_iter().take(pool_len).collect();
        let attempts = wildcard_count.min(pool.len() / 2);
        debug!(pool = pool.len(), attempts, "Wildcard pool built");

        let mut picked = Vec::with_capacity(attempts);
        for _ in 0..attempts {
            if pool.is_empty() {
                break;
            }
            let choice = pool.swap_remove(rng.random_range(0..pool.len()));
            picked.push(choice);

            let chosen = &remaining[choice].article;
            let victims: HashSet<usize> = pool
                .iter()
                .copied()
                .filter(|&i| remaining[i].article.shares_author_with(chosen))
                .collect();
            pool.retain(|i| !victims.contains(i));
            debug!(
                title = %chosen.title,
                dropped = victims.len(),
                left = pool.len(),
                "Picked wildcard"
            );
        }
        picked
    }
}

/// Keep the first occurrence of every `(title, authors, newsletter)` key.
pub fn dedupe(articles: Vec<ScoredArticle>) -> Vec<ScoredArticle> {
    articles
        .into_iter()
        .unique_by(|s| s.article.dedupe_key())
        .collect()
}
