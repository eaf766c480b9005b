//! Digest configuration.
//!
//! Settings come from an optional YAML file and are then overridden by any
//! command-line flags. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```yaml
//! days_back: 7
//! featured_count: 5
//! wildcard_count: 1
//! scoring_mode: daily_average
//! normalize: true
//! weights:
//!   like: 1.0
//!   comment: 2.0
//!   restack: 3.0
//!   length: 0.05
//! ```

use crate::cli::Cli;
use crate::models::ScoringMode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Weights that turn engagement counts and length into a raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub like: f64,
    pub comment: f64,
    pub restack: f64,
    /// Multiplier applied per hundred words.
    pub length: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            comment: 2.0,
            restack: 3.0,
            length: 0.05,
        }
    }
}

/// Full runtime configuration for one digest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Lookback window for articles, in days.
    pub days_back: i64,
    pub featured_count: usize,
    pub wildcard_count: usize,
    pub scoring_mode: ScoringMode,
    pub normalize: bool,
    pub weights: ScoringWeights,
    /// Wildcard pool size is `wildcard_pool_factor * wildcard_count`.
    pub wildcard_pool_factor: usize,
    /// Maximum articles rendered per category section.
    pub category_limit: usize,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            days_back: 7,
            featured_count: 5,
            wildcard_count: 1,
            scoring_mode: ScoringMode::Standard,
            normalize: true,
            weights: ScoringWeights::default(),
            wildcard_pool_factor: 10,
            category_limit: 10,
            user_agent: "Mozilla/5.0 (compatible; DigestBot/1.0)".to_string(),
            request_timeout_secs: 10,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl DigestConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the configuration file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded digest configuration");
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(days) = cli.days_back {
            self.days_back = days;
        }
        if let Some(n) = cli.featured {
            self.featured_count = n;
        }
        if let Some(n) = cli.wildcards {
            self.wildcard_count = n;
        }
        if let Some(mode) = cli.scoring {
            self.scoring_mode = mode;
        }
        if cli.no_normalize {
            self.normalize = false;
        }
        debug!(config = ?self, "Effective configuration");
        self
    }
}
