//! Utility functions for text cleanup, number formatting, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - HTML to plain text conversion for word counts and summaries
//! - String truncation for logging and teasers
//! - Thousands separators for the rendered digest
//! - File system validation for output directories

use scraper::Html;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Maximum length of an article teaser, in characters.
pub const SUMMARY_MAX_CHARS: usize = 150;

/// Extract visible text from an HTML fragment.
///
/// Text nodes are joined with spaces so adjacent block elements do not
/// merge their words.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of whitespace-separated words in an HTML fragment.
pub fn word_count(html: &str) -> u64 {
    html_to_text(html).split_whitespace().count() as u64
}

/// Plain-text teaser of at most [`SUMMARY_MAX_CHARS`] characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_summary("<p>Hello <b>world</b></p>"), "Hello world");
/// ```
pub fn clean_summary(html: &str) -> String {
    let text = html_to_text(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > SUMMARY_MAX_CHARS {
        let cut: String = text.chars().take(SUMMARY_MAX_CHARS - 3).collect();
        format!("{}...", cut.trim_end())
    } else {
        text
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes (backing off to a char
/// boundary) with an ellipsis and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Format an integer with comma thousands separators.
///
/// ```ignore
/// assert_eq!(thousands(1234567), "1,234,567");
/// ```
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Ensure the parent directory of `path` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %dir.as_ref().display()))]
pub async fn ensure_writable_dir(dir: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).await?;
    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("ééé", 3);
        assert!(result.starts_with('é'));
    }

    #[test]
    fn test_word_count_strips_markup() {
        assert_eq!(word_count("<p>One two</p><p>three <em>four</em></p>"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_clean_summary_short() {
        assert_eq!(clean_summary("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(clean_summary(""), "");
    }

    #[test]
    fn test_clean_summary_truncates() {
        let long = format!("<p>{}</p>", "word ".repeat(60));
        let summary = clean_summary(&long);
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
