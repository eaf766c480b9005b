//! JSON dump of a digest selection.
//!
//! Files are organized by date:
//! ```text
//! json_output_dir/
//! └── 2025-05-06.json
//! ```
//! Writing twice on the same day replaces the earlier file.

use crate::models::SelectionResult;
use chrono::NaiveDate;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `selection` to `{json_output_dir}/{date}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.as_ref().display(), %date))]
pub async fn write_selection(
    selection: &SelectionResult,
    json_output_dir: impl AsRef<Path>,
    date: NaiveDate,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(selection)?;
    let dir = json_output_dir.as_ref();

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = dir.join(format!("{date}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote selection JSON");
    Ok(path)
}
