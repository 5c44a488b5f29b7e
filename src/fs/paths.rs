//! Path and directory management.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::store::ContentItem;

/// Check that an item's file name is a single safe path component.
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    if name == "." || name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Path separators and null bytes not allowed in filename: '{}'",
            name
        )));
    }

    Ok(name)
}

/// Location of an item's downloaded bytes.
pub fn media_path(download_dir: &Path, item: &ContentItem) -> Result<PathBuf> {
    Ok(download_dir.join(validate_file_name(&item.file_name)?))
}

/// Item file for one day: `<output_dir>/YYYY-MM/YYYY-MM-DD.json`.
pub fn dated_state_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir
        .join(date.format("%Y-%m").to_string())
        .join(format!("{}.json", date.format("%Y-%m-%d")))
}

/// Item files from `days` days ago up to `today`, oldest first.
pub fn window_state_paths(output_dir: &Path, today: NaiveDate, days: u32) -> Vec<PathBuf> {
    (0..=i64::from(days))
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .map(|date| dated_state_path(output_dir, date))
        .collect()
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
