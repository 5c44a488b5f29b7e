//! Wholesale JSON persistence of the item sequence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::item::ContentItem;

/// A JSON file holding one ordered batch of content items.
#[derive(Debug, Clone)]
pub struct ItemStore {
    path: PathBuf,
}

impl ItemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full item sequence.
    pub fn load(&self) -> Result<Vec<ContentItem>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::Load {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let items: Vec<ContentItem> =
            serde_json::from_str(&content).map_err(|e| Error::Load {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        tracing::info!("Loaded {} items from {}", items.len(), self.path.display());
        Ok(items)
    }

    /// Overwrite the file with the full item sequence.
    ///
    /// This is a plain truncate-then-write; a crash mid-write can leave a
    /// partial file.
    pub fn save(&self, items: &[ContentItem]) -> Result<()> {
        let content = serde_json::to_string_pretty(items).map_err(|e| Error::Save {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&self.path, content).map_err(|e| Error::Save {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }
}
