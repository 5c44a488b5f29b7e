//! Staging of downloaded files for publishing.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::store::{ContentItem, MediaKind};

const MIB: u64 = 1024 * 1024;

/// A downloaded file opened for publishing.
///
/// Holds an open handle until it is consumed by a publish call or dropped.
#[derive(Debug)]
pub struct StagedMedia {
    pub kind: MediaKind,
    pub file_name: String,
    pub size: u64,
    pub caption: Option<String>,
    file: File,
}

impl StagedMedia {
    /// Open `path` for `item` and check it against the size ceiling of its kind.
    pub async fn stage(
        path: &Path,
        item: &ContentItem,
        limits: &LimitsConfig,
        caption: Option<String>,
    ) -> Result<Self> {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();

        if let Some(limit) = limits.max_bytes(item.kind) {
            if size > limit {
                return Err(Error::FileTooLarge {
                    kind: item.kind,
                    size_mib: size / MIB,
                    limit_mib: limit / MIB,
                });
            }
        }

        Ok(Self {
            kind: item.kind,
            file_name: item.file_name.clone(),
            size,
            caption,
            file,
        })
    }

    /// Read the whole file, releasing the handle.
    pub async fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size as usize);
        self.file.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}
