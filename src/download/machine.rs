//! Per-item download state machine.
//!
//! An item is in one of four states: not attempted, downloaded, retry
//! pending (n failed attempts), or permanently failed (blocked). Fetch
//! errors never escape [`DownloadMachine::process`]; they become stored
//! outcomes.

use std::path::Path;

use crate::clock::Clock;
use crate::download::fetcher::Fetcher;
use crate::error::Result;
use crate::fs::media_path;
use crate::store::{BlockingCondition, ContentItem, DownloadOutcome, FailureKind, UploadOutcome};
use crate::text::excerpt;

/// What [`DownloadMachine::process`] did with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStep {
    /// Nothing to do (already downloaded).
    Skipped,
    /// Special kind marked downloaded without a fetch.
    Special,
    /// Fetched this many bytes.
    Downloaded(u64),
    /// Fetch failed; this many consecutive failures so far.
    Failed(u32),
    /// Attempt ceiling reached; item is now blocked.
    Exhausted,
    /// Item carries another blocking condition; not fetched.
    Blocked,
}

pub struct DownloadMachine<'a> {
    fetcher: &'a dyn Fetcher,
    clock: &'a dyn Clock,
    download_dir: &'a Path,
    max_attempts: u32,
    excerpt_chars: usize,
}

impl<'a> DownloadMachine<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        clock: &'a dyn Clock,
        download_dir: &'a Path,
        max_attempts: u32,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            clock,
            download_dir,
            max_attempts,
            excerpt_chars,
        }
    }

    /// Advance one item.
    pub async fn process(&self, item: &mut ContentItem) -> DownloadStep {
        if item.adopt_upload_blocking() {
            tracing::debug!("Carried stored terminal condition over for {}", item.file_name);
        }

        if item.is_special() {
            return self.mark_special(item);
        }

        if item.downloaded {
            return DownloadStep::Skipped;
        }

        if item.download_attempts() >= self.max_attempts {
            self.mark_exhausted(item);
            return DownloadStep::Exhausted;
        }

        if let Some(condition) = &item.blocking {
            tracing::debug!(
                "Not fetching {}: blocked by {}",
                item.file_name,
                condition.kind
            );
            return DownloadStep::Blocked;
        }

        tracing::info!("Downloading: {}", item.file_name);
        match self.fetch(item).await {
            Ok(size) => {
                let outcome = DownloadOutcome::success(size, self.clock.now());
                if let DownloadOutcome::Success { size_mb, .. } = &outcome {
                    tracing::info!("Downloaded: {} ({}MB)", item.file_name, size_mb);
                }
                item.downloaded = true;
                item.download_info = Some(outcome);
                DownloadStep::Downloaded(size)
            }
            Err(e) => {
                let attempts = item.download_attempts() + 1;
                let message = e.to_string();
                tracing::error!(
                    "Download failed: {} - {} (attempt {}/{})",
                    item.file_name,
                    excerpt(&message, self.excerpt_chars),
                    attempts,
                    self.max_attempts
                );
                tracing::debug!("Download failure details: {} - {}", item.file_name, message);

                item.download_info = Some(DownloadOutcome::Failure {
                    error_type: FailureKind::DownloadError,
                    message,
                    timestamp: self.clock.now(),
                    attempts,
                });
                DownloadStep::Failed(attempts)
            }
        }
    }

    async fn fetch(&self, item: &ContentItem) -> Result<u64> {
        let dest = media_path(self.download_dir, item)?;
        self.fetcher.fetch_to(&item.url, &dest).await
    }

    fn mark_special(&self, item: &mut ContentItem) -> DownloadStep {
        if item.downloaded {
            return DownloadStep::Skipped;
        }

        item.downloaded = true;
        item.download_info = Some(DownloadOutcome::success(0, self.clock.now()));
        tracing::info!("No download needed for {} ({})", item.file_name, item.kind);
        DownloadStep::Special
    }

    /// Block an item whose attempts reached the ceiling.
    ///
    /// Keeps the timestamp and `notification_sent` of an existing condition
    /// so that re-marking on every run never re-arms the alert. Conditions
    /// stored on the upload outcome were already lifted by `process`.
    fn mark_exhausted(&self, item: &mut ContentItem) {
        let (timestamp, notification_sent) = match (&item.blocking, &item.upload_info) {
            (Some(existing), _) => (existing.timestamp, existing.notification_sent),
            (None, Some(UploadOutcome::Failure { timestamp, .. }))
            | (None, Some(UploadOutcome::Success { timestamp, .. })) => (*timestamp, false),
            (None, None) => (self.clock.now(), false),
        };

        item.blocking = Some(BlockingCondition {
            kind: FailureKind::MaxDownloadAttempts,
            message: format!("download failed {} times in a row", self.max_attempts),
            timestamp,
            notification_sent,
        });

        tracing::warn!("Max download attempts reached: {}", item.file_name);
    }
}
