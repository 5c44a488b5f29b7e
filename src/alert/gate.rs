//! Notifier gate: the single place that records publish failures and decides
//! whether an alert goes out.
//!
//! API errors alert every time they happen. Terminal conditions (download
//! exhaustion, oversize files) alert once per item; the persisted
//! `notification_sent` flag on the blocking condition carries that guarantee
//! across runs.

use std::path::Path;

use crate::alert::channel::AlertChannel;
use crate::alert::classify::classify;
use crate::clock::Clock;
use crate::error::Error;
use crate::store::{BlockingCondition, ContentItem, FailureKind, UploadOutcome};
use crate::text::excerpt;

pub struct NotifierGate<'a> {
    alerts: &'a dyn AlertChannel,
    clock: &'a dyn Clock,
    excerpt_chars: usize,
}

impl<'a> NotifierGate<'a> {
    pub fn new(alerts: &'a dyn AlertChannel, clock: &'a dyn Clock, excerpt_chars: usize) -> Self {
        Self {
            alerts,
            clock,
            excerpt_chars,
        }
    }

    /// Check an item for a terminal condition.
    ///
    /// Returns `true` when the item is blocked. The first observation of a
    /// condition sends one alert and sets `notification_sent`; the flag is set
    /// even when delivery fails so that no condition is ever reported twice.
    pub async fn observe_blocking(&self, item: &mut ContentItem) -> bool {
        let Some(condition) = item.blocking.as_ref() else {
            return false;
        };

        if !condition.notification_sent {
            let text = format!(
                "Publish blocked\nfile: {}\ntype: {}\nerror: {}",
                item.file_name,
                condition.kind,
                excerpt(&condition.message, self.excerpt_chars)
            );
            let delivered = self.alerts.notify(&text).await;
            tracing::debug!(
                "Blocking alert for {} (delivered: {})",
                item.file_name,
                delivered
            );
            mark_notified(item);
        }

        if let Some(condition) = &item.blocking {
            tracing::warn!(
                "Skipping {}: unrecoverable {}",
                item.file_name,
                condition.kind
            );
        }
        true
    }

    /// Record a failed publish of `item`.
    ///
    /// Stores the full error on the upload outcome and clears `downloaded`
    /// so the next run fetches the file again. API errors alert right away;
    /// an oversize file becomes a blocking condition and goes through
    /// [`observe_blocking`](Self::observe_blocking).
    pub async fn record_upload_failure(&self, item: &mut ContentItem, error: &Error) -> FailureKind {
        let kind = classify(error);
        let message = error.to_string();
        let timestamp = self.clock.now();

        item.upload_info = Some(UploadOutcome::Failure {
            error_type: kind,
            message: message.clone(),
            timestamp,
            notification_sent: false,
        });
        item.downloaded = false;

        tracing::error!(
            "Publish failed: {} - {}",
            item.file_name,
            excerpt(&message, self.excerpt_chars)
        );
        tracing::debug!("Publish failure details: {} - {}", item.file_name, message);

        match kind {
            FailureKind::FileTooLarge => {
                item.blocking = Some(BlockingCondition {
                    kind,
                    message,
                    timestamp,
                    notification_sent: false,
                });
                self.observe_blocking(item).await;
            }
            _ => {
                let text = format!(
                    "Publish failed\nfile: {}\nerror type: {}\ndetails: {}",
                    item.file_name,
                    kind,
                    excerpt(&message, self.excerpt_chars)
                );
                self.alerts.notify(&text).await;
            }
        }

        kind
    }

    /// Alert about a run that could not load or save its item file.
    pub async fn report_run_failure(&self, state_path: &Path, error: &Error) {
        let text = format!("Run failed: {}\n{}", state_path.display(), error);
        self.alerts.notify(&text).await;
    }
}

/// Set `notification_sent` on the blocking condition and on a matching upload failure.
fn mark_notified(item: &mut ContentItem) {
    let Some(condition) = item.blocking.as_mut() else {
        return;
    };
    condition.notification_sent = true;

    if let Some(UploadOutcome::Failure {
        error_type,
        notification_sent,
        ..
    }) = item.upload_info.as_mut()
    {
        if *error_type == condition.kind {
            *notification_sent = true;
        }
    }
}
