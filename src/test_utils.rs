//! Shared test fakes for the relay's collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::alert::AlertChannel;
use crate::clock::Clock;
use crate::download::Fetcher;
use crate::error::{Error, Result};
use crate::store::{ContentItem, DownloadOutcome, MediaKind};
use crate::upload::{MessageId, Publisher, StagedMedia};

/// 2024-05-01 12:00:00.
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub struct FixedClock(pub NaiveDateTime);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixed_time())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Alert channel that keeps every text it was given.
#[derive(Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<String>>,
    announcements: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingAlerts {
    /// Records texts but reports every delivery as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertChannel for RecordingAlerts {
    async fn notify(&self, text: &str) -> bool {
        self.alerts.lock().unwrap().push(text.to_string());
        !self.fail
    }

    async fn announce(&self, text: &str) -> bool {
        self.announcements.lock().unwrap().push(text.to_string());
        !self.fail
    }
}

/// Fetcher serving canned bodies or errors per URL.
///
/// Unknown URLs fail like a 404.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeFetcher {
    pub fn with_bytes(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), bytes);
        self
    }

    pub fn with_failure(mut self, url: &str, message: &str) -> Self {
        self.failures.insert(url.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));

        if let Some(message) = self.failures.get(url) {
            return Err(Error::Download(message.clone()));
        }
        match self.bodies.get(url) {
            Some(bytes) => {
                tokio::fs::write(dest, bytes).await?;
                Ok(bytes.len() as u64)
            }
            None => Err(Error::Download("HTTP 404 Not Found".into())),
        }
    }
}

/// One call seen by [`FakePublisher`]: file names with their captions.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishCall {
    Text(String),
    Single(String, Option<String>),
    Batch(Vec<(String, Option<String>)>),
}

/// Publisher handing out increasing message ids from 100.
pub struct FakePublisher {
    next_id: Mutex<MessageId>,
    calls: Mutex<Vec<PublishCall>>,
    failure: Option<String>,
    drop_confirmation: bool,
}

impl Default for FakePublisher {
    fn default() -> Self {
        Self {
            next_id: Mutex::new(100),
            calls: Mutex::new(Vec::new()),
            failure: None,
            drop_confirmation: false,
        }
    }
}

impl FakePublisher {
    /// Every call fails with an API error carrying `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Batch responses carry one confirmation fewer than submitted.
    pub fn dropping_confirmation(mut self) -> Self {
        self.drop_confirmation = true;
        self
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PublishCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(Error::Api(message.clone())),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> MessageId {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn send_text(&self, text: &str) -> Result<MessageId> {
        self.record(PublishCall::Text(text.to_string()))?;
        Ok(self.next_id())
    }

    async fn send_single(&self, media: StagedMedia) -> Result<MessageId> {
        self.record(PublishCall::Single(media.file_name.clone(), media.caption.clone()))?;
        media.into_bytes().await?;
        Ok(self.next_id())
    }

    async fn send_batch(&self, media: Vec<StagedMedia>) -> Result<Vec<MessageId>> {
        let summary = media
            .iter()
            .map(|m| (m.file_name.clone(), m.caption.clone()))
            .collect();
        self.record(PublishCall::Batch(summary))?;

        let mut confirmed = media.len();
        if self.drop_confirmation {
            confirmed = confirmed.saturating_sub(1);
        }
        Ok((0..confirmed).map(|_| self.next_id()).collect())
    }
}

/// A downloaded item whose file of `size` bytes exists in `dir`.
pub fn downloaded_item(
    dir: &Path,
    file_name: &str,
    post_id: &str,
    kind: MediaKind,
    size: usize,
) -> ContentItem {
    std::fs::write(dir.join(file_name), vec![0u8; size]).unwrap();

    let mut item = ContentItem::new(
        file_name,
        Some(post_id.to_string()),
        kind,
        format!("https://media.example.com/{}", file_name),
    );
    item.user.screen_name = "alice".into();
    item.user.name = "Alice".into();
    item.publish_time = "2024-05-01T08:30:00".into();
    item.full_text = "hello".into();
    item.downloaded = true;
    item.download_info = Some(DownloadOutcome::success(size as u64, fixed_time()));
    item
}
