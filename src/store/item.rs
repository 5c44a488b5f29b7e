//! Content item representation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::outcome::{BlockingCondition, DownloadOutcome, UploadOutcome};

/// Kind of content attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "images")]
    Image,
    #[serde(rename = "videos")]
    Video,
    /// Live audio room link; carries no bytes.
    #[serde(rename = "spaces")]
    Space,
    /// Live broadcast link; carries no bytes.
    #[serde(rename = "broadcasts")]
    Broadcast,
}

impl MediaKind {
    /// Special kinds are published as text links instead of files.
    pub fn is_special(&self) -> bool {
        matches!(self, MediaKind::Space | MediaKind::Broadcast)
    }

    /// Name used in persisted records and message hashtags.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Space => "spaces",
            MediaKind::Broadcast => "broadcasts",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of the originating post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub name: String,
}

/// One media file or link sourced from an originating post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique file name, also the name of the downloaded file.
    pub file_name: String,

    /// Identifier of the originating post.
    #[serde(rename = "tweet_id", default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,

    #[serde(rename = "media_type")]
    pub kind: MediaKind,

    /// Source URL of the bytes (or the live link for special kinds).
    pub url: String,

    #[serde(default)]
    pub user: Author,

    /// Publish time as written by the producer (ISO-8601).
    #[serde(default)]
    pub publish_time: String,

    #[serde(default)]
    pub full_text: String,

    #[serde(rename = "is_downloaded", default)]
    pub downloaded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_info: Option<DownloadOutcome>,

    #[serde(rename = "is_uploaded", default)]
    pub uploaded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_info: Option<UploadOutcome>,

    /// Terminal condition that stops both fetching and publishing.
    #[serde(
        rename = "blocking_condition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub blocking: Option<BlockingCondition>,

    /// Producer fields this crate does not interpret, kept for the next save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentItem {
    /// Create a pending item with no outcome recorded yet.
    pub fn new(
        file_name: impl Into<String>,
        post_id: Option<String>,
        kind: MediaKind,
        url: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            post_id,
            kind,
            url: url.into(),
            user: Author::default(),
            publish_time: String::new(),
            full_text: String::new(),
            downloaded: false,
            download_info: None,
            uploaded: false,
            upload_info: None,
            blocking: None,
            extra: Map::new(),
        }
    }

    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    /// Consecutive failed download attempts; zero after any success.
    pub fn download_attempts(&self) -> u32 {
        match &self.download_info {
            Some(DownloadOutcome::Failure { attempts, .. }) => *attempts,
            _ => 0,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocking.is_some()
    }

    /// Lift a terminal failure recorded only in `upload_info` into `blocking`.
    ///
    /// Older item files keep terminal conditions on the upload outcome. The
    /// condition keeps its timestamp and `notification_sent`. Returns `true`
    /// when a condition was adopted.
    pub fn adopt_upload_blocking(&mut self) -> bool {
        if self.blocking.is_some() {
            return false;
        }

        match &self.upload_info {
            Some(UploadOutcome::Failure {
                error_type,
                message,
                timestamp,
                notification_sent,
            }) if error_type.is_terminal() => {
                self.blocking = Some(BlockingCondition {
                    kind: *error_type,
                    message: message.clone(),
                    timestamp: *timestamp,
                    notification_sent: *notification_sent,
                });
                true
            }
            _ => false,
        }
    }
}
