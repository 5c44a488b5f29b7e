//! Success/failure envelopes recorded on each item.
//!
//! On disk every envelope is a flat object with a boolean `success` key; in
//! memory it is a tagged enum so that success-only and failure-only fields
//! cannot be mixed.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::store::timestamp;

/// Stored classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Transient fetch failure, retried up to the attempt ceiling.
    DownloadError,
    /// Publish failure; no ceiling, the item is re-downloaded and retried.
    ApiError,
    /// File exceeds the platform limit for its kind. Terminal.
    FileTooLarge,
    /// Fetch failed on every allowed attempt. Terminal.
    MaxDownloadAttempts,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DownloadError => "download_error",
            FailureKind::ApiError => "api_error",
            FailureKind::FileTooLarge => "file_too_large",
            FailureKind::MaxDownloadAttempts => "max_download_attempts",
        }
    }

    /// Terminal kinds disable automatic retry and alert at most once.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FailureKind::FileTooLarge | FailureKind::MaxDownloadAttempts
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the last download attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DownloadRecord", into = "DownloadRecord")]
pub enum DownloadOutcome {
    Success {
        size_bytes: u64,
        /// Size in MiB rounded to two decimals.
        size_mb: f64,
        timestamp: NaiveDateTime,
    },
    Failure {
        error_type: FailureKind,
        message: String,
        timestamp: NaiveDateTime,
        attempts: u32,
    },
}

impl DownloadOutcome {
    pub fn success(size_bytes: u64, timestamp: NaiveDateTime) -> Self {
        DownloadOutcome::Success {
            size_bytes,
            size_mb: size_in_mib(size_bytes),
            timestamp,
        }
    }
}

/// Convert a byte count to MiB rounded to two decimals.
pub fn size_in_mib(size_bytes: u64) -> f64 {
    (size_bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}

#[derive(Serialize, Deserialize)]
struct DownloadRecord {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_type: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(with = "timestamp")]
    timestamp: NaiveDateTime,
    #[serde(default)]
    download_attempts: u32,
}

impl TryFrom<DownloadRecord> for DownloadOutcome {
    type Error = String;

    fn try_from(record: DownloadRecord) -> Result<Self, Self::Error> {
        if record.success {
            let size_mb = record.size_mb.unwrap_or(0.0);
            let size_bytes = record
                .size_bytes
                .unwrap_or_else(|| (size_mb * 1024.0 * 1024.0) as u64);
            Ok(DownloadOutcome::Success {
                size_bytes,
                size_mb,
                timestamp: record.timestamp,
            })
        } else {
            Ok(DownloadOutcome::Failure {
                error_type: record.error_type.unwrap_or(FailureKind::DownloadError),
                message: record.message.unwrap_or_default(),
                timestamp: record.timestamp,
                attempts: record.download_attempts,
            })
        }
    }
}

impl From<DownloadOutcome> for DownloadRecord {
    fn from(outcome: DownloadOutcome) -> Self {
        match outcome {
            DownloadOutcome::Success {
                size_bytes,
                size_mb,
                timestamp,
            } => DownloadRecord {
                success: true,
                size_mb: Some(size_mb),
                size_bytes: Some(size_bytes),
                error_type: None,
                message: None,
                timestamp,
                download_attempts: 0,
            },
            DownloadOutcome::Failure {
                error_type,
                message,
                timestamp,
                attempts,
            } => DownloadRecord {
                success: false,
                size_mb: None,
                size_bytes: None,
                error_type: Some(error_type),
                message: Some(message),
                timestamp,
                download_attempts: attempts,
            },
        }
    }
}

/// Outcome of the last publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UploadRecord", into = "UploadRecord")]
pub enum UploadOutcome {
    Success {
        message_id: i64,
        timestamp: NaiveDateTime,
    },
    Failure {
        error_type: FailureKind,
        message: String,
        timestamp: NaiveDateTime,
        notification_sent: bool,
    },
}

#[derive(Serialize, Deserialize)]
struct UploadRecord {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_type: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(with = "timestamp")]
    timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notification_sent: Option<bool>,
}

impl TryFrom<UploadRecord> for UploadOutcome {
    type Error = String;

    fn try_from(record: UploadRecord) -> Result<Self, Self::Error> {
        if record.success {
            let message_id = record
                .message_id
                .ok_or_else(|| "successful upload record without message_id".to_string())?;
            Ok(UploadOutcome::Success {
                message_id,
                timestamp: record.timestamp,
            })
        } else {
            Ok(UploadOutcome::Failure {
                error_type: record.error_type.unwrap_or(FailureKind::ApiError),
                message: record.message.unwrap_or_default(),
                timestamp: record.timestamp,
                notification_sent: record.notification_sent.unwrap_or(false),
            })
        }
    }
}

impl From<UploadOutcome> for UploadRecord {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Success {
                message_id,
                timestamp,
            } => UploadRecord {
                success: true,
                message_id: Some(message_id),
                error_type: None,
                message: None,
                timestamp,
                notification_sent: None,
            },
            UploadOutcome::Failure {
                error_type,
                message,
                timestamp,
                notification_sent,
            } => UploadRecord {
                success: false,
                message_id: None,
                error_type: Some(error_type),
                message: Some(message),
                timestamp,
                notification_sent: Some(notification_sent),
            },
        }
    }
}

/// Terminal condition shared by the download and upload machines.
///
/// Set by download exhaustion or by an oversize file; once present the item
/// is neither fetched nor published again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingCondition {
    #[serde(rename = "error_type")]
    pub kind: FailureKind,
    pub message: String,
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub notification_sent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_size_in_mib_rounding() {
        assert_eq!(size_in_mib(0), 0.0);
        assert_eq!(size_in_mib(1024 * 1024), 1.0);
        assert_eq!(size_in_mib(1_500_000), 1.43);
    }

    #[test]
    fn test_download_success_wire_shape() {
        let value = serde_json::to_value(DownloadOutcome::success(2048, ts())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["download_attempts"], 0);
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00");
        assert!(value.get("error_type").is_none());
    }

    #[test]
    fn test_download_failure_from_producer_json() {
        let json = r#"{
            "success": false,
            "error_type": "download_error",
            "message": "timed out",
            "timestamp": "2024-05-01T12:00:00",
            "download_attempts": 3
        }"#;
        let outcome: DownloadOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Failure {
                error_type: FailureKind::DownloadError,
                message: "timed out".into(),
                timestamp: ts(),
                attempts: 3,
            }
        );
    }

    #[test]
    fn test_upload_success_requires_message_id() {
        let json = r#"{"success": true, "timestamp": "2024-05-01T12:00:00"}"#;
        assert!(serde_json::from_str::<UploadOutcome>(json).is_err());
    }

    #[test]
    fn test_upload_failure_wire_shape() {
        let outcome = UploadOutcome::Failure {
            error_type: FailureKind::FileTooLarge,
            message: "images file too large (12MB > 10MB)".into(),
            timestamp: ts(),
            notification_sent: false,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error_type"], "file_too_large");
        assert_eq!(value["notification_sent"], false);
        assert!(value.get("message_id").is_none());
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(FailureKind::FileTooLarge.is_terminal());
        assert!(FailureKind::MaxDownloadAttempts.is_terminal());
        assert!(!FailureKind::ApiError.is_terminal());
        assert!(!FailureKind::DownloadError.is_terminal());
    }
}
