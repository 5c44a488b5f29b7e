//! Telegram Bot API type definitions.

use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra failure details.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

/// The part of a sent message this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
}

/// One element of a `sendMediaGroup` request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InputMedia {
    #[serde(rename = "type")]
    pub media_type: &'static str,
    /// `attach://<part name>` reference to a multipart field.
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_streaming: Option<bool>,
}
