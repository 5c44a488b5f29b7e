//! Telegram Bot API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::types::*;
use crate::error::{Error, Result};
use crate::store::MediaKind;
use crate::text::excerpt;
use crate::upload::{MessageId, Publisher, StagedMedia};

/// Fallback wait when a 429 response carries no `retry_after`.
const DEFAULT_RETRY_AFTER: u64 = 60;

/// Characters of an unparseable response body kept in the error.
const RESPONSE_EXCERPT_CHARS: usize = 500;

/// Publisher backed by the Telegram Bot API.
///
/// The bot token is part of every request URL, so transport errors are
/// stripped of their URL before they are logged or returned.
pub struct TelegramApi {
    client: Client,
    base_url: String,
    chat_id: String,
}

impl TelegramApi {
    pub fn new(api_base: &str, bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
            chat_id: chat_id.to_string(),
        })
    }

    /// Call a Bot API method with a multipart body.
    async fn call<T: DeserializeOwned>(&self, method: &str, form: Form) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!("POST {}", method);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        tracing::debug!("{} response status: {}", method, status);
        let text = response.text().await.map_err(|e| Error::Http(e.without_url()))?;

        let parsed: std::result::Result<ApiResponse<T>, _> = serde_json::from_str(&text);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parsed
                .ok()
                .and_then(|r| r.parameters)
                .and_then(|p| p.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Err(Error::RateLimited(retry_after));
        }

        let api_response = parsed.map_err(|e| {
            Error::Api(format!(
                "Failed to parse {} response: {} - HTTP {}: {}",
                method,
                e,
                status,
                excerpt(&text, RESPONSE_EXCERPT_CHARS)
            ))
        })?;

        if !api_response.ok {
            return Err(Error::Api(format!(
                "{} (error {})",
                api_response
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
                api_response.error_code.unwrap_or(status.as_u16() as i64)
            )));
        }

        api_response
            .result
            .ok_or_else(|| Error::Api(format!("{} returned no result", method)))
    }

    fn base_form(&self) -> Form {
        Form::new().text("chat_id", self.chat_id.clone())
    }
}

/// Bot API method and field name for a single file of `kind`.
fn single_method(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Video => ("sendVideo", "video"),
        _ => ("sendPhoto", "photo"),
    }
}

/// `InputMedia` type for a file of `kind`.
fn input_media_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "video",
        _ => "photo",
    }
}

/// Read a staged file into a multipart part with a guessed content type.
async fn file_part(media: StagedMedia) -> Result<Part> {
    let file_name = media.file_name.clone();
    let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
    let bytes = media.into_bytes().await?;

    Ok(Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.essence_str())?)
}

#[async_trait]
impl Publisher for TelegramApi {
    async fn send_text(&self, text: &str) -> Result<MessageId> {
        let form = self.base_form().text("text", text.to_string());
        let message: Message = self.call("sendMessage", form).await?;
        Ok(message.message_id)
    }

    async fn send_single(&self, media: StagedMedia) -> Result<MessageId> {
        let (method, field) = single_method(media.kind);
        let kind = media.kind;

        let mut form = self.base_form();
        if let Some(caption) = media.caption.clone() {
            form = form.text("caption", caption);
        }
        if kind == MediaKind::Video {
            form = form.text("supports_streaming", "true");
        }
        form = form.part(field, file_part(media).await?);

        let message: Message = self.call(method, form).await?;
        Ok(message.message_id)
    }

    async fn send_batch(&self, media: Vec<StagedMedia>) -> Result<Vec<MessageId>> {
        let mut descriptors = Vec::with_capacity(media.len());
        let mut parts = Vec::with_capacity(media.len());

        for (i, staged) in media.into_iter().enumerate() {
            let name = format!("file{}", i);
            descriptors.push(InputMedia {
                media_type: input_media_type(staged.kind),
                media: format!("attach://{}", name),
                caption: staged.caption.clone(),
                supports_streaming: (staged.kind == MediaKind::Video).then_some(true),
            });
            parts.push((name, file_part(staged).await?));
        }

        let mut form = self
            .base_form()
            .text("media", serde_json::to_string(&descriptors)?);
        for (name, part) in parts {
            form = form.part(name, part);
        }

        let messages: Vec<Message> = self.call("sendMediaGroup", form).await?;
        Ok(messages.into_iter().map(|m| m.message_id).collect())
    }
}
