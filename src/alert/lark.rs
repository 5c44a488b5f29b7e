//! Lark (Feishu) custom-bot webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::alert::channel::AlertChannel;
use crate::error::{Error, Result};
use crate::text::cap_with_ellipsis;

const ALERT_HEADER: &str = "📢 Media relay alert";
const UPDATE_HEADER: &str = "📢 New post";

/// Alert channel posting text messages to a Lark webhook.
pub struct LarkNotifier {
    client: Client,
    webhook_url: String,
    body_chars: usize,
}

impl LarkNotifier {
    pub fn new(webhook_base: &str, key: &str, timeout: Duration, body_chars: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create alert HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url: format!("{}/{}", webhook_base.trim_end_matches('/'), key),
            body_chars,
        })
    }

    async fn post_text(&self, text: String) -> bool {
        let payload = json!({
            "msg_type": "text",
            "content": { "text": text },
        });

        let response = match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Lark webhook request failed: {}", e.without_url());
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Lark webhook returned HTTP {}", status);
            return false;
        }

        // Lark reports rejected messages with HTTP 200 and a non-zero code.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        match body.get("code").and_then(Value::as_i64) {
            Some(0) | None => true,
            Some(code) => {
                let msg = body
                    .get("msg")
                    .and_then(|m| m.as_str())
                    .unwrap_or("no message");
                tracing::error!("Lark webhook rejected message: code {} ({})", code, msg);
                false
            }
        }
    }
}

#[async_trait]
impl AlertChannel for LarkNotifier {
    async fn notify(&self, text: &str) -> bool {
        let body = cap_with_ellipsis(text, self.body_chars);
        let sent = self.post_text(format!("{}\n{}", ALERT_HEADER, body)).await;
        if sent {
            tracing::info!("Alert sent to Lark");
        }
        sent
    }

    async fn announce(&self, text: &str) -> bool {
        let sent = self.post_text(format!("{}\n{}", UPDATE_HEADER, text)).await;
        if sent {
            tracing::info!("Update mirrored to Lark");
        }
        sent
    }
}
