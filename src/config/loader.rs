//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::MediaKind;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub alert: AlertConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Telegram bot credentials and target chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token (`<bot id>:<secret>`).
    #[serde(default)]
    pub bot_token: String,

    /// Target chat: numeric id or `@channel` username.
    #[serde(default)]
    pub chat_id: String,

    /// Bot API base URL.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_telegram_api_base(),
        }
    }
}

/// Lark (Feishu) alert webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Webhook key; alerts are disabled when unset.
    #[serde(default)]
    pub lark_key: Option<String>,

    #[serde(default = "default_webhook_base")]
    pub webhook_base: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            lark_key: None,
            webhook_base: default_webhook_base(),
        }
    }
}

/// Platform limits applied while batching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum image size in bytes.
    #[serde(default = "default_image_bytes")]
    pub image_bytes: u64,

    /// Maximum video size in bytes.
    #[serde(default = "default_video_bytes")]
    pub video_bytes: u64,

    /// Maximum caption / text message length in characters.
    #[serde(default = "default_caption_chars")]
    pub caption_chars: usize,

    /// Maximum number of files in one media group.
    #[serde(default = "default_media_group_size")]
    pub media_group_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            image_bytes: default_image_bytes(),
            video_bytes: default_video_bytes(),
            caption_chars: default_caption_chars(),
            media_group_size: default_media_group_size(),
        }
    }
}

impl LimitsConfig {
    /// Byte ceiling for a kind; special kinds have none.
    pub fn max_bytes(&self, kind: MediaKind) -> Option<u64> {
        match kind {
            MediaKind::Image => Some(self.image_bytes),
            MediaKind::Video => Some(self.video_bytes),
            MediaKind::Space | MediaKind::Broadcast => None,
        }
    }
}

/// Run options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Directory downloaded files are written to.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Root of the date-bucketed item files (`YYYY-MM/YYYY-MM-DD.json`).
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Failed downloads allowed before an item is blocked.
    #[serde(default = "default_max_download_attempts")]
    pub max_download_attempts: u32,

    /// Media groups sent per post in one run; remaining items wait for the next run.
    #[serde(default = "default_batches_per_group")]
    pub batches_per_group: usize,

    /// Number of past days scanned by a window run, in addition to today.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Characters of an error message kept in logs and alerts.
    #[serde(default = "default_error_excerpt_chars")]
    pub error_excerpt_chars: usize,

    /// Characters of an alert body before it is cut.
    #[serde(default = "default_alert_body_chars")]
    pub alert_body_chars: usize,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_seconds: u64,

    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_seconds: u64,

    #[serde(default = "default_alert_timeout")]
    pub alert_timeout_seconds: u64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            output_directory: None,
            max_download_attempts: default_max_download_attempts(),
            batches_per_group: default_batches_per_group(),
            window_days: default_window_days(),
            error_excerpt_chars: default_error_excerpt_chars(),
            alert_body_chars: default_alert_body_chars(),
            download_timeout_seconds: default_download_timeout(),
            publish_timeout_seconds: default_publish_timeout(),
            alert_timeout_seconds: default_alert_timeout(),
        }
    }
}

impl OptionsConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_seconds)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_seconds)
    }
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_webhook_base() -> String {
    "https://open.feishu.cn/open-apis/bot/v2/hook".to_string()
}

fn default_image_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_video_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_caption_chars() -> usize {
    1024
}

fn default_media_group_size() -> usize {
    10
}

fn default_max_download_attempts() -> u32 {
    10
}

fn default_batches_per_group() -> usize {
    1
}

fn default_window_days() -> u32 {
    7
}

fn default_error_excerpt_chars() -> usize {
    50
}

fn default_alert_body_chars() -> usize {
    200
}

fn default_download_timeout() -> u64 {
    30
}

fn default_publish_timeout() -> u64 {
    120
}

fn default_alert_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let mut config: Config = toml::from_str(&content)?;

        // An empty key means alerts are off, same as on the command line.
        config.alert.lark_key = config.alert.lark_key.take().filter(|k| !k.trim().is_empty());

        Ok(config)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }

    /// Get the effective root of the date-bucketed item files.
    pub fn output_directory(&self) -> PathBuf {
        self.options
            .output_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.limits.image_bytes, 10 * 1024 * 1024);
        assert_eq!(config.limits.video_bytes, 50 * 1024 * 1024);
        assert_eq!(config.limits.caption_chars, 1024);
        assert_eq!(config.limits.media_group_size, 10);
        assert_eq!(config.options.max_download_attempts, 10);
        assert_eq!(config.options.batches_per_group, 1);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert!(config.alert.lark_key.is_none());
        assert_eq!(config.download_directory(), PathBuf::from("downloads"));
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [telegram]
            bot_token = "123456:abcdef"
            chat_id = "-1001234567890"

            [limits]
            image_bytes = 1024

            [options]
            download_directory = "/data/downloads"
            "#,
        )
        .unwrap();

        assert_eq!(config.telegram.chat_id, "-1001234567890");
        assert_eq!(config.limits.max_bytes(MediaKind::Image), Some(1024));
        assert_eq!(config.limits.max_bytes(MediaKind::Video), Some(50 * 1024 * 1024));
        assert_eq!(config.limits.max_bytes(MediaKind::Space), None);
        assert_eq!(
            config.download_directory(),
            PathBuf::from("/data/downloads")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_empty_lark_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[alert]\nlark_key = \"\"\n").unwrap();
        assert!(Config::load(&path).unwrap().alert.lark_key.is_none());

        fs::write(&path, "[alert]\nlark_key = \"abc-123\"\n").unwrap();
        assert_eq!(
            Config::load(&path).unwrap().alert.lark_key.as_deref(),
            Some("abc-123")
        );
    }
}
