//! Configuration validation logic.

use regex::Regex;

use crate::config::loader::{Config, LimitsConfig, OptionsConfig};
use crate::error::{Error, Result};

/// Largest media group the Bot API accepts.
const MAX_MEDIA_GROUP_SIZE: usize = 10;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_bot_token(&config.telegram.bot_token)?;
    validate_chat_id(&config.telegram.chat_id)?;
    validate_limits(&config.limits)?;
    validate_options(&config.options)?;

    Ok(())
}

/// Validate the bot token.
pub fn validate_bot_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::MissingConfig(
            "bot_token (set BOT_TOKEN or [telegram].bot_token)".to_string(),
        ));
    }

    let token_pattern = Regex::new(r"^\d+:[A-Za-z0-9_-]+$").unwrap();
    if !token_pattern.is_match(token) {
        return Err(Error::ConfigValidation {
            field: "bot_token".to_string(),
            message: "Token must look like '<bot id>:<secret>'".to_string(),
        });
    }

    Ok(())
}

/// Validate the target chat.
pub fn validate_chat_id(chat_id: &str) -> Result<()> {
    if chat_id.is_empty() {
        return Err(Error::MissingConfig(
            "chat_id (set CHAT_ID or [telegram].chat_id)".to_string(),
        ));
    }

    let chat_pattern = Regex::new(r"^(-?\d+|@[A-Za-z][A-Za-z0-9_]{4,})$").unwrap();
    if !chat_pattern.is_match(chat_id) {
        return Err(Error::ConfigValidation {
            field: "chat_id".to_string(),
            message: format!(
                "Chat '{}' must be a numeric id or an @channel username",
                chat_id
            ),
        });
    }

    Ok(())
}

/// Validate platform limits.
pub fn validate_limits(limits: &LimitsConfig) -> Result<()> {
    if limits.image_bytes == 0 || limits.video_bytes == 0 {
        return Err(Error::ConfigValidation {
            field: "limits".to_string(),
            message: "Size limits must be greater than zero".to_string(),
        });
    }

    // Room for the ellipsis plus at least one character.
    if limits.caption_chars < 4 {
        return Err(Error::ConfigValidation {
            field: "caption_chars".to_string(),
            message: format!("Caption limit too small (got {})", limits.caption_chars),
        });
    }

    if !(2..=MAX_MEDIA_GROUP_SIZE).contains(&limits.media_group_size) {
        return Err(Error::ConfigValidation {
            field: "media_group_size".to_string(),
            message: format!(
                "Media group size must be between 2 and {} (got {})",
                MAX_MEDIA_GROUP_SIZE, limits.media_group_size
            ),
        });
    }

    Ok(())
}

/// Validate run options.
/// Longest window a single run may cover, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

pub fn validate_options(options: &OptionsConfig) -> Result<()> {
    if options.max_download_attempts == 0 {
        return Err(Error::ConfigValidation {
            field: "max_download_attempts".to_string(),
            message: "At least one download attempt is required".to_string(),
        });
    }

    if options.window_days > MAX_WINDOW_DAYS {
        return Err(Error::ConfigValidation {
            field: "window_days".to_string(),
            message: format!("At most {} days can be processed in one run", MAX_WINDOW_DAYS),
        });
    }

    if options.batches_per_group == 0 {
        return Err(Error::ConfigValidation {
            field: "batches_per_group".to_string(),
            message: "At least one batch per group is required".to_string(),
        });
    }

    Ok(())
}
