//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, RunMode};

/// Media relay CLI.
#[derive(Parser, Debug)]
#[command(
    name = "media-relay",
    version,
    about = "Relay downloaded post media into a Telegram chat",
    long_about = "Downloads the media referenced by a JSON item file and republishes it to a \
                  Telegram chat, one media group per post.\n\n\
                  With no STATE_FILE, processes the date-bucketed files of the last few days, \
                  oldest first."
)]
pub struct Args {
    /// Item file to process. Omit to process the recent date-bucketed files.
    pub state_file: Option<PathBuf>,

    /// Directory downloaded files are written to.
    pub download_dir: Option<PathBuf>,

    /// Telegram bot token.
    #[arg(long = "bot-token", env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram chat id or @channel.
    #[arg(long = "chat-id", env = "CHAT_ID")]
    pub chat_id: Option<String>,

    /// Lark webhook key for alerts.
    #[arg(long = "lark-key", env = "LARK_KEY", hide_env_values = true)]
    pub lark_key: Option<String>,

    /// Root of the date-bucketed item files.
    #[arg(short = 'o', long = "output-dir")]
    pub output_directory: Option<PathBuf>,

    /// Number of past days processed when no STATE_FILE is given.
    #[arg(long)]
    pub days: Option<u32>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(token) = &self.bot_token {
            config.telegram.bot_token = token.clone();
        }

        if let Some(chat_id) = &self.chat_id {
            config.telegram.chat_id = chat_id.clone();
        }

        if let Some(key) = &self.lark_key {
            config.alert.lark_key = Some(key.clone()).filter(|k| !k.is_empty());
        }

        if let Some(dir) = &self.download_dir {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(dir) = &self.output_directory {
            config.options.output_directory = Some(dir.clone());
        }

        if let Some(days) = self.days {
            config.options.window_days = days;
        }
    }

    /// Decide what this invocation processes.
    pub fn run_mode(&self, config: &Config) -> RunMode {
        match &self.state_file {
            Some(path) => RunMode::Single {
                state_path: path.clone(),
                download_dir: self.download_dir.clone(),
            },
            None => RunMode::Window {
                days: config.options.window_days,
            },
        }
    }
}
