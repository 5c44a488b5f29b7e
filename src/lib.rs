//! Media Relay - republish downloaded post media into a Telegram chat
//!
//! This library reads JSON item files written by a post collector, downloads
//! the media each item references and publishes it to a Telegram chat, one
//! media group per originating post. Failures are recorded on the items
//! themselves so that later runs resume where earlier ones stopped.
//!
//! # Features
//!
//! - Per-item download retries up to a fixed ceiling
//! - Media groups with a caption built from the post
//! - Per-kind size limits with an oversize file never blocking its siblings
//! - At most one Lark alert per unrecoverable item condition
//! - Date-bucketed window runs over the last few days
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use media_relay::{
//!     alert::DisabledAlerts, api::TelegramApi, clock::SystemClock, download::HttpFetcher,
//!     runner::{run_one, Relay}, Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let fetcher = HttpFetcher::new(config.options.download_timeout(), false)?;
//!     let publisher = TelegramApi::new(
//!         &config.telegram.api_base,
//!         &config.telegram.bot_token,
//!         &config.telegram.chat_id,
//!         config.options.publish_timeout(),
//!     )?;
//!     let relay = Relay {
//!         config: &config,
//!         fetcher: &fetcher,
//!         publisher: &publisher,
//!         alerts: &DisabledAlerts,
//!         clock: &SystemClock,
//!     };
//!
//!     let stats = run_one(&relay, Path::new("output/2024-05/2024-05-01.json"), Path::new("downloads")).await?;
//!     println!("published {}", stats.published);
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod output;
pub mod runner;
pub mod store;
pub mod text;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use api::TelegramApi;
pub use config::{Config, RunMode};
pub use download::{GlobalStats, RunStats};
pub use error::{Error, Result};
pub use runner::{run_many, run_one, Relay};
pub use store::{ContentItem, ItemStore, MediaKind};
