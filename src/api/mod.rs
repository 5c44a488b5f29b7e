//! Telegram Bot API module.
//!
//! This module provides:
//! - HTTP client publishing text, single files and media groups
//! - API response types

pub mod client;
pub mod types;

pub use client::TelegramApi;
pub use types::*;
