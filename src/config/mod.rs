//! Configuration module for media-relay.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument parsing and merging
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{AlertConfig, Config, LimitsConfig, OptionsConfig, TelegramConfig};
pub use modes::RunMode;
pub use validation::validate_config;
