//! Filesystem module.
//!
//! Provides:
//! - Download locations for items
//! - Date-bucketed item file paths

pub mod paths;

pub use paths::{dated_state_path, ensure_dir, media_path, validate_file_name, window_state_paths};
