//! Error types for the media-relay application.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::MediaKind;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Item store errors
    #[error("Failed to load item store {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("Failed to save item store {}: {message}", path.display())]
    Save { path: PathBuf, message: String },

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // Publish errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("{kind} file too large ({size_mib}MB > {limit_mib}MB)")]
    FileTooLarge {
        kind: MediaKind,
        size_mib: u64,
        limit_mib: u64,
    },

    #[error("Publish returned {received} message(s) for a batch of {submitted}")]
    BatchMismatch { submitted: usize, received: usize },

    #[error("{0} item file(s) could not be processed")]
    FilesFailed(u64),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Whether this error aborts a whole run instead of being folded into an item outcome.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Load { .. } | Error::Save { .. })
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const STORE_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const SOME_FILES_FAILED: i32 = 6;
}
