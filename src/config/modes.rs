//! Run mode definitions.

use std::fmt;
use std::path::PathBuf;

/// What a single invocation processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// One item file, with an optional download directory override.
    Single {
        state_path: PathBuf,
        download_dir: Option<PathBuf>,
    },
    /// Date-bucketed item files for the last `days` days plus today, oldest first.
    Window { days: u32 },
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Single { state_path, .. } => write!(f, "single ({})", state_path.display()),
            RunMode::Window { days } => write!(f, "window (last {} days)", days),
        }
    }
}
