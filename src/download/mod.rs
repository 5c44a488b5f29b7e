//! Download side of the relay.
//!
//! This module provides:
//! - The fetcher seam and its streaming HTTP implementation
//! - The per-item download state machine
//! - Run statistics

pub mod fetcher;
pub mod machine;
pub mod state;

pub use fetcher::{Fetcher, HttpFetcher};
pub use machine::{DownloadMachine, DownloadStep};
pub use state::{GlobalStats, RunStats};
