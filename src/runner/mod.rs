//! Run orchestration.
//!
//! This module provides:
//! - The set of collaborators one run works with
//! - Processing of a single item file
//! - Processing of the date-bucketed window of item files

pub mod single;
pub mod window;

pub use single::run_one;
pub use window::run_many;

use crate::alert::AlertChannel;
use crate::clock::Clock;
use crate::config::Config;
use crate::download::Fetcher;
use crate::upload::Publisher;

/// Configuration and collaborators shared by every run of one invocation.
pub struct Relay<'a> {
    pub config: &'a Config,
    pub fetcher: &'a dyn Fetcher,
    pub publisher: &'a dyn Publisher,
    pub alerts: &'a dyn AlertChannel,
    pub clock: &'a dyn Clock,
}
