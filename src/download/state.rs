//! Run statistics.

use std::path::PathBuf;

/// Counters for one item file.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub state_path: Option<PathBuf>,

    pub items: u64,
    pub groups: u64,

    // Download side
    pub downloaded: u64,
    pub download_failed: u64,
    pub exhausted: u64,

    // Upload side
    pub published: u64,
    pub publish_failed: u64,
    pub oversize: u64,
    pub blocked: u64,
    pub deferred: u64,
}

impl RunStats {
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            state_path: Some(state_path),
            ..Default::default()
        }
    }

    /// Failures recorded during this run, terminal or not.
    pub fn total_failed(&self) -> u64 {
        self.download_failed + self.exhausted + self.publish_failed + self.oversize
    }
}

/// Statistics across every item file of a window run.
#[derive(Debug, Default)]
pub struct GlobalStats {
    pub downloaded: u64,
    pub published: u64,
    pub failed: u64,
    pub deferred: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
}

impl GlobalStats {
    /// Add statistics from one item file.
    pub fn add_run_stats(&mut self, stats: &RunStats) {
        self.downloaded += stats.downloaded;
        self.published += stats.published;
        self.failed += stats.total_failed();
        self.deferred += stats.deferred;
        self.files_processed += 1;
    }

    /// Mark an item file as missing.
    pub fn mark_file_skipped(&mut self) {
        self.files_skipped += 1;
    }

    /// Mark an item file as failed to load or save.
    pub fn mark_file_failed(&mut self) {
        self.files_failed += 1;
    }
}
