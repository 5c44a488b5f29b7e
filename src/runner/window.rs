//! Processing of the date-bucketed window of item files.

use chrono::NaiveDate;

use crate::download::GlobalStats;
use crate::fs::window_state_paths;
use crate::runner::{run_one, Relay};

/// Run every item file from `days` days ago up to `today`, oldest first.
///
/// Missing files are skipped. A file that fails to load or save is counted
/// and the window moves on; callers decide what a non-zero
/// [`GlobalStats::files_failed`] means.
pub async fn run_many(relay: &Relay<'_>, today: NaiveDate, days: u32) -> GlobalStats {
    let output_dir = relay.config.output_directory();
    let download_dir = relay.config.download_directory();
    let mut global = GlobalStats::default();

    for state_path in window_state_paths(&output_dir, today, days) {
        if !state_path.exists() {
            tracing::debug!("No item file at {}", state_path.display());
            global.mark_file_skipped();
            continue;
        }

        tracing::info!("Processing {}", state_path.display());
        match run_one(relay, &state_path, &download_dir).await {
            Ok(stats) => global.add_run_stats(&stats),
            Err(e) => {
                tracing::error!("Failed to process {}: {}", state_path.display(), e);
                global.mark_file_failed();
            }
        }
    }

    global
}
