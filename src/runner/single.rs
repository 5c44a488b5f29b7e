//! Processing of one item file.

use std::path::Path;

use crate::alert::NotifierGate;
use crate::download::{DownloadMachine, DownloadStep, RunStats};
use crate::error::Result;
use crate::fs::ensure_dir;
use crate::runner::Relay;
use crate::store::{group_by_post, ContentItem, ItemStore};
use crate::upload::Uploader;

/// Download and publish everything pending in the item file at `state_path`.
///
/// Groups are handled one at a time: every member is downloaded, then the
/// group is published. The file is written back once, at the end. Only a
/// failure to load or save the file (or to create `download_dir`) ends the
/// run early; it is alerted once and returned.
pub async fn run_one(relay: &Relay<'_>, state_path: &Path, download_dir: &Path) -> Result<RunStats> {
    let gate = NotifierGate::new(
        relay.alerts,
        relay.clock,
        relay.config.options.error_excerpt_chars,
    );
    let store = ItemStore::new(state_path);

    let mut items = match prepare(&store, download_dir) {
        Ok(items) => items,
        Err(e) => {
            gate.report_run_failure(state_path, &e).await;
            return Err(e);
        }
    };

    let stats = process_items(relay, &mut items, state_path, download_dir).await;

    if let Err(e) = store.save(&items) {
        gate.report_run_failure(state_path, &e).await;
        return Err(e);
    }
    tracing::info!(
        "Finished {}: {} published, {} downloaded, {} failed",
        state_path.display(),
        stats.published,
        stats.downloaded,
        stats.total_failed()
    );

    Ok(stats)
}

fn prepare(store: &ItemStore, download_dir: &Path) -> Result<Vec<ContentItem>> {
    let items = store.load()?;
    ensure_dir(download_dir)?;
    Ok(items)
}

async fn process_items(
    relay: &Relay<'_>,
    items: &mut [ContentItem],
    state_path: &Path,
    download_dir: &Path,
) -> RunStats {
    let options = &relay.config.options;
    let machine = DownloadMachine::new(
        relay.fetcher,
        relay.clock,
        download_dir,
        options.max_download_attempts,
        options.error_excerpt_chars,
    );
    let uploader = Uploader::new(
        relay.publisher,
        relay.alerts,
        relay.clock,
        relay.config,
        download_dir,
    );

    let groups = group_by_post(items);
    let mut stats = RunStats::new(state_path.to_path_buf());
    stats.items = items.len() as u64;
    stats.groups = groups.len() as u64;

    for group in &groups {
        for &idx in &group.members {
            match machine.process(&mut items[idx]).await {
                DownloadStep::Downloaded(_) => stats.downloaded += 1,
                DownloadStep::Failed(_) => stats.download_failed += 1,
                DownloadStep::Exhausted => stats.exhausted += 1,
                DownloadStep::Skipped | DownloadStep::Special | DownloadStep::Blocked => {}
            }
        }

        uploader.process_group(items, group, &mut stats).await;
    }

    stats
}
