//! Statistics reporting.

use console::style;

use crate::download::{GlobalStats, RunStats};

/// Print statistics for one item file.
pub fn print_run_stats(stats: &RunStats) {
    let name = stats
        .state_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!();
    println!("{}", style(format!("Statistics for {}:", name)).bold());
    println!("  Items:      {} in {} post(s)", stats.items, stats.groups);
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Published:  {}", style(stats.published).green());
    if stats.total_failed() > 0 {
        println!(
            "  Failed:     {} (download {}, exhausted {}, publish {}, too large {})",
            style(stats.total_failed()).red(),
            stats.download_failed,
            stats.exhausted,
            stats.publish_failed,
            stats.oversize
        );
    }
    if stats.blocked > 0 {
        println!("  Blocked:    {}", style(stats.blocked).yellow());
    }
    if stats.deferred > 0 {
        println!("  Deferred:   {} (next run)", style(stats.deferred).yellow());
    }
}

/// Print statistics across every item file of a window run.
pub fn print_global_stats(stats: &GlobalStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Files processed: {}", stats.files_processed);
    println!("  Files missing:   {}", stats.files_skipped);
    if stats.files_failed > 0 {
        println!("  Files failed:    {}", style(stats.files_failed).red());
    }
    println!("  Downloaded: {}", stats.downloaded);
    println!("  Published:  {}", style(stats.published).green());
    println!("  Failed:     {}", stats.failed);
    println!("  Deferred:   {}", stats.deferred);
    println!("{}", style("═".repeat(50)).dim());
}
