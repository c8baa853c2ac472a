//! Status line formatting and the progress display

use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use isorip_core::{format_blocks, CopySummary, ProgressSnapshot, UnitCeiling};
use std::time::Duration;

/// Timestamp format for the banner and summary
const TIMESTAMP_FORMAT: &str = "%d/%m/%y %T";

/// Line printed before the copy starts
pub fn banner_line(total_blocks: Option<u64>, started_at: DateTime<Local>) -> String {
    let size = match total_blocks {
        Some(blocks) => format_blocks(blocks, UnitCeiling::Mib, false),
        None => "unknown size".to_string(),
    };
    format!(
        "Copying {}, started at {}",
        size,
        started_at.format(TIMESTAMP_FORMAT)
    )
}

/// One-line status for a progress sample
pub fn progress_line(progress: &ProgressSnapshot) -> String {
    format!(
        "Copied {} ({}) | Rate {} | {} bad blocks | Time remaining {}",
        progress.copied_display(),
        progress.percent_display(),
        progress.rate_display(),
        progress.error_blocks,
        progress.eta_display()
    )
}

/// Line printed once the copy completes
pub fn summary_line(summary: &CopySummary) -> String {
    format!(
        "Copied {} in {} at a rate of {}, {} bad blocks, completed at {}",
        summary.copied_display(),
        summary.elapsed_display(),
        summary.average_display(),
        summary.error_blocks,
        summary.completed_display()
    )
}

/// Create the spinner that carries the status line
pub fn create_copy_progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Reading...");
    pb.enable_steady_tick(Duration::from_millis(120));

    pb
}
