//! Batch presentation: progress bar while running, summary table afterwards.

use std::path::Path;

use scribe_core::BatchSummary;

/// Create a progress bar for directory runs. Length is set once discovery finishes.
pub fn create_progress_bar() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a run.
pub fn print_summary(summary: &BatchSummary, output_dir: &Path) {
    let elapsed = summary.elapsed.as_secs_f64();
    let rate = if elapsed > 0.0 {
        summary.total() as f64 / elapsed
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded.len());
    if !summary.failed.is_empty() {
        eprintln!("    Failed:       {:>8}", summary.failed.len());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed);
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");
    if !summary.succeeded.is_empty() {
        eprintln!("    Results in {}", output_dir.display());
    }
    for failure in &summary.failed {
        eprintln!("    FAILED {}: {}", failure.image.display(), failure.error);
    }
}
