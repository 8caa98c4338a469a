use contract_sweep_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Walk phase: spinner (unknown total upfront)
/// - Hash and action phases: progress bar
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn update_bar(&self, done: usize, total: usize) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            if pb.length() != Some(total as u64) {
                pb.set_length(total as u64);
            }
            pb.set_position(done as u64);
        }
    }

    fn bar(label: &str, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {pos}/{len} ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars(TICKS),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_walk_start(&self, label: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars(TICKS),
        );
        pb.set_message(format!("{}...", label));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_walk_progress(&self, items_seen: usize, _current_path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Scanning... {} files found", items_seen));
        }
    }

    fn on_walk_complete(&self, total_items: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_items, duration_secs
        );
    }

    fn on_hash_start(&self, candidates: usize) {
        self.set_bar(Self::bar("Hashing", candidates));
    }

    fn on_hash_progress(&self, files_hashed: usize, total_files: usize) {
        self.update_bar(files_hashed, total_files);
    }

    fn on_hash_complete(&self, groups: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Hash complete: {} duplicate groups in {:.2}s",
            groups, duration_secs
        );
    }

    fn on_action_start(&self, label: &str, total: usize) {
        if total == 0 {
            return;
        }
        self.set_bar(Self::bar(label, total));
    }

    fn on_action_progress(&self, done: usize, total: usize) {
        self.update_bar(done, total);
    }

    fn on_action_complete(&self, succeeded: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Done: {} succeeded, {} failed in {:.2}s",
            succeeded, failed, duration_secs
        );
    }
}
