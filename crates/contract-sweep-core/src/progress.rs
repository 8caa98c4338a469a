/// Trait for reporting progress of a tree walk and the per-item actions that follow.
///
/// CLI implements with indicatif; library callers and tests use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_walk_start(&self, _label: &str) {}
    fn on_walk_progress(&self, _items_seen: usize, _current_path: &str) {}
    fn on_walk_complete(&self, _total_items: usize, _duration_secs: f64) {}
    fn on_hash_start(&self, _candidates: usize) {}
    fn on_hash_progress(&self, _files_hashed: usize, _total_files: usize) {}
    fn on_hash_complete(&self, _groups: usize, _duration_secs: f64) {}
    fn on_action_start(&self, _label: &str, _total: usize) {}
    fn on_action_progress(&self, _done: usize, _total: usize) {}
    fn on_action_complete(&self, _succeeded: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
