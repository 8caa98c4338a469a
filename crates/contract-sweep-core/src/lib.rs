pub mod cleaner;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod finals;
pub mod fsops;
pub mod fuzzy;
pub mod hasher;
pub mod inventory;
pub mod keywords;
pub mod merge;
pub mod organize;
pub mod progress;
pub mod report;
pub mod scanner;

pub use config::AppConfig;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{format_size, ActionSummary};
