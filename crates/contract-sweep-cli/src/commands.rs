use clap::{Args, Parser, Subcommand};
use contract_sweep_core::dedupe::KeepPolicy;
use contract_sweep_core::merge::CollisionPolicy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "contract-sweep")]
#[command(about = "Organize, deduplicate and clean up a contract archive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move top-level files into per-year folders
    Organize {
        dir: Option<PathBuf>,
        /// Bucket by modification time instead of creation time
        #[arg(long)]
        by_modified: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// Copy PDFs found in "final"/"finals" folders into a destination
    CopyFinals {
        source: Option<PathBuf>,
        dest: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete all but one file of every group with identical content
    Dedupe(DedupeArgs),
    /// Report duplicate files and potential savings without deleting anything
    ScanDupes(DedupeArgs),
    /// Delete files whose names contain a keyword from the keyword CSV
    DeleteKeywords {
        dir: Option<PathBuf>,
        /// Keyword CSV; overrides the configured path
        #[arg(long)]
        keywords: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete subfolders whose names contain "draft" or "working"
    CleanSubfolders {
        dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        yes: bool,
    },
    /// Write a CSV of every file with size and dates
    Inventory {
        dir: Option<PathBuf>,
        #[arg(long, default_value = "contracts_inventory.csv")]
        output: PathBuf,
    },
    /// Write a CSV of customer folders and their subfolders
    InventoryCustomers {
        dir: Option<PathBuf>,
        #[arg(long, default_value = "data/customer_inventory.csv")]
        output: PathBuf,
        /// Also group similar customer names
        #[arg(long)]
        merge: bool,
        #[arg(long, default_value = "data/customer_merged_inventory.csv")]
        merge_output: PathBuf,
    },
    /// Summarize an inventory CSV by extension, year and size
    InventorySummary {
        #[arg(default_value = "source_contracts_inventory.csv")]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Copy PDF/DOCX contracts and extract dates and parties into a CSV
    Extract {
        source: Option<PathBuf>,
        dest: Option<PathBuf>,
    },
    /// Merge customer folders with near-identical names
    MergeFolders {
        dir: Option<PathBuf>,
        /// Similarity threshold 0-100; overrides the configured value
        #[arg(long)]
        threshold: Option<f64>,
        /// rename, skip or overwrite
        #[arg(long, default_value_t = CollisionPolicy::Rename)]
        on_collision: CollisionPolicy,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct DedupeArgs {
    pub dir: Option<PathBuf>,
    /// earliest-created, newest-modified or first-encountered
    #[arg(long, default_value_t = KeepPolicy::EarliestCreated)]
    pub keep: KeepPolicy,
    /// Only look at files directly inside the directory
    #[arg(long)]
    pub flat: bool,
}
