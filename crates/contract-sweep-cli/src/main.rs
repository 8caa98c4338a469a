mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Local};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, DedupeArgs};
use contract_sweep_core::cleaner::{self, CleanerOptions};
use contract_sweep_core::dedupe::{self, DedupeOptions, DuplicateReport};
use contract_sweep_core::finals::{self, CopyFinalsOptions};
use contract_sweep_core::inventory::{self, customers, summary};
use contract_sweep_core::merge::{self, CollisionPolicy, MergeOptions};
use contract_sweep_core::organize::{self, OrganizeOptions, TimestampSource};
use contract_sweep_core::{extract, format_size, keywords, ActionSummary, AppConfig};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let guard = logging::init_logger();
    let code = run(Cli::parse());

    // Flush the file log before exiting.
    drop(guard);
    process::exit(code);
}

/// Dispatch one command and map its outcome to a process exit code.
fn run(args: Cli) -> i32 {
    let config = match contract_sweep_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return 1;
        }
    };

    let result = match args.command {
        Some(Commands::Organize {
            dir,
            by_modified,
            dry_run,
        }) => run_organize(&config, dir, by_modified, dry_run),
        Some(Commands::CopyFinals {
            source,
            dest,
            dry_run,
        }) => run_copy_finals(&config, source, dest, dry_run),
        Some(Commands::Dedupe(dedupe_args)) => run_dedupe(&config, dedupe_args),
        Some(Commands::ScanDupes(dedupe_args)) => run_scan_dupes(&config, dedupe_args),
        Some(Commands::DeleteKeywords {
            dir,
            keywords,
            dry_run,
            yes,
        }) => run_delete_keywords(&config, dir, keywords, dry_run, yes),
        Some(Commands::CleanSubfolders { dir, dry_run, yes }) => {
            run_clean_subfolders(&config, dir, dry_run, yes)
        }
        Some(Commands::Inventory { dir, output }) => run_inventory(&config, dir, &output),
        Some(Commands::InventoryCustomers {
            dir,
            output,
            merge,
            merge_output,
        }) => run_inventory_customers(&config, dir, &output, merge.then_some(merge_output.as_path())),
        Some(Commands::InventorySummary { csv, top }) => run_inventory_summary(&csv, top),
        Some(Commands::Extract { source, dest }) => run_extract(&config, source, dest),
        Some(Commands::MergeFolders {
            dir,
            threshold,
            on_collision,
            dry_run,
            yes,
        }) => run_merge_folders(&config, dir, threshold, on_collision, dry_run, yes),
        Some(Commands::PrintConfig) => config
            .to_toml()
            .map(|toml| println!("{}", toml))
            .map_err(anyhow::Error::from),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    }
}

fn root_dir(config: &AppConfig, explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let defaulted = explicit.is_none();
    let dir = config
        .resolve_root(explicit)
        .ok_or_else(|| anyhow!("No directory given and no default_root configured"))?;
    if defaulted {
        info!("Using configured directory: {}", dir.display());
    }
    Ok(dir)
}

fn destination_dir(config: &AppConfig, explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let defaulted = explicit.is_none();
    let dir = config
        .resolve_destination(explicit)
        .ok_or_else(|| anyhow!("No destination given and no default_destination configured"))?;
    if defaulted {
        info!("Using configured destination: {}", dir.display());
    }
    Ok(dir)
}

fn print_summary(summary: &ActionSummary) {
    println!();
    info!(
        "{}: {} matched, {} succeeded, {} skipped, {} failed in {}",
        summary.title,
        format!("{}", summary.matched).cyan(),
        format!("{}", summary.succeeded).green(),
        format!("{}", summary.skipped).yellow(),
        format!("{}", summary.failed.len()).red(),
        format!("{:.2}s", summary.elapsed.as_secs_f64()).green(),
    );
    if summary.bytes_freed > 0 {
        info!("{} freed", format_size(summary.bytes_freed).green());
    }
}

fn run_organize(
    config: &AppConfig,
    dir: Option<PathBuf>,
    by_modified: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let options = OrganizeOptions {
        timestamp: if by_modified {
            TimestampSource::Modified
        } else {
            TimestampSource::Created
        },
        dry_run,
    };
    let summary = organize::organize_by_year(&dir, &options, &CliReporter::new())?;
    print_summary(&summary);
    Ok(())
}

fn run_copy_finals(
    config: &AppConfig,
    source: Option<PathBuf>,
    dest: Option<PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let source = root_dir(config, source)?;
    let dest = destination_dir(config, dest)?;
    let options = CopyFinalsOptions {
        folder_names: config.final_folder_names.clone(),
        dry_run,
    };
    let summary = finals::copy_final_pdfs(&source, &dest, &options, &CliReporter::new())?;
    print_summary(&summary);
    Ok(())
}

fn dedupe_options(config: &AppConfig, args: &DedupeArgs) -> DedupeOptions {
    let mut options = DedupeOptions {
        keep: args.keep,
        ..DedupeOptions::default()
    };
    options.walk.flat = args.flat;
    options.walk.ignore_globs = config.ignore_patterns.clone();
    options
}

fn print_duplicate_report(report: &DuplicateReport) {
    println!();
    info!(
        "{} files scanned, {} duplicate groups, {} redundant files, {} reclaimable",
        format!("{}", report.total_files).cyan(),
        format!("{}", report.sets.len()).red(),
        format!("{}", report.redundant_count()).red(),
        format_size(report.reclaimable_bytes()).red(),
    );
    for set in &report.sets {
        println!(
            "{} ({} each)",
            set.keep.path.display().to_string().green(),
            format_size(set.file_size)
        );
        for file in &set.redundant {
            println!("  {} {}", "duplicate:".red(), file.path.display());
        }
    }
}

fn run_scan_dupes(config: &AppConfig, args: DedupeArgs) -> anyhow::Result<()> {
    let root = root_dir(config, args.dir.clone())?;
    let options = dedupe_options(config, &args);
    let report = dedupe::scan_duplicates(&root, &options, &CliReporter::new())?;
    print_duplicate_report(&report);

    if !report.name_groups.is_empty() {
        println!("\n{}", "Files with similar names (newest first):".bold());
        for group in &report.name_groups {
            let content = match group.identical_content {
                Some(true) => "identical content".green(),
                Some(false) => "different content".yellow(),
                None => "content not compared".dimmed(),
            };
            println!("{} ({} files, {})", group.base_name, group.files.len(), content);
            for (idx, file) in group.files.iter().enumerate() {
                let marker = if idx == 0 { "newest".green() } else { "older ".dimmed() };
                println!(
                    "  {} {}  {}  modified {}",
                    marker,
                    file.path.display(),
                    format_size(file.size),
                    DateTime::<Local>::from(file.modified).format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        info!(
            "{} name groups, potential space to review: {}",
            format!("{}", report.name_groups.len()).cyan(),
            format_size(report.reviewable_bytes()).yellow(),
        );

        println!("\n{}", "Biggest name groups to review:".bold());
        for (idx, group) in report.biggest_name_groups(3).iter().enumerate() {
            println!(
                "  {}. '{}' could save {}",
                idx + 1,
                group.base_name,
                format_size(group.reviewable_bytes()).green()
            );
        }
    }

    let biggest = report.biggest_opportunities(3);
    if !biggest.is_empty() {
        println!("\n{}", "Biggest savings opportunities:".bold());
        for set in biggest {
            println!(
                "  {} x{} -> {}",
                set.keep.path.display(),
                set.redundant.len() + 1,
                format_size(set.reclaimable_bytes()).green()
            );
        }
    }
    Ok(())
}

fn run_dedupe(config: &AppConfig, args: DedupeArgs) -> anyhow::Result<()> {
    let root = root_dir(config, args.dir.clone())?;
    let options = dedupe_options(config, &args);
    info!("Keeping one file per group ({})", options.keep);
    let (report, summary) = dedupe::deduplicate(&root, &options, &CliReporter::new())?;
    print_duplicate_report(&report);
    print_summary(&summary);
    summary.append_markdown(Path::new(&config.summary_log));
    Ok(())
}

fn run_delete_keywords(
    config: &AppConfig,
    dir: Option<PathBuf>,
    keywords_csv: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let keywords_csv = keywords_csv.unwrap_or_else(|| PathBuf::from(&config.keywords_csv));
    let (keywords, files) = keywords::plan_keyword_deletion(&dir, &keywords_csv)?;

    if files.is_empty() {
        info!("No files found matching the keywords {:?}", keywords);
        return Ok(());
    }

    println!("Found {} files matching keywords:", files.len());
    for file in &files {
        println!("  {}", file.display());
    }

    if dry_run {
        info!("Dry run: {} files would be deleted", files.len());
        return Ok(());
    }
    if !yes && !prompt_confirm("Do you want to delete these files?", Some(false))? {
        info!("Deletion cancelled.");
        return Ok(());
    }

    let summary = keywords::delete_files(&files, &CliReporter::new());
    print_summary(&summary);
    summary.append_markdown(Path::new(&config.summary_log));
    Ok(())
}

fn run_clean_subfolders(
    config: &AppConfig,
    dir: Option<PathBuf>,
    dry_run: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let options = CleanerOptions {
        substrings: config.cleaner_substrings.clone(),
        dry_run,
    };

    if !dry_run && !yes {
        let targets = cleaner::find_target_folders(&dir, &options.substrings);
        if targets.is_empty() {
            info!("No folders match {:?}", options.substrings);
            return Ok(());
        }
        println!("Found {} folders to delete:", targets.len());
        for target in &targets {
            println!("  {}", target.display());
        }
        if !prompt_confirm("Delete these folders and everything in them?", Some(false))? {
            info!("Cleanup cancelled.");
            return Ok(());
        }
    }

    let summary = cleaner::delete_target_subfolders(&dir, &options, &CliReporter::new())?;
    print_summary(&summary);
    if !dry_run {
        summary.append_markdown(Path::new(&config.summary_log));
    }
    Ok(())
}

fn run_inventory(config: &AppConfig, dir: Option<PathBuf>, output: &Path) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let rows = inventory::build_inventory(&dir, &CliReporter::new())?;
    inventory::write_inventory_csv(&rows, output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "Inventory of {} files saved to {}",
        format!("{}", rows.len()).cyan(),
        output.display()
    );
    Ok(())
}

fn run_inventory_customers(
    config: &AppConfig,
    dir: Option<PathBuf>,
    output: &Path,
    merge_output: Option<&Path>,
) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let data = customers::inventory_customers(&dir)?;
    customers::write_customer_csv(&data, output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "{} customers saved to {}",
        format!("{}", data.len()).cyan(),
        output.display()
    );

    if let Some(merge_output) = merge_output {
        let groups = customers::group_customer_names(&data, config.fuzzy_threshold);
        customers::write_merge_csv(&groups, merge_output)
            .with_context(|| format!("writing {}", merge_output.display()))?;
        info!(
            "{} customer groups saved to {}",
            format!("{}", groups.len()).cyan(),
            merge_output.display()
        );
    }
    Ok(())
}

fn run_inventory_summary(csv: &Path, top: usize) -> anyhow::Result<()> {
    let summary = summary::summarize_csv(csv, top)?;
    println!("{}", summary.render());
    Ok(())
}

fn run_extract(
    config: &AppConfig,
    source: Option<PathBuf>,
    dest: Option<PathBuf>,
) -> anyhow::Result<()> {
    let source = root_dir(config, source)?;
    let dest = destination_dir(config, dest)?;
    let (rows, summary) = extract::process_contracts(&source, &dest, &CliReporter::new())?;
    let with_parties = rows.iter().filter(|r| !r.party_1.is_empty()).count();
    info!(
        "{} contracts processed, {} with parties found",
        format!("{}", rows.len()).cyan(),
        format!("{}", with_parties).green(),
    );
    print_summary(&summary);
    Ok(())
}

fn run_merge_folders(
    config: &AppConfig,
    dir: Option<PathBuf>,
    threshold: Option<f64>,
    collision: CollisionPolicy,
    dry_run: bool,
    yes: bool,
) -> anyhow::Result<()> {
    let dir = root_dir(config, dir)?;
    let options = MergeOptions {
        threshold: threshold.unwrap_or(config.fuzzy_threshold),
        collision,
        dry_run,
    };
    if !(0.0..=100.0).contains(&options.threshold) {
        return Err(anyhow!("Threshold must be between 0 and 100, got {}", options.threshold));
    }

    let plan = merge::plan_merges(&dir, options.threshold)?;
    if plan.is_empty() {
        info!("No similar folders found at threshold {}", options.threshold);
        return Ok(());
    }
    for group in &plan {
        println!("{} <- {:?}", group.canonical.green(), group.others);
    }
    if !dry_run && !yes && !prompt_confirm("Merge these folders?", Some(false))? {
        info!("Merge cancelled.");
        return Ok(());
    }

    let (_, summary) = merge::merge_folders(&dir, &options, &CliReporter::new())?;
    print_summary(&summary);
    if summary.skipped > 0 {
        warn!("{} entries left in place because of name collisions", summary.skipped);
    }
    if !dry_run {
        summary.append_markdown(Path::new(&config.summary_log));
    }
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        if let Some(answer) = parse_confirm(&input, default) {
            return Ok(answer);
        }
    }
}

/// `None` means the answer was not understood and the prompt should repeat.
fn parse_confirm(input: &str, default: Option<bool>) -> Option<bool> {
    match input.trim().to_uppercase().as_str() {
        "Y" | "YES" => Some(true),
        "N" | "NO" => Some(false),
        "" => default,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_confirm() {
        assert_eq!(parse_confirm("y\n", Some(false)), Some(true));
        assert_eq!(parse_confirm("Yes\n", Some(false)), Some(true));
        assert_eq!(parse_confirm(" NO \n", Some(true)), Some(false));
        assert_eq!(parse_confirm("\n", Some(false)), Some(false));
        assert_eq!(parse_confirm("\n", None), None);
        assert_eq!(parse_confirm("maybe\n", Some(true)), None);
    }

    #[test]
    fn test_run_returns_exit_code_instead_of_exiting() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let args = Cli::parse_from(["contract-sweep", "organize", missing.to_str().unwrap()]);
        assert_eq!(run(args), 1);

        fs::write(tmp.path().join("a.pdf"), "a").unwrap();
        let args = Cli::parse_from([
            "contract-sweep",
            "organize",
            "--dry-run",
            tmp.path().to_str().unwrap(),
        ]);
        assert_eq!(run(args), 0);
        assert!(tmp.path().join("a.pdf").exists());
    }
}
