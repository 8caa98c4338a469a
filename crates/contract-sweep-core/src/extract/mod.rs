pub mod fields;
pub mod text;

use crate::error::{require_dir, Error};
use crate::fsops::{self, Placement};
use crate::inventory::ensure_parent;
use crate::progress::ProgressReporter;
use crate::report::ActionSummary;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};
use walkdir::WalkDir;

pub use fields::{extract_fields, ContractFields};
pub use text::{extract_text, DocumentKind};

pub const OUTPUT_CSV: &str = "extracted_contract_data.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractRow {
    #[serde(rename = "Original File Path")]
    pub original_path: String,
    #[serde(rename = "Copied File Path")]
    pub copied_path: String,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Contract Date")]
    pub contract_date: String,
    #[serde(rename = "Effective Date")]
    pub effective_date: String,
    #[serde(rename = "Expiration Date")]
    pub expiration_date: String,
    #[serde(rename = "Party 1")]
    pub party_1: String,
    #[serde(rename = "Party 2")]
    pub party_2: String,
    #[serde(rename = "Contract Amount")]
    pub amount: String,
}

pub const CONTRACT_COLUMNS: [&str; 9] = [
    "Original File Path",
    "Copied File Path",
    "File Name",
    "Contract Date",
    "Effective Date",
    "Expiration Date",
    "Party 1",
    "Party 2",
    "Contract Amount",
];

/// PDF and DOCX files under `source`, skipping anything inside `exclude`.
pub fn find_documents(source: &Path, exclude: &Path) -> Vec<PathBuf> {
    WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(exclude))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Error walking {}: {}", source.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| DocumentKind::from_path(path).is_some())
        .collect()
}

/// Copy each document into `dest`, pull fields from its text, and write one
/// CSV row per document to `dest/extracted_contract_data.csv`.
/// A document whose text cannot be read still gets a row with blank fields.
pub fn process_contracts(
    source: &Path,
    dest: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<(Vec<ContractRow>, ActionSummary), Error> {
    require_dir(source)?;
    fs::create_dir_all(dest)?;
    let start = Instant::now();

    let documents = find_documents(&fs::canonicalize(source)?, &fs::canonicalize(dest)?);
    let mut summary = ActionSummary::new("Contract Extraction Summary");
    summary.matched = documents.len();
    let mut rows = Vec::with_capacity(documents.len());

    reporter.on_action_start("Extracting contracts", documents.len());
    for (idx, document) in documents.iter().enumerate() {
        info!("Processing: {}", document.display());
        reporter.on_action_progress(idx + 1, documents.len());

        let file_name = document
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let copied = match fsops::place_copy(dest, &file_name, document) {
            Ok(Placement::Free(target)) => fsops::copy_preserving(document, &target).map(|_| target),
            Ok(Placement::AlreadyPresent(existing)) => Ok(existing),
            Err(e) => Err(e),
        };
        let copied = match copied {
            Ok(path) => path,
            Err(e) => {
                summary.record_failure(document, e);
                continue;
            }
        };

        let fields = match extract_text(&copied) {
            Ok(text) => extract_fields(&text),
            Err(e) => {
                error!("Error reading {}: {}", copied.display(), e);
                ContractFields::default()
            }
        };

        rows.push(ContractRow {
            original_path: document.to_string_lossy().into_owned(),
            copied_path: copied.to_string_lossy().into_owned(),
            file_name,
            contract_date: fields.contract_date,
            effective_date: fields.effective_date,
            expiration_date: fields.expiration_date,
            party_1: fields.party_1,
            party_2: fields.party_2,
            amount: fields.amount,
        });
        summary.succeeded += 1;
    }

    let output = dest.join(OUTPUT_CSV);
    write_contract_csv(&rows, &output)?;
    info!("Extraction complete. Data saved to {}", output.display());

    summary.elapsed = start.elapsed();
    reporter.on_action_complete(summary.succeeded, summary.failed.len(), summary.elapsed.as_secs_f64());
    Ok((rows, summary))
}

pub fn write_contract_csv(rows: &[ContractRow], output: &Path) -> Result<(), Error> {
    ensure_parent(output)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(output)?;
    writer.write_record(CONTRACT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
