use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("DOCX error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Not a directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Missing column in CSV: {0}")]
    MissingColumn(String),

    #[error("No keywords found in {}", .0.display())]
    NoKeywords(PathBuf),

    #[error("{0}")]
    Other(String),
}

/// Fail early when `dir` is not an existing directory.
pub fn require_dir(dir: &std::path::Path) -> Result<(), Error> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidDirectory(dir.to_path_buf()))
    }
}
