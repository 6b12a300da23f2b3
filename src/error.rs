use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for CRM file ingestion and cluster contract parsing.
///
/// Column classification itself never fails; these errors come from the
/// collaborators around it.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet workbook parsing error.
    #[error("Workbook parsing error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The file is neither delimited text nor a spreadsheet workbook.
    #[error("Unrecognized file format (supported: CSV, XLSX)")]
    UnsupportedFormat,

    /// Empty file or no data rows below the header.
    #[error("Empty file or no data rows to analyze")]
    EmptyData,

    /// The requested worksheet does not exist in the workbook.
    #[error("Sheet \"{0}\" not found in workbook")]
    SheetNotFound(String),

    /// The input exceeds the configured size limit.
    #[error("File {path} is too large ({size} bytes, limit {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Input read from a stream exceeds the configured size limit.
    #[error("Input is too large (limit {max_size} bytes)")]
    InputTooLarge { max_size: u64 },

    /// The clustering model response did not contain a JSON cluster array.
    #[error("Failed to parse clustering results: {0}")]
    ClusterParse(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for detector operations.
pub type Result<T> = std::result::Result<T, DetectorError>;
