//! Tabulating CRM exports into named columns and row objects.
//!
//! Decoding is delegated to `csv` for delimited text and `calamine` for
//! spreadsheet workbooks. This module only sniffs the file kind, normalizes
//! headers and builds [`Row`]s.

mod delimited;
mod workbook;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DetectorError, Result};
use crate::value::Row;

pub use delimited::{guess_delimiter, read_delimited};
pub use workbook::{read_workbook, sheet_names};

/// ZIP local file header, the container of XLSX/ODS workbooks.
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];

/// OLE compound document header, the container of legacy XLS workbooks.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// How many leading bytes are searched for the workbook part prefix.
const ZIP_SCAN_LEN: usize = 4000;

/// How many leading bytes must look like text for the input to be delimited text.
const TEXT_SCAN_LEN: usize = 1000;

/// Header given to columns with a blank header cell.
const EMPTY_HEADER: &str = "__EMPTY";

/// Kind of an uploaded export, determined from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Delimited text (CSV, TSV, ...).
    Csv,
    /// Spreadsheet workbook (XLSX, XLS).
    Workbook,
    /// Neither.
    Unknown,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Csv => write!(f, "csv"),
            FileKind::Workbook => write!(f, "xlsx"),
            FileKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detect the kind of an export from its leading bytes.
///
/// A ZIP archive with an `xl/` part near the start is a workbook, as is an
/// OLE compound document. Otherwise the data is delimited text when its first
/// bytes hold no ASCII control characters besides whitespace and ESC.
pub fn detect_file_kind(data: &[u8]) -> FileKind {
    if data.starts_with(ZIP_MAGIC) {
        let head = &data[..data.len().min(ZIP_SCAN_LEN)];
        if head.windows(3).any(|w| w == b"xl/") {
            return FileKind::Workbook;
        }
    }

    if data.starts_with(OLE_MAGIC) {
        return FileKind::Workbook;
    }

    let head = &data[..data.len().min(TEXT_SCAN_LEN)];
    let is_text = head
        .iter()
        .all(|&b| !(b < 0x09 || (b > 0x0D && b < 0x20 && b != 0x1B)));

    if is_text {
        FileKind::Csv
    } else {
        FileKind::Unknown
    }
}

/// Options shared by the CSV and workbook readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Keep at most this many rows; `None` keeps every row.
    pub max_rows: Option<usize>,
    /// Worksheet to read; defaults to the first one.
    pub sheet: Option<String>,
    /// Field delimiter for delimited text; guessed when unset.
    pub delimiter: Option<u8>,
}

/// An export tabulated into columns and row objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub kind: FileKind,
    /// Column names in file order, unique.
    pub columns: Vec<String>,
    /// Leading data rows, limited by [`ReadOptions::max_rows`].
    pub rows: Vec<Row>,
    /// Number of non-blank data rows in the whole file.
    pub row_count: usize,
}

/// Tabulate an export of any supported kind.
pub fn read_table(data: &[u8], options: &ReadOptions) -> Result<ParsedTable> {
    match detect_file_kind(data) {
        FileKind::Csv => read_delimited(data, options),
        FileKind::Workbook => read_workbook(data, options),
        FileKind::Unknown => Err(DetectorError::UnsupportedFormat),
    }
}

/// Make header names usable as row keys.
///
/// Blank headers become `__EMPTY`; repeated names get `_1`, `_2`, ...
/// suffixes, skipping any suffix that is already taken.
pub(crate) fn unique_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashSet<String, foldhash::fast::RandomState> = HashSet::default();
    let mut headers = Vec::new();

    for name in raw {
        let base = if name.trim().is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
