//! Column detector builder and the upload-facing detect methods.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{classify_column, Classification};
use crate::error::{DetectorError, Result};
use crate::ingest::{read_table, FileKind, ReadOptions};
use crate::mapping::ColumnMapping;
use crate::sample::{column_sample, SampleSize, DEFAULT_PREVIEW_ROWS};
use crate::value::Row;

/// Default upper bound on the size of an uploaded export (100 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Infers a semantic type for each column of a CRM export.
///
/// # Example
///
/// ```no_run
/// use crm_columns::{ColumnDetector, ColumnType, SampleSize};
///
/// let mut detector = ColumnDetector::new();
/// detector.sample_size(SampleSize::Rows(10)).preview_rows(50);
///
/// let summary = detector.detect_path("customers.csv").unwrap();
/// println!("Rows: {}", summary.row_count);
/// for (column, column_type) in &summary.mapping.detected {
///     println!("{column}: {column_type}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ColumnDetector {
    /// Rows sampled per column for value-based classification.
    sample_size: SampleSize,
    /// Rows kept in the upload preview.
    preview_rows: usize,
    /// Largest accepted file, in bytes.
    max_file_size: u64,
    /// Optional worksheet name for workbook exports.
    sheet: Option<String>,
    /// Optional forced delimiter for delimited exports.
    forced_delimiter: Option<u8>,
}

impl Default for ColumnDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnDetector {
    /// Create a new ColumnDetector with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            sheet: None,
            forced_delimiter: None,
        }
    }

    /// Set the number of rows sampled per column.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Set the number of rows kept in the upload preview.
    pub fn preview_rows(&mut self, preview_rows: usize) -> &mut Self {
        self.preview_rows = preview_rows;
        self
    }

    /// Set the largest accepted file size in bytes.
    pub fn max_file_size(&mut self, max_file_size: u64) -> &mut Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Read a specific worksheet of workbook exports.
    pub fn sheet(&mut self, sheet: impl Into<String>) -> &mut Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Force a specific delimiter (skip delimiter guessing).
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.forced_delimiter = Some(delimiter);
        self
    }

    /// Classify every column, in input order.
    ///
    /// Each column is matched by name first and, failing that, by the values
    /// of the sampled rows.
    pub fn classify<S: AsRef<str>>(
        &self,
        columns: &[S],
        rows: &[Row],
    ) -> Vec<(String, Classification)> {
        columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                let sample = column_sample(rows, column, self.sample_size);
                let classification = classify_column(column, sample);

                tracing::debug!(
                    column,
                    column_type = %classification.column_type,
                    source = ?classification.source,
                    "classified column"
                );

                (column.to_string(), classification)
            })
            .collect()
    }

    /// Build the column mapping for a dataset.
    ///
    /// Never fails: columns that cannot be classified land in `unmapped`.
    pub fn build_mapping<S: AsRef<str>>(&self, columns: &[S], rows: &[Row]) -> ColumnMapping {
        ColumnMapping::from_classified(
            self.classify(columns, rows)
                .into_iter()
                .map(|(column, c)| (column, c.column_type)),
        )
    }

    /// Detect the columns of an export file at the given path.
    pub fn detect_path<P: AsRef<Path>>(&self, path: P) -> Result<UploadSummary> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(DetectorError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max_size: self.max_file_size,
            });
        }

        let file = File::open(path)?;
        let mut summary = self.detect_reader(file)?;
        summary.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(summary)
    }

    /// Detect the columns of an export read from a reader.
    pub fn detect_reader<R: Read>(&self, reader: R) -> Result<UploadSummary> {
        let mut data = Vec::new();
        reader
            .take(self.max_file_size.saturating_add(1))
            .read_to_end(&mut data)?;

        if data.len() as u64 > self.max_file_size {
            return Err(DetectorError::InputTooLarge {
                max_size: self.max_file_size,
            });
        }

        self.detect_bytes(&data)
    }

    /// Detect the columns of an export held in memory.
    pub fn detect_bytes(&self, data: &[u8]) -> Result<UploadSummary> {
        if data.is_empty() {
            return Err(DetectorError::EmptyData);
        }

        let options = ReadOptions {
            max_rows: Some(self.preview_rows.max(self.sample_rows_needed())),
            sheet: self.sheet.clone(),
            delimiter: self.forced_delimiter,
        };
        let table = read_table(data, &options)?;

        let mapping = self.build_mapping(&table.columns, &table.rows);

        tracing::info!(
            kind = %table.kind,
            rows = table.row_count,
            columns = table.columns.len(),
            mapped = mapping.mapped_count(),
            "detected column mapping"
        );

        let mut preview = table.rows;
        preview.truncate(self.preview_rows);

        Ok(UploadSummary {
            file_name: None,
            kind: table.kind,
            row_count: table.row_count,
            columns: table.columns,
            preview,
            mapping,
        })
    }

    /// Rows that must be read so sampling is not cut short by the preview limit.
    fn sample_rows_needed(&self) -> usize {
        self.sample_size.rows().unwrap_or(usize::MAX)
    }
}

/// What the upload handler reports back for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// File name, when read from a path.
    pub file_name: Option<String>,
    pub kind: FileKind,
    /// Number of data rows in the whole export.
    pub row_count: usize,
    pub columns: Vec<String>,
    /// Leading rows for display.
    pub preview: Vec<Row>,
    /// The inferred mapping: `detected`, `suggestions` and `unmapped`.
    #[serde(flatten)]
    pub mapping: ColumnMapping,
}
