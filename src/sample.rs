use crate::value::{CellValue, Row};

/// Default number of leading rows sampled per column.
pub const DEFAULT_SAMPLE_ROWS: usize = 10;

/// Default number of rows kept in an upload preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Sample size configuration for value-based classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample the first `n` rows.
    Rows(usize),
    /// Sample every supplied row.
    ///
    /// # Warning
    ///
    /// Classification cost grows with the sample; large uploads should keep a
    /// bounded [`SampleSize::Rows`].
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Rows(DEFAULT_SAMPLE_ROWS)
    }
}

impl SampleSize {
    /// Returns the number of rows to sample, or None for All.
    pub fn rows(&self) -> Option<usize> {
        match self {
            SampleSize::Rows(n) => Some(*n),
            SampleSize::All => None,
        }
    }

    /// The leading slice of `rows` covered by this sample size.
    pub fn slice<'a>(&self, rows: &'a [Row]) -> &'a [Row] {
        match self.rows() {
            Some(n) => &rows[..n.min(rows.len())],
            None => rows,
        }
    }
}

/// Collect the values of `column` from the sampled rows, one per row.
///
/// Rows without the column contribute a null.
pub fn column_sample<'a>(rows: &'a [Row], column: &str, size: SampleSize) -> Vec<&'a CellValue> {
    size.slice(rows)
        .iter()
        .map(|row| CellValue::from_row(row, column))
        .collect()
}
