//! crm-columns: semantic column-type inference for CRM exports
//!
//! Given the header names of a tabular export and a few sample rows, infers
//! which columns hold customer ids, emails, revenue, purchase dates and the
//! other fields a customer segmentation needs.
//!
//! # Quick Start
//!
//! ```no_run
//! use crm_columns::{ColumnDetector, SampleSize};
//!
//! let mut detector = ColumnDetector::new();
//! detector.sample_size(SampleSize::Rows(10));
//!
//! let summary = detector.detect_path("customers.xlsx").unwrap();
//!
//! println!("Rows: {}", summary.row_count);
//! for (column, column_type) in &summary.mapping.detected {
//!     println!("{column} -> {}", column_type.label());
//! }
//! println!("Unmapped: {:?}", summary.mapping.unmapped);
//! ```
//!
//! # How columns are classified
//!
//! 1. The header is trimmed and tested against an ordered table of
//!    case-insensitive patterns; the first matching type wins.
//! 2. Otherwise the first sampled values are checked for an email, phone
//!    or date shape, then their numeric mean decides between revenue, age
//!    and purchase count.
//! 3. Anything else is `unknown` and lands in the unmapped list.
//!
//! Rows already in memory can be mapped without any file I/O:
//!
//! ```
//! use crm_columns::{build_mapping, CellValue, ColumnType, Row};
//!
//! let rows = vec![Row::from_iter([
//!     ("Spend".to_string(), CellValue::from(5000.0)),
//!     ("contact".to_string(), CellValue::from("a@b.com")),
//! ])];
//!
//! let mapping = build_mapping(&["Spend", "contact"], &rows);
//! assert_eq!(mapping.column_type("Spend"), ColumnType::Revenue);
//! assert_eq!(mapping.column_type("contact"), ColumnType::Email);
//! ```

mod classifier;
pub mod clustering;
mod column_type;
mod detector;
mod encoding;
mod error;
pub mod ingest;
mod mapping;
mod patterns;
mod sample;
mod value;

pub use classifier::{classify_by_name, classify_by_sample, classify_column, Classification, Source};
pub use column_type::{ColumnType, Importance, ParseColumnTypeError};
pub use detector::{ColumnDetector, UploadSummary, DEFAULT_MAX_FILE_SIZE};
pub use error::{DetectorError, Result};
pub use mapping::{ApprovedMapping, ColumnMapping};
pub use sample::{SampleSize, DEFAULT_PREVIEW_ROWS, DEFAULT_SAMPLE_ROWS};
pub use value::{parse_number, CellValue, Row};

// Re-export for advanced usage
pub use encoding::{decode, is_utf8, DecodedText};
pub use ingest::FileKind;
pub use patterns::{column_rules, ColumnRule};

/// Build the column mapping for rows already in memory, with default settings.
///
/// Shorthand for [`ColumnDetector::build_mapping`] on a default detector.
pub fn build_mapping<S: AsRef<str>>(columns: &[S], rows: &[Row]) -> ColumnMapping {
    ColumnDetector::new().build_mapping(columns, rows)
}
