//! Delimited text (CSV/TSV) exports.

use crate::encoding::decode;
use crate::error::{DetectorError, Result};
use crate::value::{CellValue, Row};

use super::{FileKind, ParsedTable, ReadOptions, unique_headers};

/// Delimiters considered when none is configured, in tie-break order.
const DELIMITERS: &[u8] = b",;\t|";

/// Guess the field delimiter from the header line.
///
/// Counts each candidate outside double quotes on the first line and picks the
/// most frequent one; ties and header-only single columns fall back to comma.
pub fn guess_delimiter(text: &str) -> u8 {
    let mut counts = [0usize; DELIMITERS.len()];
    let mut in_quotes = false;

    for b in text.bytes() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(i) = DELIMITERS.iter().position(|&d| d == b) {
                    counts[i] += 1;
                }
            }
            _ => {}
        }
    }

    // max_by_key returns the last maximum, so scan in reverse to prefer earlier candidates.
    DELIMITERS
        .iter()
        .zip(counts)
        .rev()
        .max_by_key(|&(_, count)| count)
        .map_or(b',', |(&d, _)| d)
}

/// Tabulate delimited text.
///
/// The first record is the header. Records with values past the header add columns
/// named like blank headers (`__EMPTY`, `__EMPTY_1`, ...), so the table spans
/// the widest record. Every row holds every column, short records padded with
/// empty text. Records whose cells are all empty are skipped.
pub fn read_delimited(data: &[u8], options: &ReadOptions) -> Result<ParsedTable> {
    let decoded = decode(data);
    if decoded.was_transcoded() {
        tracing::info!(encoding = decoded.encoding, "transcoded export to UTF-8");
    }
    let text: &str = &decoded.text;

    let delimiter = options.delimiter.unwrap_or_else(|| guess_delimiter(text));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut width = header.len();

    let mut records = Vec::new();
    let mut row_count = 0;

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        row_count += 1;
        // Trailing empty fields do not widen the table.
        let used = (0..record.len())
            .rev()
            .find(|&i| !record[i].is_empty())
            .map_or(0, |i| i + 1);
        width = width.max(used);

        if options.max_rows.is_some_and(|max| records.len() >= max) {
            continue;
        }
        records.push(record);
    }

    let extra = width - header.len();
    let columns = unique_headers(
        header
            .into_iter()
            .chain(std::iter::repeat_n(String::new(), extra)),
    );

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let cell = record.get(i).unwrap_or_default();
                    (column.clone(), CellValue::from(cell))
                })
                .collect()
        })
        .collect();

    if row_count == 0 {
        return Err(DetectorError::EmptyData);
    }

    tracing::debug!(
        delimiter = %(delimiter as char).escape_default(),
        columns = columns.len(),
        row_count,
        "parsed delimited export"
    );

    Ok(ParsedTable {
        kind: FileKind::Csv,
        columns,
        rows,
        row_count,
    })
}
