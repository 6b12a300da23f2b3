//! Spreadsheet workbook (XLSX/XLS) exports.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{DetectorError, Result};
use crate::value::{CellValue, Row};

use super::{FileKind, ParsedTable, ReadOptions, unique_headers};

/// List the worksheet names of a workbook, in workbook order.
pub fn sheet_names(data: &[u8]) -> Result<Vec<String>> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    Ok(workbook.sheet_names())
}

/// Tabulate one worksheet of a workbook.
///
/// Reads [`ReadOptions::sheet`] or the first sheet. The first row of the used
/// range is the header; blank cells read as empty text.
pub fn read_workbook(data: &[u8], options: &ReadOptions) -> Result<ParsedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let names = workbook.sheet_names();

    let sheet = match &options.sheet {
        Some(name) if names.contains(name) => name.clone(),
        Some(name) => return Err(DetectorError::SheetNotFound(name.clone())),
        None => names.first().cloned().ok_or(DetectorError::EmptyData)?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let mut range_rows = range.rows();

    let header = range_rows.next().ok_or(DetectorError::EmptyData)?;
    let columns = unique_headers(header.iter().map(header_text));

    let mut rows = Vec::new();
    let mut row_count = 0;

    for cells in range_rows {
        if cells.iter().all(is_blank) {
            continue;
        }
        row_count += 1;

        if options.max_rows.is_some_and(|max| rows.len() >= max) {
            continue;
        }

        let row: Row = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = cells.get(i).map_or_else(|| CellValue::from(""), cell_value);
                (column.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    if row_count == 0 {
        return Err(DetectorError::EmptyData);
    }

    tracing::debug!(
        sheet = %sheet,
        columns = columns.len(),
        row_count,
        "parsed workbook export"
    );

    Ok(ParsedTable {
        kind: FileKind::Workbook,
        columns,
        rows,
        row_count,
    })
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Map a workbook cell to a cell value.
///
/// Dates stay numeric serials, as a spreadsheet stores them.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::from(""),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&Data::Empty), CellValue::from(""));
        assert_eq!(cell_value(&Data::Int(42)), CellValue::Number(42.0));
        assert_eq!(cell_value(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::String("a@b.com".to_string())),
            CellValue::from("a@b.com")
        );
    }

    #[test]
    fn test_header_text() {
        assert_eq!(header_text(&Data::Empty), "");
        assert_eq!(header_text(&Data::String("Email".to_string())), "Email");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Data::Empty));
        assert!(is_blank(&Data::String(String::new())));
        assert!(!is_blank(&Data::Int(0)));
    }

    #[test]
    fn test_read_workbook_rejects_garbage() {
        let result = read_workbook(b"PK\x03\x04not really a zip", &ReadOptions::default());
        assert!(matches!(result, Err(DetectorError::Workbook(_))));
    }
}
