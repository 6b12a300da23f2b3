//! Dynamically typed cell values as they arrive from a parsed CRM export.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a parsed export, keyed by column name.
///
/// A column absent from the map reads as [`CellValue::Null`].
pub type Row = HashMap<String, CellValue, foldhash::fast::RandomState>;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing or null cell.
    #[default]
    Null,
    /// Boolean cell (spreadsheets only).
    Bool(bool),
    /// Numeric cell (spreadsheets only; CSV cells stay text).
    Number(f64),
    /// Text cell.
    Text(String),
}

impl CellValue {
    /// Returns true for values dropped before sampling: nulls and the empty string.
    ///
    /// Whitespace-only text is not empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the text if this is a text cell.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Permissive numeric coercion.
    ///
    /// Numbers pass through (NaN is rejected), booleans become 1/0 and text is
    /// converted with [`parse_number`]. Nulls have no numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Number(n) if n.is_nan() => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// Look up `column` in `row`, treating a missing key as null.
    pub fn from_row<'a>(row: &'a Row, column: &str) -> &'a CellValue {
        static NULL: CellValue = CellValue::Null;
        row.get(column).unwrap_or(&NULL)
    }
}

/// Whitespace that is ignored around numeric text, including a stray BOM.
#[inline]
pub(crate) fn is_padding(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Convert text to a number the way a loosely typed spreadsheet pipeline does.
///
/// - surrounding whitespace is ignored, and blank text is zero
/// - decimal literals with optional sign, fraction and exponent (`-1.5e3`, `.5`, `5.`)
/// - `Infinity` with an optional sign
/// - unsigned `0x`, `0o`, `0b` integer literals
///
/// Anything else (thousands separators, currency symbols, `nan`) is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim_matches(is_padding);
    if s.is_empty() {
        return Some(0.0);
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    if s.len() > 2 && s.as_bytes()[0] == b'0' {
        let radix = match s.as_bytes()[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&s[2..], radix);
        }
    }

    let valid_chars = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !valid_chars || !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    s.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}
