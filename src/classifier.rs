//! Column classification: header rules first, sampled value shapes as fallback.

use serde::{Deserialize, Serialize};

use crate::column_type::ColumnType;
use crate::patterns::{column_rules, DATE_SHAPE, EMAIL_SHAPE, MIN_PHONE_LEN, PHONE_SHAPE};
use crate::value::{is_padding, CellValue};

/// Which strategy produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Matched the header rule table.
    Header,
    /// Inferred from sampled values.
    Values,
    /// Neither strategy produced a type.
    Unresolved,
}

/// The type assigned to one column and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub column_type: ColumnType,
    pub source: Source,
}

/// Classify a column by its header alone.
///
/// The header is trimmed, then tested against the rule table in declared
/// order; the first rule with a matching pattern wins.
pub fn classify_by_name(column_name: &str) -> ColumnType {
    let header = column_name.trim_matches(is_padding);

    column_rules()
        .iter()
        .find(|rule| rule.matches(header))
        .map_or(ColumnType::Unknown, |rule| rule.column_type)
}

/// Classify a column from a sample of its values.
///
/// Nulls and empty strings are ignored. The remaining values must all share
/// one shape, tested in order: email, phone, date, numeric. Numeric columns
/// are split by their mean: above 1000 is revenue, strictly between 18 and
/// 100 is age, anything else is a purchase count.
///
/// The column name is accepted for symmetry with [`classify_by_name`] and
/// does not influence the result.
pub fn classify_by_sample<'a, I>(_column_name: &str, sample: I) -> ColumnType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let values: Vec<&CellValue> = sample.into_iter().filter(|v| !v.is_empty()).collect();
    if values.is_empty() {
        return ColumnType::Unknown;
    }

    if all_text(&values, |s| EMAIL_SHAPE.is_match(s)) {
        return ColumnType::Email;
    }

    if all_text(&values, is_phone) {
        return ColumnType::Phone;
    }

    if all_text(&values, |s| DATE_SHAPE.is_match(s)) {
        return ColumnType::SignupDate;
    }

    if let Some(mean) = numeric_mean(&values) {
        return classify_magnitude(mean);
    }

    ColumnType::Unknown
}

/// Two-stage classification of one column.
pub fn classify_column<'a, I>(column_name: &str, sample: I) -> Classification
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let by_name = classify_by_name(column_name);
    if !by_name.is_unknown() {
        return Classification {
            column_type: by_name,
            source: Source::Header,
        };
    }

    match classify_by_sample(column_name, sample) {
        ColumnType::Unknown => Classification {
            column_type: ColumnType::Unknown,
            source: Source::Unresolved,
        },
        column_type => Classification {
            column_type,
            source: Source::Values,
        },
    }
}

/// True if every value is text and satisfies `pred`.
#[inline]
fn all_text(values: &[&CellValue], pred: impl Fn(&str) -> bool) -> bool {
    values
        .iter()
        .all(|v| v.as_text().is_some_and(&pred))
}

#[inline]
fn is_phone(s: &str) -> bool {
    PHONE_SHAPE.is_match(s) && s.chars().count() >= MIN_PHONE_LEN
}

/// Mean of the values if every one of them is numeric.
fn numeric_mean(values: &[&CellValue]) -> Option<f64> {
    let sum = values
        .iter()
        .try_fold(0.0, |acc, v| v.as_number().map(|n| acc + n))?;
    Some(sum / values.len() as f64)
}

/// Sub-classify a numeric column by the magnitude of its mean.
fn classify_magnitude(mean: f64) -> ColumnType {
    if mean > 1000.0 {
        ColumnType::Revenue
    } else if mean > 18.0 && mean < 100.0 {
        ColumnType::Age
    } else {
        ColumnType::PurchaseCount
    }
}
