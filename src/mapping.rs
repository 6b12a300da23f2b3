use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column_type::ColumnType;

/// Aggregate classification result for the columns of one dataset.
///
/// Every input column is either a key of `detected` or an entry of
/// `unmapped`, never both. Each detected column also appears in exactly one
/// `suggestions` list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column name to its inferred type, for every classified column.
    pub detected: BTreeMap<String, ColumnType>,
    /// Type to the columns classified as that type, in input order.
    pub suggestions: BTreeMap<ColumnType, Vec<String>>,
    /// Columns that could not be classified, in input order.
    pub unmapped: Vec<String>,
}

impl ColumnMapping {
    /// Assemble a mapping from per-column results in input order.
    pub fn from_classified<I, S>(classified: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut mapping = ColumnMapping::default();
        for (column, column_type) in classified {
            mapping.record(column.into(), column_type);
        }
        mapping
    }

    fn record(&mut self, column: String, column_type: ColumnType) {
        if column_type.is_unknown() {
            self.unmapped.push(column);
            return;
        }
        self.suggestions
            .entry(column_type)
            .or_default()
            .push(column.clone());
        self.detected.insert(column, column_type);
    }

    /// The type inferred for `column`, or `Unknown` if unmapped or absent.
    pub fn column_type(&self, column: &str) -> ColumnType {
        self.detected
            .get(column)
            .copied()
            .unwrap_or(ColumnType::Unknown)
    }

    /// Columns classified as `column_type`, in input order.
    pub fn columns_of(&self, column_type: ColumnType) -> &[String] {
        self.suggestions
            .get(&column_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of classified columns.
    pub fn mapped_count(&self) -> usize {
        self.detected.len()
    }

    /// Returns true if no column was supplied.
    pub fn is_empty(&self) -> bool {
        self.detected.is_empty() && self.unmapped.is_empty()
    }

    /// Seed an editable mapping from the detected columns.
    pub fn approve(&self) -> ApprovedMapping {
        ApprovedMapping(self.detected.clone())
    }
}

/// A user-approved column mapping, as submitted by the mapping editor.
///
/// Unlike [`ColumnMapping::detected`] it may hold `Unknown` entries: forcing
/// a column to `Unknown` excludes it from analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovedMapping(BTreeMap<String, ColumnType>);

impl ApprovedMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the type of `column`.
    pub fn set(&mut self, column: impl Into<String>, column_type: ColumnType) -> &mut Self {
        self.0.insert(column.into(), column_type);
        self
    }

    /// The approved type of `column`, `Unknown` when absent.
    pub fn get(&self, column: &str) -> ColumnType {
        self.0.get(column).copied().unwrap_or(ColumnType::Unknown)
    }

    /// Number of columns with a type other than `Unknown`.
    pub fn mapped_count(&self) -> usize {
        self.active().count()
    }

    /// Columns included in analysis.
    pub fn active(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.0
            .iter()
            .filter(|(_, t)| !t.is_unknown())
            .map(|(c, t)| (c.as_str(), *t))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ColumnType)> for ApprovedMapping {
    fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
