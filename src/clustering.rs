//! Input/output contract of the external clustering model.
//!
//! The model itself is a black box: it receives rows plus the approved column
//! mapping and answers with free text that should contain a JSON array of
//! clusters. This module builds the request and parses the answer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DetectorError, Result};
use crate::mapping::ApprovedMapping;
use crate::value::{parse_number, Row};

/// Most rows forwarded to the clustering model.
pub const MAX_CLUSTERING_ROWS: usize = 1000;

/// Default number of clusters requested.
pub const DEFAULT_NUM_CLUSTERS: usize = 5;

/// A ```` ```json ```` fenced block.
static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("Invalid fenced JSON pattern"));

/// The outermost bracketed span.
static BARE_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("Invalid JSON array pattern"));

/// What the clustering should emphasize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusOn {
    /// Purchase frequency, recency and revenue.
    #[default]
    Behavior,
    /// Age, location and industry.
    Demographics,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub num_clusters: usize,
    pub focus_on: FocusOn,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            num_clusters: DEFAULT_NUM_CLUSTERS,
            focus_on: FocusOn::default(),
        }
    }
}

/// Request handed to the clustering model.
///
/// The column mapping is forwarded exactly as the user approved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Leading rows, at most [`MAX_CLUSTERING_ROWS`].
    pub rows: Vec<Row>,
    /// Number of rows in the full dataset.
    pub total_rows: usize,
    pub column_mapping: ApprovedMapping,
    pub num_clusters: usize,
    pub focus_on: FocusOn,
}

impl AnalysisRequest {
    pub fn new(rows: &[Row], column_mapping: ApprovedMapping, options: AnalysisOptions) -> Self {
        let kept = &rows[..rows.len().min(MAX_CLUSTERING_ROWS)];
        Self {
            rows: kept.to_vec(),
            total_rows: rows.len(),
            column_mapping,
            num_clusters: options.num_clusters,
            focus_on: options.focus_on,
        }
    }
}

/// One customer cluster returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    /// Estimated number of customers, derived from `percentage`.
    pub size: u64,
    pub percentage: f64,
    pub behavioral_traits: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic_traits: Option<Map<String, Value>>,
    pub reasoning: String,
}

/// Cluster as the model writes it; every field is optional and loosely typed.
#[derive(Debug, Deserialize)]
struct RawCluster {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    percentage: Value,
    #[serde(default)]
    behavioral_traits: Option<Map<String, Value>>,
    #[serde(default)]
    demographic_traits: Option<Map<String, Value>>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parse the model's answer into clusters.
///
/// The JSON is taken from a ```` ```json ```` fence when present, otherwise
/// from the outermost `[...]` span. Missing ids become `cluster_N`, missing
/// traits become empty objects, and each size is the percentage applied to
/// `total_rows`.
pub fn parse_cluster_response(text: &str, total_rows: u64) -> Result<Vec<Cluster>> {
    let json = FENCED_JSON
        .captures(text)
        .and_then(|c| c.get(1))
        .or_else(|| BARE_ARRAY.find(text))
        .map(|m| m.as_str())
        .ok_or_else(|| DetectorError::ClusterParse("no JSON found in response".to_string()))?;

    let raw: Vec<RawCluster> = serde_json::from_str(json)
        .map_err(|e| DetectorError::ClusterParse(e.to_string()))?;

    let clusters: Vec<Cluster> = raw
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let percentage = percentage_of(&c.percentage);
            Cluster {
                id: cluster_id(&c.id, i),
                name: c.name.unwrap_or_default(),
                size: estimated_size(percentage, total_rows),
                percentage,
                behavioral_traits: c.behavioral_traits.unwrap_or_default(),
                demographic_traits: Some(c.demographic_traits.unwrap_or_default()),
                reasoning: c.reasoning.unwrap_or_default(),
            }
        })
        .collect();

    tracing::debug!(clusters = clusters.len(), total_rows, "parsed clustering response");
    Ok(clusters)
}

fn cluster_id(id: &Value, index: usize) -> String {
    match id {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => format!("cluster_{}", index + 1),
    }
}

/// Percentage as a number: JSON numbers as-is, numeric strings parsed, 0 otherwise.
fn percentage_of(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number(s).filter(|n| n.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn estimated_size(percentage: f64, total_rows: u64) -> u64 {
    let size = (percentage / 100.0 * total_rows as f64).round();
    if size.is_finite() && size > 0.0 {
        size as u64
    } else {
        0
    }
}

/// Number of customers covered by `clusters`; the row total for a refinement.
pub fn total_clustered_rows(clusters: &[Cluster]) -> u64 {
    clusters.iter().map(|c| c.size).sum()
}

/// User refinement of existing clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinementAction {
    Merge,
    Split,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest {
    pub action: RefinementAction,
    pub cluster_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_criteria: Option<Map<String, Value>>,
}

impl RefinementRequest {
    /// Check the request against the clusters it refers to.
    ///
    /// Merge needs at least two clusters, split and rename exactly one, and
    /// rename a non-blank new name. Every id must exist.
    pub fn validate(&self, clusters: &[Cluster]) -> Result<()> {
        let invalid = |msg: String| Err(DetectorError::InvalidConfig(msg));

        match self.action {
            RefinementAction::Merge if self.cluster_ids.len() < 2 => {
                return invalid("merge needs at least two clusters".to_string());
            }
            RefinementAction::Split | RefinementAction::Rename if self.cluster_ids.len() != 1 => {
                return invalid(format!("{:?} needs exactly one cluster", self.action));
            }
            RefinementAction::Rename
                if self.new_name.as_deref().is_none_or(|n| n.trim().is_empty()) =>
            {
                return invalid("rename needs a new name".to_string());
            }
            _ => {}
        }

        if let Some(missing) = self
            .cluster_ids
            .iter()
            .find(|id| !clusters.iter().any(|c| &c.id == *id))
        {
            return invalid(format!("unknown cluster id: {missing}"));
        }

        Ok(())
    }
}
