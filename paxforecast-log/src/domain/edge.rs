//! Per-edge forecasts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CdfEntry;

/// Station identifier as it appears in the log.
///
/// Producers emit either numeric or textual ids, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StationId {
    Number(i64),
    Text(String),
}

/// A station reference (edge endpoint, or a trip's primary/secondary station).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remaining fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Interpret a capacity field: a number, or a numeric string.
///
/// Anything else, and values that are not positive, mean no capacity.
fn usable_capacity(value: Option<&Value>) -> Option<f64> {
    let capacity = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (capacity.is_finite() && capacity > 0.0).then_some(capacity)
}

/// An edge forecast exactly as decoded from the log.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdgeForecast {
    pub from: Station,
    pub to: Station,

    /// Kept as written; see [`RawEdgeForecast::capacity`].
    #[serde(default)]
    pub capacity: Option<Value>,

    #[serde(default)]
    pub passenger_cdf: Vec<CdfEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEdgeForecast {
    /// The usable capacity; zero, negative and non-numeric values count as
    /// unknown.
    pub fn capacity(&self) -> Option<f64> {
        usable_capacity(self.capacity.as_ref())
    }

    /// Edges that start and end at the same station carry no load information.
    pub fn is_self_loop(&self) -> bool {
        self.from.id == self.to.id
    }
}

/// Load statistics derived from an edge's passenger CDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeSummary {
    /// Probability that the load exceeds the capacity.
    pub p_load_gt_100: f64,
    pub q_5: f64,
    pub q_20: f64,
    pub q_50: f64,
    pub q_80: f64,
    pub q_95: f64,
    pub min_pax: u32,
    pub max_pax: u32,
}

impl EdgeSummary {
    /// Difference between the largest and smallest plausible passenger counts.
    pub fn spread(&self) -> u32 {
        self.max_pax.saturating_sub(self.min_pax)
    }
}

/// An edge forecast after processing.
///
/// `summary` is present exactly when the edge has a non-zero capacity; edges
/// without one pass through with their original fields only.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeForecast {
    pub from: Station,
    pub to: Station,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Value>,

    pub passenger_cdf: Vec<CdfEntry>,

    #[serde(flatten)]
    pub summary: Option<EdgeSummary>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeForecast {
    /// Wrap a raw edge without computing statistics.
    pub fn unsummarized(raw: RawEdgeForecast) -> Self {
        Self {
            from: raw.from,
            to: raw.to,
            capacity: raw.capacity,
            passenger_cdf: raw.passenger_cdf,
            summary: None,
            extra: raw.extra,
        }
    }

    /// Capacity and statistics, for edges that have both.
    pub fn load(&self) -> Option<(f64, &EdgeSummary)> {
        match (usable_capacity(self.capacity.as_ref()), &self.summary) {
            (Some(capacity), Some(summary)) => Some((capacity, summary)),
            _ => None,
        }
    }
}
