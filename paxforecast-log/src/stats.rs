//! Statistics over passenger CDFs.
//!
//! All functions expect the CDF in ascending passenger order, which is how
//! the forecast producer writes it.

use crate::domain::{CdfEntry, EdgeForecast, EdgeSummary, ForecastError, RawEdgeForecast};

/// Quantiles reported for each edge, in the order they are stored.
const SUMMARY_QUANTILES: [f64; 5] = [0.05, 0.20, 0.50, 0.80, 0.95];

/// Probability that at most `limit` passengers are on board.
///
/// Returns 0.0 when `limit` lies below the first entry.
pub fn probability_at_most(cdf: &[CdfEntry], limit: f64) -> f64 {
    cdf.iter()
        .take_while(|e| f64::from(e.passengers) <= limit)
        .last()
        .map_or(0.0, |e| e.probability)
}

/// Probability that more than `limit` passengers are on board.
pub fn probability_exceeding(cdf: &[CdfEntry], limit: f64) -> f64 {
    1.0 - probability_at_most(cdf, limit)
}

/// Passenger count at quantile `q`.
///
/// An exact probability match returns that entry's count. Otherwise the
/// result is the midpoint between the entry that first exceeds `q` and its
/// predecessor.
pub fn quantile(cdf: &[CdfEntry], q: f64) -> Result<f64, ForecastError> {
    let mut previous: Option<&CdfEntry> = None;
    for entry in cdf {
        if entry.probability == q {
            return Ok(f64::from(entry.passengers));
        }
        if entry.probability > q {
            return Ok(match previous {
                Some(prev) => (f64::from(prev.passengers) + f64::from(entry.passengers)) / 2.0,
                None => f64::from(entry.passengers),
            });
        }
        previous = Some(entry);
    }
    Err(ForecastError::InvalidCdf { quantile: q })
}

/// Derive load statistics for an edge.
///
/// Edges without a (non-zero) capacity are passed through unchanged.
pub fn summarize(edge: RawEdgeForecast) -> Result<EdgeForecast, ForecastError> {
    let Some(capacity) = edge.capacity() else {
        return Ok(EdgeForecast::unsummarized(edge));
    };

    let cdf = &edge.passenger_cdf;
    let [q_5, q_20, q_50, q_80, q_95] = {
        let mut q = [0.0; SUMMARY_QUANTILES.len()];
        for (slot, &level) in q.iter_mut().zip(SUMMARY_QUANTILES.iter()) {
            *slot = quantile(cdf, level)?;
        }
        q
    };
    let summary = EdgeSummary {
        p_load_gt_100: probability_exceeding(cdf, capacity),
        q_5,
        q_20,
        q_50,
        q_80,
        q_95,
        min_pax: cdf.first().map_or(0, |e| e.passengers),
        max_pax: cdf.last().map_or(0, |e| e.passengers),
    };

    let mut edge = EdgeForecast::unsummarized(edge);
    edge.summary = Some(summary);
    Ok(edge)
}
