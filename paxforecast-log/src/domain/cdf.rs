//! Passenger count distributions.

use serde::{Deserialize, Serialize};

/// One step of a cumulative passenger distribution.
///
/// `probability` is the probability that at most `passengers` people are on
/// board. A CDF is a slice of these, ascending in both fields and ending at
/// probability 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdfEntry {
    pub passengers: u32,
    pub probability: f64,
}

impl CdfEntry {
    pub fn new(passengers: u32, probability: f64) -> Self {
        Self {
            passengers,
            probability,
        }
    }
}
