//! Passenger forecast log analyzer.
//!
//! Indexes very large line-delimited JSON forecast logs without loading them
//! into memory, extracts per-trip forecasts from single lines with a
//! filtering streaming parser, and ranks trips by forecast uncertainty.

pub mod config;
pub mod domain;
pub mod lines;
pub mod rank;
pub mod record;
pub mod scan;
pub mod session;
pub mod source;
pub mod stats;
pub mod web;

#[cfg(test)]
mod test_support;
