//! Streaming parse of one forecast line.
//!
//! A line holds one (potentially very large) JSON document. It is scanned in
//! a single forward pass; only the sub-trees picked by the key filter are
//! materialized, and a [`TripForecast`](crate::domain::TripForecast) is
//! handed out each time a trip's `edges` array completes.

mod assemble;
mod parser;
mod select;

pub use assemble::{Assembled, TripAssembler};
pub use parser::{ForecastHandler, is_forecast_key, parse_line};
pub use select::{Selected, Selector};
