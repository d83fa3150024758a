//! Domain types for passenger forecast logs.
//!
//! These types model the pieces of a forecast snapshot that the rest of the
//! crate cares about: line index entries, passenger CDFs, per-edge forecasts
//! and the per-trip records assembled from them. Unknown fields of the JSON
//! sub-trees are kept verbatim so records can be passed on unchanged.

mod cdf;
mod edge;
mod error;
mod line;
mod trip;

pub use cdf::CdfEntry;
pub use edge::{EdgeForecast, EdgeSummary, RawEdgeForecast, Station, StationId};
pub use error::ForecastError;
pub use line::{LineDescriptor, SystemTime};
pub use trip::{ServiceInfo, Trip, TripForecast, TripForecastContext, trip_display_name};
