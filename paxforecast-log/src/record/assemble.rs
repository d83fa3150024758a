//! Turns selected sub-trees into trip forecast records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::Selected;
use crate::domain::{ForecastError, RawEdgeForecast, Trip, TripForecast, TripForecastContext};

/// What a completed `edges` array turned into.
#[derive(Debug)]
pub enum Assembled {
    Forecast(TripForecast),
    /// The trip's passenger CDFs were unusable. Only this trip is lost; the
    /// rest of the line is still parsed.
    Rejected { trip: Trip, error: ForecastError },
}

/// Collects the trip context of a line and builds a [`TripForecast`] each
/// time an `edges` array completes.
///
/// Stations and service infos stay in effect for later trips of the same
/// line until replaced; the trip itself is cleared after every record.
#[derive(Debug, Default)]
pub struct TripAssembler {
    trip: Option<Trip>,
    context: TripForecastContext,
}

impl TripAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one selected sub-tree; `offset` is the scan position used in
    /// error reports.
    pub fn accept(
        &mut self,
        selected: Selected,
        offset: u64,
    ) -> Result<Option<Assembled>, ForecastError> {
        match selected {
            Selected::Object { key, value } => {
                let value = Value::Object(value);
                match key.as_str() {
                    "trip" => self.trip = Some(decode(&key, value, offset)?),
                    "primary_station" => {
                        self.context.primary_station = Some(decode(&key, value, offset)?)
                    }
                    "secondary_station" => {
                        self.context.secondary_station = Some(decode(&key, value, offset)?)
                    }
                    _ => warn!(%key, "unexpected object in forecast record"),
                }
                Ok(None)
            }
            Selected::Array { key, value } => match key.as_str() {
                "service_infos" => {
                    self.context.service_infos =
                        Some(decode(&key, Value::Array(value), offset)?);
                    Ok(None)
                }
                "edges" => {
                    let Some(trip) = self.trip.take() else {
                        warn!(offset, "edges without a preceding trip, skipping");
                        return Ok(None);
                    };
                    let edges: Vec<RawEdgeForecast> = decode(&key, Value::Array(value), offset)?;
                    debug!(edges = edges.len(), train_nr = ?trip.train_nr, "trip forecast complete");
                    match TripForecast::assemble(trip.clone(), edges, &self.context) {
                        Ok(forecast) => Ok(Some(Assembled::Forecast(forecast))),
                        Err(error @ ForecastError::InvalidCdf { .. }) => {
                            warn!(offset, train_nr = ?trip.train_nr, %error, "skipping trip");
                            Ok(Some(Assembled::Rejected { trip, error }))
                        }
                        Err(error) => Err(error),
                    }
                }
                _ => {
                    warn!(%key, "unexpected array in forecast record");
                    Ok(None)
                }
            },
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value, offset: u64) -> Result<T, ForecastError> {
    serde_json::from_value(value).map_err(|err| ForecastError::MalformedRecord {
        offset,
        message: format!("invalid {key}: {err}"),
    })
}
