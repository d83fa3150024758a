//! Per-trip forecast records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EdgeForecast, ForecastError, RawEdgeForecast, Station, SystemTime};
use crate::stats;

/// The trip a forecast belongs to.
///
/// Only `train_nr` is interpreted; everything else is passed through.
/// Producers are not consistent about its type, so it is kept as written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_nr: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Service metadata (category, line, train number) for a trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub name: Option<Value>,

    #[serde(default)]
    pub train_nr: Option<Value>,

    /// Line marker. Producers send either a line name or a flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceInfo {
    /// Whether this entry denotes a line (truthy `line` field).
    pub fn is_line(&self) -> bool {
        is_truthy(self.line.as_ref())
    }
}

/// Text of a loosely typed field: strings as they are, other values in
/// their JSON form, `null` as nothing.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

impl fmt::Display for ServiceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = text(self.name.as_ref()).unwrap_or_default();
        if self.is_line() {
            let train_nr = text(self.train_nr.as_ref()).unwrap_or_else(|| "0".into());
            write!(f, "{name} [{train_nr}]")
        } else {
            write!(f, "{name}")
        }
    }
}

/// Human-readable trip label.
///
/// Joins the service infos when there are any, otherwise falls back to the
/// trip's train number (0 when missing or falsy).
pub fn trip_display_name(trip: &Trip, service_infos: Option<&[ServiceInfo]>) -> String {
    match service_infos {
        Some(infos) if !infos.is_empty() => infos
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        _ if is_truthy(trip.train_nr.as_ref()) => text(trip.train_nr.as_ref()).unwrap_or_default(),
        _ => "0".to_string(),
    }
}

/// Context collected from the sub-trees preceding a trip's `edges` array.
#[derive(Debug, Clone, Default)]
pub struct TripForecastContext {
    pub primary_station: Option<Station>,
    pub secondary_station: Option<Station>,
    pub service_infos: Option<Vec<ServiceInfo>>,
}

/// Forecast for one trip, with aggregates over its edges.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripForecast {
    pub trip: Trip,
    pub edges: Vec<EdgeForecast>,
    pub all_edges_have_capacity: bool,
    pub max_capacity: f64,
    pub max_pax: u32,
    pub max_load: f64,
    pub max_spread: u32,
    pub primary_station: Option<Station>,
    pub secondary_station: Option<Station>,
    pub service_infos: Option<Vec<ServiceInfo>>,
    pub trip_display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_time: Option<SystemTime>,
}

impl TripForecast {
    /// Build the record for `trip` from its raw edges.
    ///
    /// Self-loop edges are dropped before summarizing, but
    /// `all_edges_have_capacity` looks at every edge that was in the log.
    pub fn assemble(
        trip: Trip,
        raw_edges: Vec<RawEdgeForecast>,
        context: &TripForecastContext,
    ) -> Result<Self, ForecastError> {
        let all_edges_have_capacity = raw_edges.iter().all(|e| e.capacity().is_some());

        let edges = raw_edges
            .into_iter()
            .filter(|e| !e.is_self_loop())
            .map(stats::summarize)
            .collect::<Result<Vec<_>, _>>()?;

        let mut max_capacity = 0.0_f64;
        let mut max_pax = 0;
        let mut max_load = 0.0_f64;
        let mut max_spread = 0;
        for (capacity, summary) in edges.iter().filter_map(EdgeForecast::load) {
            max_capacity = max_capacity.max(capacity);
            max_pax = max_pax.max(summary.max_pax);
            max_spread = max_spread.max(summary.spread());
            max_load = max_load.max(f64::from(summary.max_pax) / capacity);
        }

        let trip_display_name = trip_display_name(&trip, context.service_infos.as_deref());

        Ok(Self {
            trip,
            edges,
            all_edges_have_capacity,
            max_capacity,
            max_pax,
            max_load,
            max_spread,
            primary_station: context.primary_station.clone(),
            secondary_station: context.secondary_station.clone(),
            service_infos: context.service_infos.clone(),
            trip_display_name,
            system_time: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use serde_json::json;

    fn service_info(json: Value) -> ServiceInfo {
        serde_json::from_value(json).unwrap()
    }

    fn edges(json: Value) -> Vec<RawEdgeForecast> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn display_name_from_line_service_info() {
        let trip = Trip::default();
        let infos = [service_info(json!({"name": "RE1", "train_nr": 123, "line": true}))];
        assert_eq!(trip_display_name(&trip, Some(&infos)), "RE1 [123]");
    }

    #[test]
    fn display_name_joins_entries() {
        let trip = Trip::default();
        let infos = [
            service_info(json!({"name": "ICE 599", "train_nr": 599, "line": ""})),
            service_info(json!({"name": "S 3", "train_nr": 3312, "line": "3"})),
        ];
        assert_eq!(trip_display_name(&trip, Some(&infos)), "ICE 599, S 3 [3312]");
    }

    #[test]
    fn display_name_falls_back_to_train_nr() {
        let trip = Trip {
            train_nr: Some(json!(456)),
            ..Trip::default()
        };
        assert_eq!(trip_display_name(&trip, Some(&[])), "456");
        assert_eq!(trip_display_name(&trip, None), "456");
        assert_eq!(trip_display_name(&Trip::default(), None), "0");
    }

    #[test]
    fn loosely_typed_train_numbers_and_names() {
        let trip: Trip = serde_json::from_value(json!({"train_nr": "ICE 71"})).unwrap();
        assert_eq!(trip.train_nr, Some(json!("ICE 71")));
        assert_eq!(trip_display_name(&trip, None), "ICE 71");

        let trip: Trip = serde_json::from_value(json!({"train_nr": 0})).unwrap();
        assert_eq!(trip_display_name(&trip, None), "0");
        let trip: Trip = serde_json::from_value(json!({"train_nr": null})).unwrap();
        assert_eq!(trip_display_name(&trip, None), "0");

        let info = service_info(json!({"name": null, "train_nr": "4711", "line": "S1"}));
        assert_eq!(info.to_string(), " [4711]");
        let info = service_info(json!({"name": "RB", "train_nr": 12.5, "line": true}));
        assert_eq!(info.to_string(), "RB [12.5]");
        let info = service_info(json!({"name": null}));
        assert_eq!(info.to_string(), "");

        // passed through as written
        let json = serde_json::to_value(&info).unwrap();
        assert!(json["name"].is_null());
    }

    #[test]
    fn line_truthiness() {
        assert!(!service_info(json!({"name": "x"})).is_line());
        assert!(!service_info(json!({"name": "x", "line": null})).is_line());
        assert!(!service_info(json!({"name": "x", "line": false})).is_line());
        assert!(!service_info(json!({"name": "x", "line": 0})).is_line());
        assert!(service_info(json!({"name": "x", "line": 7})).is_line());
    }

    #[test]
    fn self_loops_dropped_but_counted_for_capacity() {
        let raw = edges(json!([
            {"from": {"id": 1}, "to": {"id": 1}, "passenger_cdf": []},
            {"from": {"id": 1}, "to": {"id": 2}, "capacity": 100,
             "passenger_cdf": [
                {"passengers": 10, "probability": 0.2},
                {"passengers": 20, "probability": 0.5},
                {"passengers": 30, "probability": 1.0}
             ]}
        ]));
        let forecast =
            TripForecast::assemble(Trip::default(), raw, &TripForecastContext::default()).unwrap();

        assert_eq!(forecast.edges.len(), 1);
        assert_eq!(forecast.edges[0].to.id, StationId::Number(2));
        assert!(!forecast.all_edges_have_capacity);
        assert_eq!(forecast.max_capacity, 100.0);
        assert_eq!(forecast.max_pax, 30);
        assert_eq!(forecast.max_spread, 20);
        assert!((forecast.max_load - 0.3).abs() < 1e-12);
    }

    #[test]
    fn aggregates_over_capacitated_edges() {
        let raw = edges(json!([
            {"from": {"id": 1}, "to": {"id": 2}, "capacity": 50,
             "passenger_cdf": [
                {"passengers": 40, "probability": 0.5},
                {"passengers": 60, "probability": 1.0}
             ]},
            {"from": {"id": 2}, "to": {"id": 3}, "capacity": 200,
             "passenger_cdf": [
                {"passengers": 0, "probability": 0.1},
                {"passengers": 100, "probability": 1.0}
             ]}
        ]));
        let context = TripForecastContext {
            service_infos: Some(vec![service_info(json!({"name": "IC 2013", "train_nr": 2013}))]),
            ..TripForecastContext::default()
        };
        let forecast = TripForecast::assemble(Trip::default(), raw, &context).unwrap();

        assert!(forecast.all_edges_have_capacity);
        assert_eq!(forecast.max_capacity, 200.0);
        assert_eq!(forecast.max_pax, 100);
        assert_eq!(forecast.max_spread, 100);
        assert!((forecast.max_load - 1.2).abs() < 1e-12);
        assert_eq!(forecast.trip_display_name, "IC 2013");
    }

    #[test]
    fn edges_without_capacity_contribute_nothing() {
        let raw = edges(json!([
            {"from": {"id": 1}, "to": {"id": 2},
             "passenger_cdf": [{"passengers": 500, "probability": 1.0}]}
        ]));
        let forecast =
            TripForecast::assemble(Trip::default(), raw, &TripForecastContext::default()).unwrap();

        assert!(!forecast.all_edges_have_capacity);
        assert_eq!(forecast.max_capacity, 0.0);
        assert_eq!(forecast.max_pax, 0);
        assert_eq!(forecast.max_spread, 0);
        assert_eq!(forecast.max_load, 0.0);
        assert!(forecast.edges[0].summary.is_none());
    }

    #[test]
    fn fractional_capacity_drives_load() {
        let raw = edges(json!([
            {"from": {"id": 1}, "to": {"id": 2}, "capacity": 80.5,
             "passenger_cdf": [
                {"passengers": 70, "probability": 0.5},
                {"passengers": 161, "probability": 1.0}
             ]}
        ]));
        let forecast =
            TripForecast::assemble(Trip::default(), raw, &TripForecastContext::default()).unwrap();
        assert!(forecast.all_edges_have_capacity);
        assert_eq!(forecast.max_capacity, 80.5);
        assert!((forecast.max_load - 2.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_cdf_fails_the_trip() {
        let raw = edges(json!([
            {"from": {"id": 1}, "to": {"id": 2}, "capacity": 10,
             "passenger_cdf": [{"passengers": 5, "probability": 0.9}]}
        ]));
        let err = TripForecast::assemble(Trip::default(), raw, &TripForecastContext::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidCdf { .. }));
    }

    #[test]
    fn serializes_camel_case_aggregates() {
        let forecast =
            TripForecast::assemble(Trip::default(), vec![], &TripForecastContext::default())
                .unwrap();
        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["allEdgesHaveCapacity"], true);
        assert_eq!(json["maxSpread"], 0);
        assert_eq!(json["tripDisplayName"], "0");
        assert!(json["primaryStation"].is_null());
        assert!(json.get("systemTime").is_none());
    }
}
