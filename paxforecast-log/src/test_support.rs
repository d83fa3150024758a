//! Builders for forecast log fixtures.

use serde_json::{Value, json};

use crate::domain::{LineDescriptor, SystemTime};
use crate::source::MemorySource;

pub const SYSTEM_TIME: SystemTime = 1_600_000_000;

/// A three-point passenger CDF from `min` to `max`.
pub fn cdf(min: u32, max: u32) -> Value {
    json!([
        {"passengers": min, "probability": 0.1},
        {"passengers": (min + max) / 2, "probability": 0.5},
        {"passengers": max, "probability": 1.0}
    ])
}

/// One trip of a snapshot: a real edge with spread `max - min` plus a
/// self-loop that must not count.
pub fn trip_entry(train_nr: u64, min: u32, max: u32) -> Value {
    json!({
        "trip": {"train_nr": train_nr, "station_id": "8000105"},
        "primary_station": {"id": "8000105", "name": "Frankfurt(Main)Hbf"},
        "secondary_station": {"id": "8000261", "name": "München Hbf"},
        "service_infos": [{"name": "ICE", "train_nr": train_nr, "line": ""}],
        "edges": [
            {"from": {"id": "a"}, "to": {"id": "b"}, "capacity": 500, "passenger_cdf": cdf(min, max)},
            {"from": {"id": "b"}, "to": {"id": "b"}, "capacity": 500, "passenger_cdf": cdf(0, 1000)}
        ]
    })
}

/// A snapshot line body taken at `system_time`.
pub fn snapshot_at(system_time: SystemTime, entries: Vec<Value>) -> String {
    json!({
        "system_time": system_time,
        "groups": {"trip": {"train_nr": 999}},
        "trips": {"forecasts": entries}
    })
    .to_string()
}

pub fn snapshot(entries: Vec<Value>) -> String {
    snapshot_at(SYSTEM_TIME, entries)
}

/// Join `lines` into an in-memory log and index it by hand.
pub fn log_file(lines: &[String]) -> (MemorySource, Vec<LineDescriptor>) {
    let mut descriptors = Vec::with_capacity(lines.len());
    let mut begin = 0;
    for line in lines {
        let end = begin + line.len() as u64;
        descriptors.push(LineDescriptor::new(begin, end));
        begin = end + 1;
    }
    (MemorySource::new(lines.join("\n")), descriptors)
}
