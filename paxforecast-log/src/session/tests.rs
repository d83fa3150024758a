use super::*;
use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor};
use crate::source::MemorySource;
use crate::test_support::{snapshot, snapshot_at, trip_entry};
use serde_json::json;

fn log(lines: &[String]) -> MemorySource {
    MemorySource::new(lines.join("\n"))
}

fn ops(notifications: &[Notification]) -> Vec<String> {
    notifications
        .iter()
        .map(|n| {
            serde_json::to_value(n).unwrap()["op"]
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect()
}

async fn loaded(lines: &[String]) -> Dispatcher<MemorySource> {
    let mut dispatcher = Dispatcher::new(ScanConfig::default());
    let mut sink = Vec::new();
    dispatcher
        .handle(Command::LoadFile(log(lines)), &mut sink)
        .await
        .unwrap();
    dispatcher
}

#[tokio::test]
async fn load_file_reports_index() {
    let lines = vec![snapshot_at(100, vec![]), snapshot_at(200, vec![])];
    let mut dispatcher = Dispatcher::new(ScanConfig {
        file_progress_step: 16,
        ..ScanConfig::default()
    }
    .with_read_chunk_size(16));
    let mut sink = Vec::new();
    dispatcher
        .handle(Command::LoadFile(log(&lines)), &mut sink)
        .await
        .unwrap();

    let Some(Notification::FileLoaded { lines: index }) = sink.last() else {
        panic!("expected fileLoaded, got {:?}", sink.last());
    };
    assert_eq!(index.len(), 2);
    assert_eq!(index[1].system_time, Some(200));
    assert!(ops(&sink[..sink.len() - 1]).iter().all(|op| op == "fileLoadProgress"));
    assert_eq!(dispatcher.line(1).unwrap(), index[1]);
    assert!(matches!(
        dispatcher.line(2),
        Err(DispatchError::LineOutOfRange { index: 2, count: 2 })
    ));
}

#[tokio::test]
async fn commands_need_a_loaded_file() {
    let mut dispatcher: Dispatcher<MemorySource> = Dispatcher::new(ScanConfig::default());
    let mut sink = Vec::new();
    let result = dispatcher
        .handle(Command::FindInterestingTrips, &mut sink)
        .await;
    assert!(matches!(result, Err(DispatchError::NoFileLoaded)));
    assert!(matches!(dispatcher.line(0), Err(DispatchError::NoFileLoaded)));

    let [Notification::CommandFailed { command, error }] = sink.as_slice() else {
        panic!("expected a single commandFailed, got {sink:?}");
    };
    assert_eq!(command, "findInterestingTrips");
    assert_eq!(error, "no file loaded");
}

#[tokio::test]
async fn forecast_info_streams_records_then_done() {
    let lines = vec![
        snapshot(vec![]),
        snapshot(vec![trip_entry(1, 10, 30), trip_entry(2, 0, 8)]),
    ];
    let mut dispatcher = loaded(&lines).await;
    let line = dispatcher.line(1).unwrap();

    let mut sink = Vec::new();
    dispatcher
        .handle(Command::GetForecastInfo(line), &mut sink)
        .await
        .unwrap();
    assert_eq!(ops(&sink), vec!["tripForecast", "tripForecast", "getForecastInfoDone"]);
    let Notification::TripForecast { line: at, forecast } = &sink[1] else {
        panic!("expected tripForecast");
    };
    assert_eq!(*at, line);
    assert_eq!(forecast.trip.train_nr, Some(json!(2)));
    assert_eq!(forecast.max_spread, 8);
}

#[tokio::test]
async fn trip_with_broken_cdf_is_reported_and_skipped() {
    let mut broken = trip_entry(1, 10, 30);
    broken["edges"][0]["passenger_cdf"] = json!([{"passengers": 3, "probability": 0.5}]);
    let lines = vec![snapshot(vec![broken, trip_entry(2, 0, 8)])];
    let mut dispatcher = loaded(&lines).await;
    let line = dispatcher.line(0).unwrap();

    let mut sink = Vec::new();
    dispatcher
        .handle(Command::GetForecastInfo(line), &mut sink)
        .await
        .unwrap();
    assert_eq!(ops(&sink), vec!["tripRejected", "tripForecast", "getForecastInfoDone"]);
    let Notification::TripRejected { trip, error, .. } = &sink[0] else {
        panic!("expected tripRejected");
    };
    assert_eq!(trip.train_nr, Some(json!(1)));
    assert!(error.starts_with("invalid cdf"), "{error}");
}

#[tokio::test]
async fn malformed_line_fails_the_request() {
    let lines = vec!["{\"trips\": [1, }".to_string()];
    let mut dispatcher = loaded(&lines).await;
    let line = dispatcher.line(0).unwrap();

    let mut sink = Vec::new();
    let result = dispatcher
        .handle(Command::GetForecastInfo(line), &mut sink)
        .await;
    assert!(matches!(
        result,
        Err(DispatchError::Forecast(ForecastError::MalformedRecord { .. }))
    ));
    assert_eq!(ops(&sink), vec!["commandFailed"]);
}

#[tokio::test]
async fn interesting_trips_stream_progress_records_done() {
    let lines = vec![
        snapshot_at(1, vec![trip_entry(1, 0, 10)]),
        snapshot_at(2, vec![trip_entry(2, 0, 100)]),
        snapshot_at(3, vec![trip_entry(3, 0, 0)]),
    ];
    let mut dispatcher = loaded(&lines).await;

    let mut sink = Vec::new();
    dispatcher
        .handle(Command::FindInterestingTrips, &mut sink)
        .await
        .unwrap();
    assert_eq!(
        ops(&sink),
        vec![
            "findInterestingTripsProgress",
            "findInterestingTripsProgress",
            "findInterestingTripsProgress",
            "tripForecast",
            "tripForecast",
            "findInterestingTripsDone",
        ]
    );
    let spreads: Vec<_> = sink
        .iter()
        .filter_map(|n| match n {
            Notification::TripForecast { forecast, .. } => {
                Some((forecast.max_spread, forecast.system_time))
            }
            _ => None,
        })
        .collect();
    assert_eq!(spreads, vec![(100, Some(2)), (10, Some(1))]);
}

#[tokio::test]
async fn reload_replaces_session() {
    let mut dispatcher = loaded(&[snapshot(vec![]), snapshot(vec![])]).await;
    assert_eq!(dispatcher.session().map(|s| s.lines().len()), Some(2));

    let mut sink = Vec::new();
    dispatcher
        .handle(Command::LoadFile(log(&[snapshot(vec![])])), &mut sink)
        .await
        .unwrap();
    assert_eq!(dispatcher.session().map(|s| s.lines().len()), Some(1));
    assert!(dispatcher.line(1).is_err());
}

#[tokio::test]
async fn channel_sink_receives_in_order() {
    let mut dispatcher = loaded(&[snapshot(vec![trip_entry(1, 0, 10)])]).await;
    let line: LineDescriptor = dispatcher.line(0).unwrap();
    let (mut sink, mut rx) = ChannelSink::channel();
    dispatcher
        .handle(Command::GetForecastInfo(line), &mut sink)
        .await
        .unwrap();
    drop(sink);

    let mut received = Vec::new();
    while let Some(notification) = rx.recv().await {
        received.push(notification);
    }
    assert_eq!(ops(&received), vec!["tripForecast", "getForecastInfoDone"]);
}
