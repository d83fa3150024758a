//! Command dispatch against the loaded file.

use tracing::{error, info};

use super::{Notification, NotificationSink};
use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor, Trip, TripForecast};
use crate::lines::index_lines;
use crate::rank::find_interesting_trips;
use crate::record::{ForecastHandler, parse_line};
use crate::source::ByteSource;

/// Errors returned by [`Dispatcher::handle`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no file loaded")]
    NoFileLoaded,

    #[error("line {index} out of range ({count} lines loaded)")]
    LineOutOfRange { index: usize, count: usize },

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// A command, processed to completion before the next one starts.
#[derive(Debug, Clone)]
pub enum Command<S> {
    LoadFile(S),
    GetForecastInfo(LineDescriptor),
    FindInterestingTrips,
}

impl<S> Command<S> {
    /// The command's name as used in notifications.
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoadFile(_) => "loadFile",
            Command::GetForecastInfo(_) => "getForecastInfo",
            Command::FindInterestingTrips => "findInterestingTrips",
        }
    }
}

/// A loaded file together with its line index.
#[derive(Debug)]
pub struct Session<S> {
    source: S,
    lines: Vec<LineDescriptor>,
}

impl<S: ByteSource> Session<S> {
    pub fn lines(&self) -> &[LineDescriptor] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Result<LineDescriptor, DispatchError> {
        self.lines
            .get(index)
            .copied()
            .ok_or(DispatchError::LineOutOfRange {
                index,
                count: self.lines.len(),
            })
    }
}

/// Owns the session and runs commands against it.
///
/// Commands take `&mut self`, so a dispatcher shared between tasks must sit
/// behind a lock; the lock is then held for a command's whole run.
#[derive(Debug)]
pub struct Dispatcher<S> {
    config: ScanConfig,
    session: Option<Session<S>>,
}

impl<S: ByteSource> Dispatcher<S> {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session<S>> {
        self.session.as_ref()
    }

    /// Look up a line of the loaded file.
    pub fn line(&self, index: usize) -> Result<LineDescriptor, DispatchError> {
        self.loaded()?.line(index)
    }

    fn loaded(&self) -> Result<&Session<S>, DispatchError> {
        self.session.as_ref().ok_or(DispatchError::NoFileLoaded)
    }

    /// Run `command`, sending its notifications to `sink`.
    ///
    /// A failed command is also reported to the sink as `commandFailed`.
    pub async fn handle<N: NotificationSink>(
        &mut self,
        command: Command<S>,
        sink: &mut N,
    ) -> Result<(), DispatchError> {
        let name = command.name();
        let result = match command {
            Command::LoadFile(source) => self.load_file(source, sink).await,
            Command::GetForecastInfo(line) => self.get_forecast_info(line, sink).await,
            Command::FindInterestingTrips => self.find_interesting_trips(sink).await,
        };

        if let Err(err) = &result {
            error!(command = name, %err, "command failed");
            sink.notify(Notification::CommandFailed {
                command: name.to_string(),
                error: err.to_string(),
            });
        }
        result
    }

    async fn load_file<N: NotificationSink>(
        &mut self,
        source: S,
        sink: &mut N,
    ) -> Result<(), DispatchError> {
        // the previous file is gone even if this load fails
        self.session = None;
        info!(bytes = source.size(), "loading file");

        let lines = index_lines(&source, &self.config, |offset, size| {
            sink.notify(Notification::FileLoadProgress { offset, size })
        })
        .await?;

        let first = lines.iter().find_map(LineDescriptor::system_time_utc);
        let last = lines.iter().rev().find_map(LineDescriptor::system_time_utc);
        info!(
            lines = lines.len(),
            bytes = source.size(),
            first = ?first,
            last = ?last,
            "file loaded"
        );

        sink.notify(Notification::FileLoaded {
            lines: lines.clone(),
        });
        self.session = Some(Session { source, lines });
        Ok(())
    }

    async fn get_forecast_info<N: NotificationSink>(
        &mut self,
        line: LineDescriptor,
        sink: &mut N,
    ) -> Result<(), DispatchError> {
        let session = self.loaded()?;
        let mut handler = LineNotifier { line, sink };
        parse_line(&session.source, &line, &self.config, &mut handler).await?;
        Ok(())
    }

    async fn find_interesting_trips<N: NotificationSink>(
        &mut self,
        sink: &mut N,
    ) -> Result<(), DispatchError> {
        let session = self.loaded()?;
        let trips = find_interesting_trips(
            &session.source,
            &session.lines,
            &self.config,
            |progress, size| {
                sink.notify(Notification::FindInterestingTripsProgress { progress, size })
            },
        )
        .await?;

        for trip in trips {
            sink.notify(Notification::TripForecast {
                line: trip.line,
                forecast: trip.forecast,
            });
        }
        sink.notify(Notification::FindInterestingTripsDone);
        Ok(())
    }
}

/// Forwards single-line parse results as notifications.
struct LineNotifier<'a, N> {
    line: LineDescriptor,
    sink: &'a mut N,
}

impl<N: NotificationSink> ForecastHandler for LineNotifier<'_, N> {
    fn trip_forecast(&mut self, forecast: TripForecast) {
        self.sink.notify(Notification::TripForecast {
            line: self.line,
            forecast,
        });
    }

    fn trip_rejected(&mut self, trip: Trip, error: ForecastError) {
        self.sink.notify(Notification::TripRejected {
            line: self.line,
            trip,
            error: error.to_string(),
        });
    }

    fn progress(&mut self, consumed: u64, size: u64) {
        self.sink.notify(Notification::GetForecastInfoProgress {
            line: self.line,
            progress: consumed,
            size,
        });
    }

    fn done(&mut self) {
        self.sink
            .notify(Notification::GetForecastInfoDone { line: self.line });
    }
}
