//! Single-line forecast parse.

use json_event_parser::JsonEvent;
use tokio::io::AsyncReadExt;
use tracing::trace;

use super::{Assembled, Selector, TripAssembler};
use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor, Trip, TripForecast};
use crate::scan::Scanner;
use crate::source::ByteSource;

/// Nesting depth of the per-trip keys inside a forecast snapshot.
const FORECAST_DEPTH: usize = 4;

/// Receives the results of [`parse_line`].
pub trait ForecastHandler {
    /// A trip's `edges` array completed.
    fn trip_forecast(&mut self, forecast: TripForecast);

    /// A trip was dropped because its edges could not be summarized.
    fn trip_rejected(&mut self, _trip: Trip, _error: ForecastError) {}

    /// `consumed` of the line's `size` body bytes have been parsed.
    fn progress(&mut self, _consumed: u64, _size: u64) {}

    /// The line was parsed to the end without error.
    fn done(&mut self) {}
}

impl<F: FnMut(TripForecast)> ForecastHandler for F {
    fn trip_forecast(&mut self, forecast: TripForecast) {
        self(forecast)
    }
}

/// Key filter for forecast snapshots.
pub fn is_forecast_key(key: &str, depth: usize) -> bool {
    depth == FORECAST_DEPTH
        && matches!(
            key,
            "trip" | "edges" | "primary_station" | "secondary_station" | "service_infos"
        )
}

struct RecordStream<F> {
    selector: Selector<F>,
    assembler: TripAssembler,
}

impl<F: Fn(&str, usize) -> bool> RecordStream<F> {
    fn accept<H: ForecastHandler>(
        &mut self,
        event: JsonEvent<'_>,
        depth: usize,
        offset: u64,
        handler: &mut H,
    ) -> Result<(), ForecastError> {
        if let Some(selected) = self.selector.accept(event, depth) {
            match self.assembler.accept(selected, offset)? {
                Some(Assembled::Forecast(forecast)) => handler.trip_forecast(forecast),
                Some(Assembled::Rejected { trip, error }) => handler.trip_rejected(trip, error),
                None => {}
            }
        }
        Ok(())
    }
}

/// Parse the JSON body of `line` from `source`, reporting every trip
/// forecast to `handler` as soon as it is complete.
///
/// The body is read in `read_chunk_size` pieces and never held in memory as
/// a whole. `handler.done()` is called once the body parsed cleanly (an
/// empty body included); on error the records already delivered stand, but
/// `done` is not called.
pub async fn parse_line<S, H>(
    source: &S,
    line: &LineDescriptor,
    config: &ScanConfig,
    handler: &mut H,
) -> Result<(), ForecastError>
where
    S: ByteSource,
    H: ForecastHandler,
{
    let size = line.body_len();
    let mut reader = source.slice(line.begin, line.end).await?;
    let mut buf = vec![0; config.read_chunk_size.max(1)];

    let mut scanner = Scanner::new();
    let mut records = RecordStream {
        selector: Selector::new(is_forecast_key),
        assembler: TripAssembler::new(),
    };
    let mut consumed = 0;
    let mut last_progress = 0;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        // Sub-trees completing in this chunk are attributed to its start.
        let chunk_start = consumed;
        scanner.feed(&buf[..n], |event, depth| {
            records.accept(event, depth, chunk_start, &mut *handler)
        })?;
        consumed += n as u64;

        if consumed - last_progress >= config.line_progress_step {
            last_progress = consumed;
            handler.progress(consumed, size);
        }
    }

    scanner.finish(|event, depth| records.accept(event, depth, consumed, &mut *handler))?;
    trace!(begin = line.begin, bytes = consumed, "line parsed");
    handler.done();
    Ok(())
}
