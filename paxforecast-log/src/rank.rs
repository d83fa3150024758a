//! Interesting-trip ranking.
//!
//! A trip is interesting when its forecast is uncertain: the larger the gap
//! between the lowest and highest plausible passenger count on any of its
//! edges, the higher it ranks.

use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::domain::{ForecastError, LineDescriptor, TripForecast};
use crate::record::{ForecastHandler, parse_line};
use crate::source::ByteSource;

/// A retained trip and the line it was found on.
#[derive(Debug, Clone)]
pub struct RankedTrip {
    pub line: LineDescriptor,
    pub forecast: TripForecast,
}

/// Bounded list of trips ordered by descending `max_spread`.
///
/// A candidate is only taken when its spread is strictly greater than the
/// smallest spread currently retained, even while the list still has room.
/// Feeding trips in descending order therefore keeps only the first one.
#[derive(Debug, Clone)]
pub struct InterestingTrips {
    trips: Vec<RankedTrip>,
    capacity: usize,
    min_spread: u32,
    max_spread: u32,
}

impl InterestingTrips {
    pub fn new(capacity: usize) -> Self {
        Self {
            trips: Vec::with_capacity(capacity.min(1024)),
            capacity,
            min_spread: 0,
            max_spread: 0,
        }
    }

    /// Offer a trip seen on `line`; retained trips carry the line's
    /// snapshot time.
    ///
    /// Returns whether the trip was retained.
    pub fn offer(&mut self, mut forecast: TripForecast, line: &LineDescriptor) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if forecast.max_spread == 0 || !forecast.all_edges_have_capacity {
            return false;
        }
        if forecast.max_spread <= self.min_spread {
            return false;
        }

        forecast.system_time = line.system_time;
        let spread = forecast.max_spread;
        // after equal spreads, so earlier trips win ties
        let at = self.trips.partition_point(|t| t.forecast.max_spread >= spread);
        self.trips.insert(at, RankedTrip { line: *line, forecast });
        self.trips.truncate(self.capacity);

        self.min_spread = self.trips.last().map_or(0, |t| t.forecast.max_spread);
        self.max_spread = self.trips.first().map_or(0, |t| t.forecast.max_spread);
        true
    }

    /// Smallest retained spread (0 when empty).
    pub fn min_spread(&self) -> u32 {
        self.min_spread
    }

    /// Largest retained spread (0 when empty).
    pub fn max_spread(&self) -> u32 {
        self.max_spread
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trips(&self) -> &[RankedTrip] {
        &self.trips
    }

    pub fn into_trips(self) -> Vec<RankedTrip> {
        self.trips
    }
}

struct LineRanking<'a> {
    ranking: &'a mut InterestingTrips,
    line: &'a LineDescriptor,
}

impl ForecastHandler for LineRanking<'_> {
    fn trip_forecast(&mut self, forecast: TripForecast) {
        self.ranking.offer(forecast, self.line);
    }
}

/// Parse every line of `source` and return the most interesting trips, in
/// descending order of spread.
///
/// `progress(done, total)` is called before each line. A trip with a broken
/// CDF is dropped on its own. Lines with malformed JSON are logged and
/// skipped; trips they completed before failing stay ranked. A read failure
/// aborts the pass.
pub async fn find_interesting_trips<S, P>(
    source: &S,
    lines: &[LineDescriptor],
    config: &ScanConfig,
    mut progress: P,
) -> Result<Vec<RankedTrip>, ForecastError>
where
    S: ByteSource,
    P: FnMut(usize, usize),
{
    let mut ranking = InterestingTrips::new(config.max_interesting_trips);
    let mut skipped = 0usize;

    for (index, line) in lines.iter().enumerate() {
        progress(index, lines.len());
        let mut handler = LineRanking {
            ranking: &mut ranking,
            line,
        };
        match parse_line(source, line, config, &mut handler).await {
            Ok(()) => {}
            Err(err @ ForecastError::StreamRead(_)) => return Err(err),
            Err(err) => {
                skipped += 1;
                warn!(line = index, %err, "skipping unparseable line");
            }
        }
        debug!(line = index, retained = ranking.len(), min_spread = ranking.min_spread(), "line ranked");
    }

    info!(
        lines = lines.len(),
        skipped,
        retained = ranking.len(),
        max_spread = ranking.max_spread(),
        "interesting trip search finished"
    );
    Ok(ranking.into_trips())
}
