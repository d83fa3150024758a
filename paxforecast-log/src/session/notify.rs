//! Notifications and where they go.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{LineDescriptor, Trip, TripForecast};

/// Messages emitted while a command runs, tagged by `op`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Notification {
    FileLoadProgress {
        offset: u64,
        size: u64,
    },
    FileLoaded {
        lines: Vec<LineDescriptor>,
    },
    GetForecastInfoProgress {
        line: LineDescriptor,
        progress: u64,
        size: u64,
    },
    /// One trip forecast, from a single-line request or a ranking pass.
    TripForecast {
        line: LineDescriptor,
        #[serde(flatten)]
        forecast: TripForecast,
    },
    /// A trip of a single-line request was dropped; the line goes on.
    TripRejected {
        line: LineDescriptor,
        trip: Trip,
        error: String,
    },
    GetForecastInfoDone {
        line: LineDescriptor,
    },
    FindInterestingTripsProgress {
        progress: usize,
        size: usize,
    },
    FindInterestingTripsDone,
    CommandFailed {
        command: String,
        error: String,
    },
}

/// Receives notifications in emission order.
///
/// Delivery is fire-and-forget: a sink never reports failure back to the
/// command that emitted the notification.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Forwards notifications to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Create a sink and the receiver its notifications arrive at.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&mut self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("notification receiver dropped");
        }
    }
}

/// Calls a closure for every notification.
pub struct FnSink<F>(pub F);

impl<F: FnMut(Notification)> NotificationSink for FnSink<F> {
    fn notify(&mut self, notification: Notification) {
        (self.0)(notification)
    }
}
