//! Line index entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot timestamp as found in the log (seconds since the Unix epoch).
pub type SystemTime = i64;

/// Location of one line in the source file.
///
/// `end` is the offset of the terminating newline (or the file size for an
/// unterminated last line), so `[begin, end)` is the JSON body and
/// `length = end - begin + 1` includes the newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDescriptor {
    pub begin: u64,
    pub end: u64,
    pub length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_time: Option<SystemTime>,
}

impl LineDescriptor {
    /// Create a descriptor for the line spanning `[begin, end)`.
    pub fn new(begin: u64, end: u64) -> Self {
        Self {
            begin,
            end,
            length: end - begin + 1,
            system_time: None,
        }
    }

    /// Number of body bytes, excluding the newline.
    pub fn body_len(&self) -> u64 {
        self.end.saturating_sub(self.begin)
    }

    /// The snapshot time as a UTC timestamp, if known and in range.
    pub fn system_time_utc(&self) -> Option<DateTime<Utc>> {
        self.system_time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
