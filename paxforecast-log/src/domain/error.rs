//! Forecast processing error types.

use crate::scan::ScanError;

/// Errors raised while reading or interpreting forecast data.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// A quantile could not be located in a passenger CDF.
    ///
    /// Indicates malformed upstream data (the CDF never reaches `quantile`).
    #[error("invalid cdf: no entry reaches probability {quantile}")]
    InvalidCdf { quantile: f64 },

    /// A line's JSON body could not be parsed or decoded.
    #[error("malformed record at byte {offset}: {message}")]
    MalformedRecord { offset: u64, message: String },

    /// The byte source failed while being read.
    #[error("stream read failure: {0}")]
    StreamRead(#[from] std::io::Error),
}

impl From<ScanError> for ForecastError {
    fn from(err: ScanError) -> Self {
        ForecastError::MalformedRecord {
            offset: err.offset,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ForecastError::InvalidCdf { quantile: 0.95 };
        assert_eq!(err.to_string(), "invalid cdf: no entry reaches probability 0.95");

        let err = ForecastError::MalformedRecord {
            offset: 17,
            message: "unexpected character".into(),
        };
        assert_eq!(err.to_string(), "malformed record at byte 17: unexpected character");
    }

    #[test]
    fn scan_error_becomes_malformed_record() {
        let err: ForecastError = ScanError {
            offset: 3,
            message: "unexpected end of input".into(),
        }
        .into();
        assert!(matches!(err, ForecastError::MalformedRecord { offset: 3, .. }));
    }
}
