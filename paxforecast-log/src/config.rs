//! Scan, ranking and server configuration.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Tuning parameters for file scans, line parses and ranking.
///
/// Progress steps only affect how often notifications are sent; results do
/// not depend on them.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of leading bytes kept per line for cheap inspection.
    pub max_prefix_len: usize,

    /// Bytes consumed between file load progress notifications.
    pub file_progress_step: u64,

    /// Bytes consumed between per-line parse progress notifications.
    pub line_progress_step: u64,

    /// Size of the buffer used for each read from a byte source.
    pub read_chunk_size: usize,

    /// Number of trips retained by the interesting-trip ranking.
    pub max_interesting_trips: usize,
}

impl ScanConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_prefix_len: usize,
        file_progress_step: u64,
        line_progress_step: u64,
        read_chunk_size: usize,
        max_interesting_trips: usize,
    ) -> Self {
        Self {
            max_prefix_len,
            file_progress_step,
            line_progress_step,
            read_chunk_size,
            max_interesting_trips,
        }
    }

    /// Override the read buffer size.
    ///
    /// Values below one byte are raised to one.
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size.max(1);
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_prefix_len: 1024,
            file_progress_step: 100 * 1024 * 1024, // 100 MiB
            line_progress_step: 64 * 1024,         // 64 KiB
            read_chunk_size: 64 * 1024,
            max_interesting_trips: 500,
        }
    }
}

/// Environment variable holding the listen address.
pub const ADDR_VAR: &str = "PAXLOG_ADDR";

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PAXLOG_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: SocketAddr,

    /// Log file to load before serving, if any.
    pub preload: Option<PathBuf>,
}

impl ServerConfig {
    /// Read `PAXLOG_ADDR` and take the first command-line argument as the
    /// file to preload.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = std::env::var(ADDR_VAR).ok();
        let preload = std::env::args_os().nth(1).map(PathBuf::from);
        Self::from_parts(addr.as_deref(), preload)
    }

    pub fn from_parts(addr: Option<&str>, preload: Option<PathBuf>) -> Result<Self, ConfigError> {
        let value = addr.map(str::trim).filter(|a| !a.is_empty()).unwrap_or(DEFAULT_ADDR);
        let addr = value.parse().map_err(|source| ConfigError::InvalidAddr {
            value: value.to_string(),
            source,
        })?;
        Ok(Self { addr, preload })
    }
}
