//! Data transfer objects for web requests and responses.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::LineDescriptor;

/// Request to load a log file from the server's filesystem.
#[derive(Debug, Deserialize)]
pub struct LoadFileRequest {
    pub path: PathBuf,
}

/// Line index of the loaded file.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineDescriptor>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
