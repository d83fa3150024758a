//! HTTP host for the forecast log dispatcher.
//!
//! Command endpoints answer with the command's notifications as
//! newline-delimited JSON, streamed while the command runs.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
