//! HTTP route handlers.

use std::io;

use axum::body::{Body, Bytes};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::sync::{OwnedMutexGuard, mpsc};
use tracing::{debug, error, warn};

use crate::session::{ChannelSink, Command, DispatchError, Dispatcher, Notification};
use crate::source::FileSource;

use super::dto::*;
use super::state::AppState;

const NDJSON: &str = "application/x-ndjson";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/file/load", post(load_file))
        .route("/lines", get(list_lines))
        .route("/lines/:index/forecast", get(line_forecast))
        .route("/interesting-trips", get(interesting_trips))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Load a file and stream its indexing progress.
async fn load_file(
    State(state): State<AppState>,
    Json(req): Json<LoadFileRequest>,
) -> Result<Response, AppError> {
    let source = FileSource::open(&req.path).await.map_err(|e| {
        let message = format!("Cannot open {}: {}", req.path.display(), e);
        match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound { message },
            _ => AppError::BadRequest { message },
        }
    })?;

    let dispatcher = state.dispatcher.lock_owned().await;
    Ok(run_command(dispatcher, Command::LoadFile(source)))
}

/// Line index of the loaded file.
async fn list_lines(State(state): State<AppState>) -> Result<Json<LinesResponse>, AppError> {
    let dispatcher = state.dispatcher.lock().await;
    let session = dispatcher.session().ok_or(DispatchError::NoFileLoaded)?;
    Ok(Json(LinesResponse {
        lines: session.lines().to_vec(),
    }))
}

/// Stream the trip forecasts of one line.
async fn line_forecast(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Response, AppError> {
    let dispatcher = state.dispatcher.lock_owned().await;
    let line = dispatcher.line(index)?;
    Ok(run_command(dispatcher, Command::GetForecastInfo(line)))
}

/// Stream the ranking pass over all lines.
async fn interesting_trips(State(state): State<AppState>) -> Result<Response, AppError> {
    let dispatcher = state.dispatcher.lock_owned().await;
    if dispatcher.session().is_none() {
        return Err(DispatchError::NoFileLoaded.into());
    }
    Ok(run_command(dispatcher, Command::FindInterestingTrips))
}

/// Run `command` in the background, holding the dispatcher lock until it
/// finishes, and stream its notifications.
fn run_command(
    mut dispatcher: OwnedMutexGuard<Dispatcher<FileSource>>,
    command: Command<FileSource>,
) -> Response {
    let (mut sink, rx) = ChannelSink::channel();
    tokio::spawn(async move {
        // failures already went out as commandFailed
        if dispatcher.handle(command, &mut sink).await.is_err() {
            debug!("streamed command failed");
        }
    });
    ndjson(rx)
}

fn ndjson(rx: mpsc::UnboundedReceiver<Notification>) -> Response {
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let notification = rx.recv().await?;
        let chunk = serde_json::to_vec(&notification).map(|mut bytes| {
            bytes.push(b'\n');
            Bytes::from(bytes)
        });
        Some((chunk, rx))
    });
    ([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(stream)).into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        let message = e.to_string();
        match e {
            DispatchError::NoFileLoaded => AppError::Conflict { message },
            DispatchError::LineOutOfRange { .. } => AppError::NotFound { message },
            DispatchError::Forecast(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
