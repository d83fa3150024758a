//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::session::Dispatcher;
use crate::source::FileSource;

/// Shared application state.
///
/// The dispatcher is locked for the whole run of a command, so commands
/// from concurrent requests queue up behind each other.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Mutex<Dispatcher<FileSource>>>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher<FileSource>) -> Self {
        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
        }
    }
}
