use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use paxforecast_log::config::{ScanConfig, ServerConfig};
use paxforecast_log::session::{Command, Dispatcher, FnSink, Notification};
use paxforecast_log::source::FileSource;
use paxforecast_log::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let mut dispatcher = Dispatcher::new(ScanConfig::default());

    // A preload that fails leaves the server running without a file.
    if let Some(path) = &config.preload {
        match FileSource::open(path).await {
            Ok(source) => {
                let mut sink = FnSink(|_: Notification| {});
                if dispatcher.handle(Command::LoadFile(source), &mut sink).await.is_ok() {
                    info!(path = %path.display(), "preloaded log file");
                }
            }
            Err(e) => error!(path = %path.display(), error = %e, "cannot open log file"),
        }
    }

    let app = create_router(AppState::new(dispatcher));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "paxforecast log server listening");
    info!("  GET  /health                 - Health check");
    info!("  POST /file/load              - Load a log file");
    info!("  GET  /lines                  - Line index");
    info!("  GET  /lines/:index/forecast  - Trip forecasts of one line");
    info!("  GET  /interesting-trips      - Most uncertain trips");

    axum::serve(listener, app).await?;
    Ok(())
}
