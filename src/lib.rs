pub mod analysis;
pub mod db;
pub mod error;
pub mod http;
pub mod ingest;
pub mod settings;
pub mod telemetry;
mod utils;

use anyhow::{Context, Result};
use log::{info, warn};

use analysis::config::{DEFAULT_HORIZON_SECS, DEFAULT_WINDOW_HOURS};
use db::Database;
use ingest::Ingestor;
use settings::Settings;
use telemetry::{ForwarderHandle, ForwardingController};

/// Window and horizon used by `/forecast` when the query omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDefaults {
    pub window_hours: u32,
    pub horizon_secs: i64,
}

impl Default for ForecastDefaults {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            horizon_secs: DEFAULT_HORIZON_SECS,
        }
    }
}

/// Handles shared by every request. The store handle is passed in, never global.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ingestor: Ingestor,
    pub defaults: ForecastDefaults,
}

impl AppState {
    pub fn new(db: Database, forwarder: Option<ForwarderHandle>, defaults: ForecastDefaults) -> Self {
        Self {
            ingestor: Ingestor::new(db.clone(), forwarder),
            db,
            defaults,
        }
    }
}

pub async fn run() -> Result<()> {
    let settings = Settings::from_env()?;

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Plant monitor v{} starting up...", env!("CARGO_PKG_VERSION"));

    let db_path = settings.db_path.clone();
    let database = tokio::task::spawn_blocking(move || Database::new(db_path))
        .await
        .context("database startup task panicked")??
        .with_op_timeout(settings.store_timeout);

    let mut forwarding = ForwardingController::new();
    let forwarder = match &settings.forwarding {
        Some(forwarding_settings) => Some(forwarding.start(forwarding_settings)?),
        None => {
            warn!("UBIDOTS_TOKEN not set; telemetry forwarding disabled");
            None
        }
    };

    let state = AppState::new(
        database,
        forwarder,
        ForecastDefaults {
            window_hours: settings.window_hours,
            horizon_secs: settings.horizon_secs,
        },
    );

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!("Listening on {}", settings.bind_addr);

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    forwarding.stop().await?;
    info!("Plant monitor shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
