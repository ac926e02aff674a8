//! Geocam Console
//!
//! Main entry point for the camera map console.

use geocam_console::{
    alerts::UserAlerts,
    backend::BackendClient,
    camera_store::CameraMarkerStore,
    console::{shapes::ShapeFlow, MapConsole},
    form_flow::CameraFormFlow,
    state::AppConfig,
    stream::{hls::HlsEngine, StreamAttachments},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geocam_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Geocam Console v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        backend_url = %config.backend_url,
        sync_endpoint = %config.sync_endpoint,
        provisioning_delay_secs = config.provisioning_delay.as_secs(),
        reconnect_backoff_secs = config.reconnect_backoff.as_secs(),
        adaptive_streaming = config.adaptive_streaming,
        "Configuration loaded"
    );

    // Initialize components
    let alerts = Arc::new(UserAlerts::new(config.alert_capacity));

    let engine = config.adaptive_streaming.then(|| {
        Arc::new(HlsEngine::new(
            config.playlist_poll_interval,
            config.http_timeout,
        ))
    });
    let attachments = Arc::new(StreamAttachments::new(engine, config.native_hls));
    tracing::info!("StreamAttachments initialized");

    let store = Arc::new(CameraMarkerStore::new(attachments));
    tracing::info!("CameraMarkerStore initialized");

    let backend = Arc::new(BackendClient::new(&config.backend_url, config.http_timeout)?);
    tracing::info!("BackendClient initialized");

    let form = Arc::new(CameraFormFlow::new(backend.clone(), alerts.clone()));
    let shapes = Arc::new(ShapeFlow::new(backend.clone(), alerts.clone()));
    tracing::info!("CameraFormFlow and ShapeFlow initialized");

    // Wire and start the console
    let console = Arc::new(MapConsole::new(
        config, backend, store, form, shapes, alerts,
    ));
    console.clone().start().await?;
    tracing::info!("Map console running - press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    console.stop().await;

    Ok(())
}
