use anyhow::Result;
use tokio::net::TcpListener;

use webpush_relay::config::Settings;
use webpush_relay::server::{create_app, AppState};
use webpush_relay::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.log);
    tracing::info!("Configuration loaded");

    // Create application state
    let state = AppState::new(settings.clone())?;
    tracing::info!(
        vapid_public_key = %state.push.sender().vapid().public_key_base64url(),
        "Application state initialized"
    );

    let shutdown = state.shutdown.clone();

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown; open SSE streams end on the same signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait_for_os_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
