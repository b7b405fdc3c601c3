//! Box Breathing - A state-managed HTTP server hosting breathing exercise timers
//!
//! This is the main entry point for the box-breathing application.

use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use box_breathing::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("box_breathing={},tower_http=info", config.log_level()))
        .init();

    info!("Starting box-breathing server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, max_sessions={}, autostart={}",
          config.host, config.port, config.max_sessions, config.autostart);

    let state = Arc::new(
        AppState::new(config.port, config.host.clone(), config.max_sessions)
            .with_autostart(config.autostart),
    );
    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /breathing            - Open a breathing session");
    info!("  GET    /breathing/:id        - Current phase and countdown");
    info!("  POST   /breathing/:id/start  - Start the countdown");
    info!("  POST   /breathing/:id/stop   - Stop the countdown");
    info!("  POST   /breathing/:id/toggle - Start or stop");
    info!("  GET    /breathing/:id/events - Stream state changes (SSE)");
    info!("  DELETE /breathing/:id        - Close a session");
    info!("  GET    /status               - Session counts and uptime");
    info!("  GET    /health               - Health check");

    let server = axum::serve(listener, app).into_future();

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Release every tick source before exiting
    state.close_all()?;

    info!("Server shutdown complete");
    Ok(())
}
