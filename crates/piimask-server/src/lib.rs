//! piimask HTTP service: detection, span resolution and masking over axum.

pub mod api;
pub mod pipeline;
pub mod routes;
pub mod state;

use std::sync::Arc;

use piimask_core::ServiceConfig;
use piimask_detect::Detector;
use tracing::info;

pub use routes::build_router;
pub use state::AppState;

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(
    config: ServiceConfig,
    detector: Option<Arc<dyn Detector>>,
) -> piimask_core::Result<()> {
    let addr = config.listen_addr();
    let state = Arc::new(AppState::new(config, detector));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("piimask server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("piimask server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
