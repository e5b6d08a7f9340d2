//! Worker server lifecycle: bind → serve → graceful shutdown on ctrl-c.

use std::net::SocketAddr;

use super::router::api_router;
use super::types::ApiContext;

/// Serve the trigger surface until the process is asked to stop.
pub async fn serve(ctx: ApiContext, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, "Worker service listening");

    axum::serve(listener, api_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to install shutdown handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
