//! Router assembly and the listener loop.

use std::io;
use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(api::ping))
        .route(
            "/export/xlsx",
            get(api::export_sample_xlsx).post(api::export_xlsx),
        )
        .route("/export/pdf", get(api::export_sample_pdf).post(api::export_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(state.config.listen_addr).await?;
    serve_on(listener, state).await
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, state: AppState) -> io::Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!("Server listening at http://{addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C, shutdown only by kill: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
