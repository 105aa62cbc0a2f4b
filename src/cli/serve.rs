//! HTTP server command handler.

use std::net::SocketAddr;

use color_eyre::Result;

use crate::api;
use crate::config::Config;
use crate::context::Context;

use super::App;

impl App {
    /// Run the HTTP API until Ctrl-C.
    pub async fn run_serve(&self, host: Option<String>, port: Option<u16>) -> Result<()> {
        tracing::info!("Starting hnetdb HTTP server");

        let mut config = Config::load()?;
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }

        let ctx = Context::connect(&config).await?;
        let app = api::router(ctx);

        let addr: SocketAddr = config
            .bind_address()
            .parse()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid address {}: {}", config.bind_address(), e))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("hnetdb listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                color_eyre::eyre::eyre!("HTTP server error: {}", e)
            })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
