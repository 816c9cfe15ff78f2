//! HTTP API for RD documentation sites.
//!
//! Serves the navigation tree, single pages, the page listing and the
//! search export of a [`DocsSite`] over axum, plus a cache invalidation
//! endpoint for webhooks.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rd_server::{ServerConfig, run_server};
//!
//! let site = Arc::new(DocsSite::new(client, site_config));
//! let config = ServerConfig {
//!     host: "127.0.0.1".to_owned(),
//!     port: 7979,
//!     version: "0.1.0".to_owned(),
//! };
//! run_server(config, site).await?;
//! ```
//!
//! # Routes
//!
//! ```text
//! GET  /api/navigation         navigation tree
//! GET  /api/pages/{*slug}      page metadata and markdown body (ETag aware)
//! GET  /api/listing            page listing
//! GET  /static.json            search records
//! POST /api/cache/invalidate   evict one key or clear every cache
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use rd_site::DocsSite;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Application version (mixed into ETags).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            version: String::new(),
        }
    }
}

/// Build the application router for `site`.
#[must_use]
pub fn router(site: Arc<DocsSite>, version: impl Into<String>) -> Router {
    app::create_router(Arc::new(AppState {
        site,
        version: version.into(),
    }))
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn run_server(
    config: ServerConfig,
    site: Arc<DocsSite>,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = site.repo().to_string();
    let app = router(site, config.version);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, %repo, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
///
/// If the handler cannot be installed the server keeps running.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from RD config.
#[must_use]
pub fn server_config_from_rd_config(config: &rd_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        version,
    }
}
