//! Yelb application server
//!
//! HTTP backend of the Yelb restaurant voting demo. One endpoint serves every
//! request; the `api_path` query parameter picks the operation.
//!
//! # Architecture
//!
//! - **Routes**: the dispatcher that maps API paths to operations
//! - **Cache**: the page-view counter on Redis Cluster or DynamoDB
//! - **Db**: restaurant vote counts in PostgreSQL
//! - **Middleware**: CORS headers and request logging
//!
//! # Features
//!
//! - `tracing` - Structured logging with tracing-subscriber

#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
#[cfg(feature = "tracing")]
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use anyhow::Context;
use axum::Router;
use crate::config::validate_config;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Validate the configuration and connect every store.
    pub async fn new(config: ServerConfig) -> Result<Self, anyhow::Error> {
        if let Err(errors) = validate_config(&config) {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow::bail!("invalid configuration: {}", messages.join("; "));
        }

        let state = AppState::new(&config).await?;
        Ok(Self { config, state })
    }

    /// Build the router with the dispatcher and all middleware.
    pub fn router(&self) -> Router {
        routes::create_router_with_logging(self.state.clone(), self.config.logging.log_requests)
    }

    /// Run the server until a shutdown signal, then release the stores.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!(
            backend = %self.state.counter.backend(),
            "Server listening on {}",
            addr
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.state.close().await;
        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, anyhow::Error> {
        self.config
            .server
            .socket_addr()
            .with_context(|| format!("invalid listen address {}", self.config.server.host))
    }
}

/// Resolve on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
