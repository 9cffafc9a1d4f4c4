//! Web layer module
//!
//! HTTP interface for triggering collections and reading collected data.
//! Handlers stay thin and delegate to the `CollectionOrchestrator`; every
//! response uses the `ApiResponse` envelope from [`responses`].

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::sync::{broadcast, oneshot};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::WebConfig;
use crate::errors::AppError;
use crate::ingestor::CollectionOrchestrator;

pub mod handlers;
pub mod responses;

pub use responses::{ApiResponse, handle_error, handle_result};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: CollectionOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: CollectionOrchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Build the router with all routes and layers
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/stats", get(handlers::health::stats))
        .route("/status", get(handlers::health::run_status))
        .route("/collect/playlist", post(handlers::collect::collect_playlist))
        .route("/collect/epg", post(handlers::collect::collect_epg))
        .route(
            "/collect/epg/{external_id}",
            post(handlers::collect::collect_channel_epg),
        )
        .route("/channels", get(handlers::channels::list_channels))
        .route(
            "/channels/{external_id}/epg",
            get(handlers::channels::channel_programs),
        )
        .route(
            "/channels/{external_id}/epg/range",
            get(handlers::channels::channel_programs_in_range),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Invalid web listen address {}:{}: {}",
                    config.host, config.port, e
                ))
            })?;
        Ok(Self {
            app: create_app(state),
            addr,
        })
    }

    /// Serve until a shutdown broadcast arrives
    ///
    /// `ready_signal` resolves once the listener is bound, or with the bind error.
    pub async fn serve_with_shutdown(
        self,
        ready_signal: oneshot::Sender<Result<()>>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                let _ = ready_signal.send(Ok(()));
                tracing::info!("Web server listening on {}", self.addr);

                let shutdown_signal = async move {
                    let _ = shutdown_rx.recv().await;
                    tracing::info!("Web server received shutdown signal, shutting down gracefully");
                };

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal)
                    .await?;
                Ok(())
            }
            Err(bind_error) => {
                let bind_err_msg = format!("Failed to bind to {}: {}", self.addr, bind_error);
                let _ = ready_signal.send(Err(anyhow::anyhow!("{}", bind_err_msg)));
                Err(anyhow::anyhow!("{}", bind_err_msg))
            }
        }
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
