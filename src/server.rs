use axum::{
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::error::EndpointError;

pub struct WebServer {
    host: String,
    port: u16,
    state: AppState,
}

impl WebServer {
    pub fn new(host: String, port: u16, state: AppState) -> Self {
        Self { host, port, state }
    }

    pub async fn start(&self) -> Result<(), EndpointError> {
        let app = create_router(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| EndpointError::Error(format!("Invalid address: {}", e)))?;

        println!("Endpoint hosts server starting on http://{}", addr);
        log::info!(
            "Reading hosts from '{}', metadata from '{}', policy responses from '{}'",
            self.state.indices.hosts,
            self.state.indices.metadata,
            self.state.indices.policy_response
        );

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EndpointError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Server ready to handle requests");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                log::info!("Shutdown signal received");
                println!("\nShutdown signal received - stopping server gracefully...");
            })
            .await
            .map_err(|e| EndpointError::Error(format!("Server error: {}", e)))?;

        log::info!("Server shutdown complete");
        Ok(())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Legacy endpoint routes
        .route("/endpoint/hosts", get(api::hosts::list_hosts))
        .route(
            "/endpoint/process-lineage",
            get(api::process_lineage::get_process_lineage),
        )

        // Host management
        .route("/api/endpoint/metadata", post(api::metadata::list_metadata))
        .route("/api/endpoint/metadata/{id}", get(api::metadata::get_metadata))
        .route(
            "/api/endpoint/policy_response",
            get(api::policy::get_policy_response),
        )

        // Search bar support
        .route(
            "/api/index_patterns/_fields_for_wildcard",
            get(api::index_patterns::fields_for_wildcard),
        )

        .with_state(state)
}

async fn health_check() -> Result<(StatusCode, Html<String>), StatusCode> {
    Ok((
        StatusCode::OK,
        Html("<h1>Endpoint Hosts Server</h1><p>Server is running</p>".to_string()),
    ))
}

/// Waits for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received SIGINT (Ctrl+C)");
        },
        _ = terminate => {
            log::info!("Received SIGTERM");
        },
    }
}
