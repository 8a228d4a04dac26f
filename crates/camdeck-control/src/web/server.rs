//! Axum HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{ControlError, Result};
use crate::manager::ControlManager;

use super::routes::build_router;
use super::websocket::ws_handler;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ControlManager>,
}

/// Web server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WebServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            // Bind to localhost by default to avoid accidental network exposure
            host: "127.0.0.1".to_string(),
            port: 8420,
            enable_cors: true,
        }
    }
}

impl WebServerConfig {
    /// Create a config for the given port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the host address
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    /// Set CORS enabled/disabled
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }
}

/// Web server for REST API and WebSocket
pub struct WebServer {
    config: WebServerConfig,
    manager: Arc<ControlManager>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig, manager: Arc<ControlManager>) -> Self {
        Self { config, manager }
    }

    /// Run the web server (blocking)
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| ControlError::InvalidParameter(format!("Invalid address: {}", e)))?;

        let state = AppState {
            manager: self.manager,
        };

        let app = build_router()
            .route("/ws", axum::routing::get(ws_handler))
            .with_state(state);

        let app = if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE])
                    .allow_origin(Any),
            )
        } else {
            app
        };

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service())
            .await
            .map_err(ControlError::IoError)?;

        Ok(())
    }

    /// Spawn the server in a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
