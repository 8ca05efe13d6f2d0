//! HTTP transport for the MCP server.
//!
//! JSON-RPC over HTTP POST plus a health probe. Requests are forwarded
//! to the server core through an mpsc channel and answered on a
//! per-request reply channel.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tokio::sync::mpsc;

use redshift_mcp_core::{JsonRpcRequest, JsonRpcResponse};

use crate::error::ServerError;

/// HTTP transport handler state.
pub struct HttpTransportState {
    /// Channel for sending requests to the MCP server.
    request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>,
}

impl HttpTransportState {
    pub fn new(request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>) -> Self {
        Self { request_tx }
    }
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let (response_tx, mut response_rx) = mpsc::channel(1);

    if state.request_tx.send((request, response_tx)).await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(
                None,
                -32603,
                "MCP server unavailable",
            )),
        );
    }

    match response_rx.recv().await {
        Some(response) => (StatusCode::OK, Json(response)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(
                None,
                -32603,
                "No response from MCP server",
            )),
        ),
    }
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "redshift-mcp-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    host: String,
    port: u16,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        host: &str,
        port: u16,
        request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>,
    ) -> Self {
        Self {
            host: host.to_string(),
            port,
            state: Arc::new(HttpTransportState::new(request_tx)),
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = create_router(self.state);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::StartupFailed(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!(%addr, "MCP HTTP server listening");

        axum::serve(listener, app).await?;

        Ok(())
    }
}
