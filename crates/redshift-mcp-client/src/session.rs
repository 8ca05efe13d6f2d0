//! Session gateway to the MCP server.
//!
//! Owns the connection lifecycle and the cached tool catalog. The wire
//! sits behind [`McpTransport`] so tests can swap in an in-process
//! server; the real transport is JSON-RPC over HTTP POST.

use async_trait::async_trait;
use serde_json::{Value, json};

use redshift_mcp_core::{
    CallToolResponse, JsonRpcRequest, JsonRpcResponse, ListResourcesResponse, ListToolsResponse,
    ResourceDescriptor, ToolDefinition,
};

use crate::error::ClientError;

/// Connection lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Request/response channel to an MCP server.
#[async_trait]
pub trait McpTransport: Send + Sync {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ClientError>;
}

/// JSON-RPC over HTTP POST.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        // Error envelopes ride on non-2xx statuses too; decode the body
        // either way and let the JSON-RPC layer sort it out.
        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

/// Client session over one transport.
pub struct Session {
    transport: Box<dyn McpTransport>,
    state: SessionState,
    tools: Vec<ToolDefinition>,
    next_id: u64,
}

impl Session {
    pub fn new(transport: Box<dyn McpTransport>) -> Self {
        Self {
            transport,
            state: SessionState::Disconnected,
            tools: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Cached tool catalog, in server order.
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Establish the session: initialize handshake, then an initial tool
    /// catalog fetch. Any failure lands the session back in Disconnected.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Connecting;
        match self.establish().await {
            Ok(()) => {
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Disconnected;
                self.tools.clear();
                Err(err)
            }
        }
    }

    /// Tear down and rebuild the whole session state.
    pub async fn reconnect(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Disconnected;
        self.tools.clear();
        self.connect().await
    }

    async fn establish(&mut self) -> Result<(), ClientError> {
        let init = self.call("initialize", Some(json!({}))).await?;
        tracing::info!(
            server = init["serverInfo"]["name"].as_str().unwrap_or("unknown"),
            "initialized session"
        );
        self.call("initialized", Some(json!({}))).await?;

        self.tools = self.fetch_tools().await?;
        Ok(())
    }

    /// Re-fetch the tool catalog from the server. Failures propagate and
    /// leave the previous catalog in place for a later retry.
    pub async fn refresh_tools(&mut self) -> Result<&[ToolDefinition], ClientError> {
        self.ensure_connected()?;
        tracing::info!("refreshing tool catalog");
        let tools = self.fetch_tools().await?;
        self.tools = tools;
        Ok(&self.tools)
    }

    async fn fetch_tools(&mut self) -> Result<Vec<ToolDefinition>, ClientError> {
        let result = self.call("tools/list", Some(json!({}))).await?;
        let listing: ListToolsResponse = serde_json::from_value(result)?;
        Ok(listing.tools)
    }

    /// List resources advertised by the server.
    pub async fn list_resources(&mut self) -> Result<Vec<ResourceDescriptor>, ClientError> {
        self.ensure_connected()?;
        let result = self.call("resources/list", Some(json!({}))).await?;
        let listing: ListResourcesResponse = serde_json::from_value(result)?;
        Ok(listing.resources)
    }

    /// Invoke a tool by name with already-normalized arguments.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResponse, ClientError> {
        self.ensure_connected()?;
        let params = json!({"name": name, "arguments": arguments});
        let result = self.call("tools/call", Some(params)).await?;
        let response: CallToolResponse = serde_json::from_value(result)?;
        Ok(response)
    }

    async fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, ClientError> {
        self.next_id += 1;
        let request = JsonRpcRequest::new(self.next_id, method, params);

        let response = self.transport.request(request).await?;
        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            ClientError::Transport("server returned neither result nor error".to_string())
        })
    }

    fn ensure_connected(&self) -> Result<(), ClientError> {
        if self.state != SessionState::Connected {
            return Err(ClientError::NotConnected);
        }
        Ok(())
    }
}
