//! MCP server core.
//!
//! Owns the tool registry and the query executor and turns JSON-RPC
//! requests into responses. Transport-agnostic: `run_http` wires it to
//! the HTTP listener through an mpsc channel whose single consumer
//! serializes request handling.

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use redshift_mcp_core::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ListResourcesResponse,
    ListToolsResponse, ReadResourceParams, ReadResourceResponse, ResourceContents,
    ResourceDescriptor,
};

use crate::catalog::{self, RESOURCE_MIME_TYPE};
use crate::error::ServerError;
use crate::executor::QueryExecutor;
use crate::http_transport::HttpServer;
use crate::tools::{ToolRegistry, builtin_tools};
use crate::uri::{ResourceTarget, parse_resource_uri};

/// URI of the whole-schema resource.
pub const SCHEMA_RESOURCE_URI: &str = "redshift://schema";

/// URI of the table-listing resource.
pub const TABLES_RESOURCE_URI: &str = "redshift://tables";

/// MCP server over one Redshift schema.
pub struct McpServer {
    tools: ToolRegistry,
    executor: Option<QueryExecutor>,
    schema: String,
    netloc: String,
}

impl McpServer {
    /// Create a server with the built-in tools registered. `netloc` is the
    /// host[:port] under which per-table resource URIs are minted.
    pub fn new(schema: impl Into<String>, netloc: impl Into<String>) -> Self {
        let mut tools = ToolRegistry::new();
        for tool in builtin_tools() {
            tools.register(tool);
        }

        Self {
            tools,
            executor: None,
            schema: schema.into(),
            netloc: netloc.into(),
        }
    }

    /// Attach the database executor. Without one, catalog and query tools
    /// report a connection error instead of panicking.
    pub fn with_executor(mut self, executor: QueryExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Serve requests over HTTP until the listener fails.
    ///
    /// Requests flow through a channel with a single consumer task, so at
    /// most one request touches the database at a time.
    pub async fn run_http(self, host: &str, port: u16) -> Result<(), ServerError> {
        tracing::info!(host, port, schema = %self.schema, "starting MCP server");

        let (request_tx, mut request_rx) =
            mpsc::channel::<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>(100);

        tokio::spawn(async move {
            while let Some((request, response_tx)) = request_rx.recv().await {
                let response = self.handle_request(request).await;
                let _ = response_tx.send(response).await;
            }
        });

        let http_server = HttpServer::new(host, port, request_tx);
        http_server.run().await
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "resources/list" => self.handle_list_resources(id),
            "resources/read" => self.handle_read_resource(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "redshift-mcp-server",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "resources": {}
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        success_payload(id, &response)
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        if !self.tools.contains(&params.name) {
            return JsonRpcResponse::error(
                id,
                -32602,
                format!("Tool not found: {}", params.name),
            );
        }

        // Execution failures are tool results, not protocol errors; the
        // caller sees them as content with isError set.
        let response = match self.execute_tool(&params.name, &params.arguments).await {
            Ok(payload) => CallToolResponse::json(payload),
            Err(err) => {
                tracing::error!(tool = %params.name, error = %err, "tool call failed");
                CallToolResponse::error(err.to_string())
            }
        };
        success_payload(id, &response)
    }

    async fn execute_tool(&self, name: &str, arguments: &Value) -> Result<Value, ServerError> {
        match name {
            "get_table_schema" => {
                let table_name = required_str(arguments, "table_name", name)?;
                tracing::info!(table = %table_name, "fetching table schema");
                let executor = self.executor()?;
                let columns =
                    catalog::table_schema(executor.pool(), &self.schema, table_name).await?;
                Ok(json!({ "columns": columns }))
            }
            "query" => {
                let sql = required_str(arguments, "sql", name)?;
                tracing::info!(%sql, "running query");
                let executor = self.executor()?;
                let rows = executor.run_query(sql).await?;
                Ok(Value::Array(rows))
            }
            "resolve_resource" => {
                let uri = required_str(arguments, "uri", name)?;
                tracing::info!(%uri, "resolving resource");
                let target = parse_resource_uri(uri)?;
                self.read_target(&target).await
            }
            other => Err(ServerError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }

    /// Materialize the payload behind a resource target. Shared by the
    /// `resolve_resource` tool and `resources/read`.
    async fn read_target(&self, target: &ResourceTarget) -> Result<Value, ServerError> {
        let executor = self.executor()?;
        match target {
            ResourceTarget::AllTables => {
                let resources =
                    catalog::list_tables(executor.pool(), &self.schema, &self.netloc).await?;
                Ok(json!({ "resources": resources }))
            }
            ResourceTarget::TableSchema(table) => {
                let columns = catalog::table_schema(executor.pool(), &self.schema, table).await?;
                Ok(json!({ "columns": columns }))
            }
        }
    }

    fn handle_list_resources(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListResourcesResponse {
            resources: vec![
                ResourceDescriptor {
                    uri: SCHEMA_RESOURCE_URI.to_string(),
                    mime_type: RESOURCE_MIME_TYPE.to_string(),
                    name: "Full schema for the active search path".to_string(),
                },
                ResourceDescriptor {
                    uri: TABLES_RESOURCE_URI.to_string(),
                    mime_type: RESOURCE_MIME_TYPE.to_string(),
                    name: "Tables in the active schema".to_string(),
                },
            ],
        };
        success_payload(id, &response)
    }

    async fn handle_read_resource(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ReadResourceParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        let payload = match params.uri.as_str() {
            SCHEMA_RESOURCE_URI => self.read_full_schema().await,
            TABLES_RESOURCE_URI => self.read_target(&ResourceTarget::AllTables).await,
            other => {
                return JsonRpcResponse::error(
                    id,
                    -32602,
                    format!(
                        "Unknown resource: {}; table schemas are read via the resolve_resource tool",
                        other
                    ),
                );
            }
        };

        let text = payload.and_then(|value| Ok(serde_json::to_string(&value)?));
        match text {
            Ok(text) => {
                let response = ReadResourceResponse {
                    contents: vec![ResourceContents {
                        uri: params.uri,
                        mime_type: RESOURCE_MIME_TYPE.to_string(),
                        text,
                    }],
                };
                success_payload(id, &response)
            }
            Err(err) => JsonRpcResponse::error(id, -32603, err.to_string()),
        }
    }

    async fn read_full_schema(&self) -> Result<Value, ServerError> {
        let executor = self.executor()?;
        let columns = catalog::list_schema(executor.pool(), &self.schema).await?;
        Ok(json!({
            "schema": self.schema,
            "columns": columns
        }))
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }

    fn executor(&self) -> Result<&QueryExecutor, ServerError> {
        self.executor
            .as_ref()
            .ok_or_else(|| ServerError::Connect("database not configured".to_string()))
    }
}

fn success_payload<T: Serialize>(id: Option<Value>, payload: &T) -> JsonRpcResponse {
    match serde_json::to_value(payload) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e)),
    }
}

fn required_str<'a>(arguments: &'a Value, key: &str, tool: &str) -> Result<&'a str, ServerError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ServerError::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("missing required string argument '{}'", key),
        })
}
