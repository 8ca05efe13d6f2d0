//! MCP protocol types.
//!
//! JSON-RPC 2.0 message envelopes plus the MCP payload shapes exchanged
//! between the server and any client: tool definitions, tool-call
//! parameters and results, and resource descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a request with the standard version tag.
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP tool definition.
///
/// `input_schema` is a JSON Schema object; the key order of its
/// `properties` map is the tool's declared parameter order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// List tools response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Call tool request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Call tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResponse {
    /// A successful result carrying one JSON payload.
    pub fn json(json: Value) -> Self {
        Self {
            content: vec![ToolContent::Json { json }],
            is_error: Some(false),
        }
    }

    /// A failed result carrying one error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: Some(true),
        }
    }
}

/// Tool response content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "json")]
    Json { json: Value },
}

/// A fetchable catalog document, addressable by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub name: String,
}

/// List resources response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesResponse {
    pub resources: Vec<ResourceDescriptor>,
}

/// Read resource request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// One resource payload, serialized as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// Read resource response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResourceResponse {
    pub contents: Vec<ResourceContents>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_response_omits_error_field() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"ok": true}));
        let encoded = serde_json::to_string(&response).unwrap();
        assert!(encoded.contains("\"result\""));
        assert!(!encoded.contains("\"error\""));
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let response = JsonRpcResponse::error(Some(json!(2)), -32601, "Method not found: nope");
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found: nope");
        assert!(response.result.is_none());
    }

    #[test]
    fn tool_content_is_tagged_by_type() {
        let text: ToolContent = serde_json::from_value(json!({"type": "text", "text": "hi"})).unwrap();
        assert!(matches!(text, ToolContent::Text { .. }));

        let encoded = serde_json::to_value(&ToolContent::Json { json: json!([1, 2]) }).unwrap();
        assert_eq!(encoded, json!({"type": "json", "json": [1, 2]}));
    }

    #[test]
    fn tool_definition_uses_camel_case_schema_key() {
        let tool = ToolDefinition {
            name: "query".to_string(),
            description: Some("Run a read-only SQL query".to_string()),
            input_schema: json!({"type": "object", "properties": {"sql": {"type": "string"}}}),
        };
        let encoded = serde_json::to_value(&tool).unwrap();
        assert!(encoded.get("inputSchema").is_some());
        assert!(encoded.get("input_schema").is_none());
    }

    #[test]
    fn resource_descriptor_round_trips_mime_type() {
        let descriptor = ResourceDescriptor {
            uri: "redshift://tables".to_string(),
            mime_type: "application/json".to_string(),
            name: "Tables in the active schema".to_string(),
        };
        let encoded = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(encoded["mimeType"], "application/json");
        let decoded: ResourceDescriptor = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, descriptor);
    }
}
