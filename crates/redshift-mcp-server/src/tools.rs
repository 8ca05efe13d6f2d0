//! Tool registry and the built-in tool definitions.
//!
//! The registry stores tool definitions in insertion order so `tools/list`
//! is deterministic; clients build prompts from that order.

use std::collections::HashMap;

use serde_json::json;

use redshift_mcp_core::ToolDefinition;

/// Registry of available MCP tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the definition but
    /// keeps its original position.
    pub fn register(&mut self, tool: ToolDefinition) {
        if !self.tools.contains_key(&tool.name) {
            self.order.push(tool.name.clone());
        }
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tools in registration order.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .collect()
    }

    /// Get tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// The three tools every server instance exposes.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_table_schema".to_string(),
            description: Some("Get column names and types for one table in the active schema".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table_name": {
                        "type": "string",
                        "description": "Name of the table to describe"
                    }
                },
                "required": ["table_name"]
            }),
        },
        ToolDefinition {
            name: "query".to_string(),
            description: Some("Run read-only SQL against the active schema".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sql": {
                        "type": "string",
                        "description": "SQL to execute; the transaction is read-only"
                    }
                },
                "required": ["sql"]
            }),
        },
        ToolDefinition {
            name: "resolve_resource".to_string(),
            description: Some("Fetch the resource behind a redshift:// URI".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "uri": {
                        "type": "string",
                        "description": "Resource URI, e.g. redshift://tables or redshift://<host>/<table>/schema"
                    }
                },
                "required": ["uri"]
            }),
        },
    ]
}
