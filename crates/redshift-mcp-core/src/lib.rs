//! Wire types shared by the Redshift MCP server and chat client.

pub mod protocol;

pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListResourcesResponse, ListToolsResponse, ReadResourceParams, ReadResourceResponse,
    ResourceContents, ResourceDescriptor, ToolContent, ToolDefinition,
};
