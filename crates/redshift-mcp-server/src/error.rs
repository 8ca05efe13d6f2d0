//! Error types for the server crate.

use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Could not establish or keep the database session.
    #[error("database connection failed: {0}")]
    Connect(String),

    /// Tool not found in the registry.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for a tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// SQL execution failed; the message is the database's own.
    #[error("{message}")]
    Query { message: String },

    /// A resource URI failed structural validation.
    #[error("invalid resource URI: {uri}")]
    InvalidUri { uri: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database driver error outside query execution.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
