//! Error types for the chat client.

use thiserror::Error;

/// Errors that can occur in the chat client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required environment variable is absent.
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// No live session; connect or reconnect first.
    #[error("not connected to a server")]
    NotConnected,

    /// The round trip to the MCP server failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a JSON-RPC error envelope.
    #[error("server error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// The model call failed or returned an unusable response.
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The model reply was not valid command JSON. The raw text rides
    /// along for diagnostics; the display stays one line.
    #[error("invalid JSON in model response")]
    MalformedReply { raw: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
