//! Client configuration.

/// Model used when GEMINI_MODEL is unset.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// MCP endpoint used when MCP_SERVER_URL is unset.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/mcp";

/// Everything the chat client needs to start.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gemini API key. Required; there is no default.
    pub api_key: String,
    /// Model identifier passed to the Gemini API.
    pub model: String,
    /// MCP server endpoint URL.
    pub server_url: String,
}
