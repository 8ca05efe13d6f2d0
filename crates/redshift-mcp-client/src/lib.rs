//! # redshift-mcp-client
//!
//! Interactive Gemini-backed chat client for the Redshift MCP server.
//!
//! One turn flows: user utterance -> [`prompt::build`] grounds the live
//! tool and resource catalog into an instruction prompt -> the
//! [`llm::CompletionOracle`] completes it -> [`command::parse`] extracts
//! a `{tool, args}` or `{answer}` reply -> [`normalize::normalize`]
//! repairs argument-name drift -> [`chat::ChatEngine`] dispatches the
//! tool through the [`session::Session`] and renders the result.

pub mod chat;
pub mod command;
pub mod config;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod prompt;
pub mod repl;
pub mod session;

pub use chat::ChatEngine;
pub use command::Command;
pub use config::{ClientConfig, DEFAULT_MODEL, DEFAULT_SERVER_URL};
pub use error::ClientError;
pub use llm::{CompletionOracle, GeminiClient};
pub use session::{HttpTransport, McpTransport, Session, SessionState};
