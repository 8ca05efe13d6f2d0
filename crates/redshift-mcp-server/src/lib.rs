//! # redshift-mcp-server
//!
//! MCP (Model Context Protocol) server exposing read-only tools over one
//! Redshift schema. Redshift speaks the Postgres wire protocol, so the
//! same server works against vanilla Postgres.
//!
//! The server offers three tools:
//!
//! - **get_table_schema**: column names and types for one table
//! - **query**: arbitrary SQL, executed inside a read-only transaction
//! - **resolve_resource**: fetch the catalog document behind a
//!   `redshift://` URI
//!
//! plus two fixed resources (`redshift://schema`, `redshift://tables`).
//!
//! ## Architecture
//!
//! ```text
//! AI Agent / chat client
//!       │
//!       │ JSON-RPC over HTTP POST /mcp
//!       ▼
//! ┌──────────────────────┐
//! │ redshift-mcp-server  │
//! │  1. Dispatch method  │
//! │  2. Validate args    │
//! │  3. Pin search_path  │
//! │  4. BEGIN READ ONLY  │
//! │  5. Execute + ROLLBACK│
//! │  6. Rows as JSON     │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!     Redshift / Postgres
//! ```
//!
//! Requests are serialized through a channel with a single consumer, so
//! at most one statement is in flight on the database connection.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod server;
pub mod tools;
pub mod uri;

// Re-export sqlx types for convenience
pub use sqlx::PgPool;

// Re-export main types
pub use config::ServerConfig;
pub use error::ServerError;
pub use executor::QueryExecutor;
pub use server::{McpServer, SCHEMA_RESOURCE_URI, TABLES_RESOURCE_URI};
pub use tools::{ToolRegistry, builtin_tools};
pub use uri::{ResourceTarget, parse_resource_uri};
