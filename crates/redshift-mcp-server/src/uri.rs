//! `redshift://` resource URI parsing.

use url::Url;

use crate::error::ServerError;

/// What a resource URI points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTarget {
    /// The table listing (`redshift://tables`).
    AllTables,
    /// One table's schema (`redshift://<netloc>/<table>/schema`).
    TableSchema(String),
}

/// Parse a resource URI.
///
/// An authority of exactly `tables` selects the table listing no matter
/// what path follows. Any other authority is accepted without validation
/// against the configured database host; the path must then split into
/// exactly `<table>/schema`.
pub fn parse_resource_uri(uri: &str) -> Result<ResourceTarget, ServerError> {
    let parsed = Url::parse(uri).map_err(|_| ServerError::InvalidUri {
        uri: uri.to_string(),
    })?;

    if parsed.host_str() == Some("tables") {
        return Ok(ResourceTarget::AllTables);
    }

    let segments: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();
    if segments.len() != 2 || segments[1] != "schema" {
        return Err(ServerError::InvalidUri {
            uri: uri.to_string(),
        });
    }

    Ok(ResourceTarget::TableSchema(segments[0].to_string()))
}
