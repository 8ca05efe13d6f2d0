//! Schema catalog introspection.
//!
//! Read-only queries over `information_schema`, restricted to the active
//! schema. Unknown table names yield empty results rather than errors;
//! `information_schema` naturally returns nothing for them, so no
//! existence check is performed.

use redshift_mcp_core::protocol::ResourceDescriptor;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::ServerError;

/// Mime type every catalog resource is served as.
pub const RESOURCE_MIME_TYPE: &str = "application/json";

/// One column of one table, in `information_schema` terms.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaColumn {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub ordinal_position: i32,
}

/// A column as reported for a single table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    pub column_name: String,
    pub data_type: String,
}

/// Every column of every table in the schema, ordered by table name then
/// ordinal position.
pub async fn list_schema(pool: &PgPool, schema: &str) -> Result<Vec<SchemaColumn>, ServerError> {
    let rows = sqlx::query(
        r#"
        select table_name, column_name, data_type, ordinal_position
        from information_schema.columns
        where table_schema = $1
        order by table_name, ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    rows.iter().map(schema_column).collect()
}

/// Names of every table in the schema, alphabetically.
pub async fn list_table_names(pool: &PgPool, schema: &str) -> Result<Vec<String>, ServerError> {
    let rows = sqlx::query(
        r#"
        select table_name
        from information_schema.tables
        where table_schema = $1
        order by table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| row.try_get("table_name").map_err(ServerError::from))
        .collect()
}

/// One resource descriptor per table in the schema.
pub async fn list_tables(
    pool: &PgPool,
    schema: &str,
    netloc: &str,
) -> Result<Vec<ResourceDescriptor>, ServerError> {
    let names = list_table_names(pool, schema).await?;
    Ok(table_resources(netloc, &names))
}

/// The columns of one table, in ordinal order. Empty for unknown tables.
pub async fn table_schema(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<TableColumn>, ServerError> {
    let rows = sqlx::query(
        r#"
        select column_name, data_type
        from information_schema.columns
        where table_name = $1 and table_schema = $2
        order by ordinal_position
        "#,
    )
    .bind(table)
    .bind(schema)
    .fetch_all(pool)
    .await?;

    rows.iter().map(table_column).collect()
}

/// Build the resource descriptors advertised for a set of tables.
pub fn table_resources(netloc: &str, tables: &[String]) -> Vec<ResourceDescriptor> {
    tables
        .iter()
        .map(|table| ResourceDescriptor {
            uri: format!("redshift://{netloc}/{table}/schema"),
            mime_type: RESOURCE_MIME_TYPE.to_string(),
            name: format!("{table} table schema"),
        })
        .collect()
}

fn schema_column(row: &PgRow) -> Result<SchemaColumn, ServerError> {
    Ok(SchemaColumn {
        table_name: row.try_get("table_name")?,
        column_name: row.try_get("column_name")?,
        data_type: row.try_get("data_type")?,
        ordinal_position: row.try_get("ordinal_position")?,
    })
}

fn table_column(row: &PgRow) -> Result<TableColumn, ServerError> {
    Ok(TableColumn {
        column_name: row.try_get("column_name")?,
        data_type: row.try_get("data_type")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_resources_build_schema_uris() {
        let tables = vec!["orders".to_string(), "patients".to_string()];
        let resources = table_resources("dbhost:5439", &tables);

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].uri, "redshift://dbhost:5439/orders/schema");
        assert_eq!(resources[0].mime_type, RESOURCE_MIME_TYPE);
        assert_eq!(resources[0].name, "orders table schema");
        assert_eq!(resources[1].uri, "redshift://dbhost:5439/patients/schema");
    }

    #[test]
    fn table_resources_empty_for_no_tables() {
        assert!(table_resources("dbhost", &[]).is_empty());
    }

    #[test]
    fn schema_column_serializes_with_wire_names() {
        let column = SchemaColumn {
            table_name: "orders".to_string(),
            column_name: "order_id".to_string(),
            data_type: "integer".to_string(),
            ordinal_position: 1,
        };
        let encoded = serde_json::to_value(&column).unwrap();
        assert_eq!(encoded["table_name"], "orders");
        assert_eq!(encoded["ordinal_position"], 1);
    }
}
