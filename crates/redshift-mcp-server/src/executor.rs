//! Read-only query execution.
//!
//! Owns the database pool and the active schema. Every query pins the
//! search path, runs inside `BEGIN TRANSACTION READ ONLY`, and a rollback
//! is issued on every exit path; the read-only transaction is the sole
//! guard against mutation by caller-supplied SQL.

use bigdecimal::{BigDecimal, ToPrimitive};
use serde_json::{Map, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, Executor, PgPool, Row};

use crate::config::ServerConfig;
use crate::error::ServerError;

/// Executes caller-supplied SQL against the active schema.
pub struct QueryExecutor {
    pool: PgPool,
    schema: String,
}

impl QueryExecutor {
    /// Connect to the database and pin the search path, verifying that the
    /// setting actually took. Some drivers apply a default schema that
    /// silently overrides the first `SET` form; one corrective retry with
    /// the alternate spelling covers that.
    pub async fn connect(config: &ServerConfig) -> Result<Self, ServerError> {
        // One connection, matching the one-in-flight-query model.
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&config.database_url)
            .await
            .map_err(|e| ServerError::Connect(e.to_string()))?;

        let executor = Self {
            pool,
            schema: config.schema.clone(),
        };
        executor.verify_schema().await?;
        Ok(executor)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn verify_schema(&self) -> Result<(), ServerError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::raw_sql(&search_path_to(&self.schema))
            .execute(&mut *conn)
            .await?;
        let current: String = sqlx::query_scalar("select current_schema()")
            .fetch_one(&mut *conn)
            .await?;
        tracing::info!(current_schema = %current, "connected");

        if current != self.schema {
            tracing::warn!(
                current_schema = %current,
                wanted = %self.schema,
                "search path did not take, retrying"
            );
            sqlx::raw_sql(&search_path_assign(&self.schema))
                .execute(&mut *conn)
                .await?;
            let current: String = sqlx::query_scalar("select current_schema()")
                .fetch_one(&mut *conn)
                .await?;
            tracing::info!(current_schema = %current, "search path updated");
        }

        Ok(())
    }

    /// Run `sql` verbatim inside a read-only transaction and collect every
    /// row as a JSON object. The rollback runs whether the statement
    /// succeeded or failed, so nothing it did can persist.
    pub async fn run_query(&self, sql: &str) -> Result<Vec<Value>, ServerError> {
        let mut conn = self.pool.acquire().await?;

        // Calls go through `Executor::{execute, fetch_all}` (which return
        // type-erased boxed futures) rather than the equivalent `RawSql`
        // async-fn wrappers; holding those opaque futures across awaits
        // trips rustc's "implementation of `Executor` is not general
        // enough" false positive (rust-lang/rust#102211) when the caller
        // is checked for `Send` under `tokio::spawn`.
        (&mut *conn)
            .execute(sqlx::raw_sql(&search_path_to(&self.schema)))
            .await?;
        (&mut *conn)
            .execute(sqlx::raw_sql("BEGIN TRANSACTION READ ONLY"))
            .await?;

        let outcome = (&mut *conn).fetch_all(sqlx::raw_sql(sql)).await;

        let rollback = (&mut *conn).execute(sqlx::raw_sql("ROLLBACK")).await;
        if let Err(error) = &rollback {
            tracing::warn!(%error, "rollback failed");
        }

        let rows = outcome.map_err(query_error)?;
        rollback?;

        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// `SET search_path TO <schema>`. The schema name comes from operator
/// configuration, not request input.
fn search_path_to(schema: &str) -> String {
    format!("SET search_path TO {schema}")
}

/// Alternate assignment spelling used by the corrective retry.
fn search_path_assign(schema: &str) -> String {
    format!("SET search_path = {schema}")
}

/// Surface SQL failures with the database's own message.
fn query_error(err: sqlx::Error) -> ServerError {
    match err {
        sqlx::Error::Database(db) => ServerError::Query {
            message: db.message().to_string(),
        },
        other => ServerError::Query {
            message: other.to_string(),
        },
    }
}

/// Convert one row to a JSON object, column order preserved.
fn row_to_json(row: &PgRow) -> Value {
    let mut object = Map::new();
    for column in row.columns() {
        object.insert(column.name().to_string(), column_value(row, column.name()));
    }
    Value::Object(object)
}

/// Decode a single column through a typed fallback chain. Types outside
/// the chain come back as null rather than failing the whole row.
fn column_value(row: &PgRow, name: &str) -> Value {
    if let Ok(value) = row.try_get::<Option<i64>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<i32>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<i16>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<f64>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<f32>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<BigDecimal>, _>(name) {
        value.map(decimal_value).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<bool>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<String>, _>(name) {
        value.map(Value::from).unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        value
            .map(|v| Value::String(v.to_rfc3339()))
            .unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        value
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        value
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    } else if let Ok(value) = row.try_get::<Option<Value>, _>(name) {
        value.unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

/// NUMERIC columns become JSON numbers when f64 can hold them, otherwise
/// their exact decimal string.
fn decimal_value(decimal: BigDecimal) -> Value {
    decimal
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(decimal.to_string()))
}
