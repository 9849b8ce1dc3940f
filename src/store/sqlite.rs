//! SQLite store. In-memory databases are pinned to a single connection.

use crate::error::{AppError, ConfigError};
use crate::schema::{FieldKind, ResolvedField, ResolvedSchema};
use crate::sql::{parse_timestamp, Dialect, QueryBuf};
use crate::store::{Row, Store};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row as _;
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    /// Connect, creating the database file if missing. `:memory:` URLs get one
    /// connection since every connection would otherwise see its own database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ConfigError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") || url.contains("mode=memory") {
            1
        } else {
            max_connections
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(SqliteStore { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn prepare(q: &QueryBuf) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query::<Sqlite>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        let done = Self::prepare(q).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn fetch_all(&self, q: &QueryBuf, schema: &ResolvedSchema) -> Result<Vec<Row>, AppError> {
        let rows = Self::prepare(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(|r| row_to_map(r, schema)).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_map(row: &SqliteRow, schema: &ResolvedSchema) -> Row {
    schema
        .fields
        .iter()
        .map(|f| (f.column.clone(), cell_to_value(row, f)))
        .collect()
}

/// SQLite types are per value; decode by declared kind, then fall back to text.
/// Timestamps come back as RFC 3339 whatever text form they were stored in.
fn cell_to_value(row: &SqliteRow, field: &ResolvedField) -> Value {
    let name = field.column.as_str();
    match field.kind {
        FieldKind::Integer => {
            if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
        }
        FieldKind::Float => {
            if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
                return v
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
        }
        FieldKind::Boolean => {
            if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
                return v.map(Value::Bool).unwrap_or(Value::Null);
            }
        }
        FieldKind::Json => {
            if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
                return serde_json::from_str(&s).unwrap_or(Value::String(s));
            }
        }
        FieldKind::Timestamp => {
            if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
                return match parse_timestamp(&s) {
                    Some(d) => Value::String(d.to_rfc3339()),
                    None => Value::String(s),
                };
            }
        }
        FieldKind::Text | FieldKind::Uuid => {}
    }
    row.try_get::<Option<String>, _>(name)
        .ok()
        .flatten()
        .map(Value::String)
        .unwrap_or(Value::Null)
}
