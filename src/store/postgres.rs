//! PostgreSQL store.

use crate::error::AppError;
use crate::schema::{FieldKind, ResolvedField, ResolvedSchema};
use crate::sql::{Dialect, QueryBuf};
use crate::store::{Row, Store};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow, Postgres};
use sqlx::Row as _;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn prepare(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query::<Postgres>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        query
    }
}

#[async_trait]
impl Store for PgStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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

fn row_to_map(row: &PgRow, schema: &ResolvedSchema) -> Row {
    schema
        .fields
        .iter()
        .map(|f| (f.column.clone(), cell_to_value(row, f)))
        .collect()
}

fn float(n: f64) -> Value {
    serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Decode by declared kind first, then fall back to text.
fn cell_to_value(row: &PgRow, field: &ResolvedField) -> Value {
    let name = field.column.as_str();
    match field.kind {
        FieldKind::Integer => {
            if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
        }
        FieldKind::Float => {
            if let Ok(v) = row.try_get::<Option<f64>, _>(name) {
                return v.map(float).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<f32>, _>(name) {
                return v.map(|n| float(n as f64)).unwrap_or(Value::Null);
            }
        }
        FieldKind::Boolean => {
            if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
                return v.map(Value::Bool).unwrap_or(Value::Null);
            }
        }
        FieldKind::Timestamp => {
            if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
                return v.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
                return v
                    .map(|d| Value::String(d.and_utc().to_rfc3339()))
                    .unwrap_or(Value::Null);
            }
            if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
                return v
                    .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                    .unwrap_or(Value::Null);
            }
        }
        FieldKind::Uuid => {
            if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(name) {
                return v.map(|u| Value::String(u.to_string())).unwrap_or(Value::Null);
            }
        }
        FieldKind::Json => {
            if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
                return v.unwrap_or(Value::Null);
            }
        }
        FieldKind::Text => {}
    }
    row.try_get::<Option<String>, _>(name)
        .ok()
        .flatten()
        .map(Value::String)
        .unwrap_or(Value::Null)
}
