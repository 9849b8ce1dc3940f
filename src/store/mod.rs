//! Persistence collaborators: a small trait over sqlx pools.

mod postgres;
mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use crate::error::{AppError, ConfigError};
use crate::schema::ResolvedSchema;
use crate::sql::{Dialect, QueryBuf};
use async_trait::async_trait;
use std::sync::Arc;

/// One fetched row: column name -> JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Executes queries built by [`crate::sql`]. Shared by every generated handler.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    fn dialect(&self) -> Dialect;

    /// Run a write statement, returning the number of affected rows.
    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError>;

    /// Run a SELECT and decode each row using the schema's column kinds.
    async fn fetch_all(&self, q: &QueryBuf, schema: &ResolvedSchema) -> Result<Vec<Row>, AppError>;

    /// Cheap liveness check used by the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Open a pool for `url` and wrap it in the matching store.
/// `postgres://` / `postgresql://` and `sqlite:` URLs are supported.
pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<dyn Store>, ConfigError> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        tracing::info!(max_connections, "connected to postgres");
        return Ok(Arc::new(PgStore::new(pool)));
    }
    if url.starts_with("sqlite:") {
        let store = SqliteStore::connect(url, max_connections).await?;
        tracing::info!(url, "connected to sqlite");
        return Ok(Arc::new(store));
    }
    Err(ConfigError::UnsupportedUrl(url.to_string()))
}
