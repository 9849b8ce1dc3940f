//! Example consumer: registers a `Post` record under `<API_PREFIX>/posts`.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Settings come from the environment or `.env` (`DATABASE_URL`, `BIND_ADDR`, ...).

use axum::http::StatusCode;
use axum::Router;
use chrono::{DateTime, Utc};
use crud_routes::{
    common_routes_with_ready, init_tracing, register, AppError, Chain, ConfigError, CrudConfig, FieldKind, PgStore,
    Record, RecordSchema, Settings, SqliteStore, StepContext, Store,
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    #[serde(default)]
    id: i64,
    name: String,
    content: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Record for Post {
    fn schema() -> RecordSchema {
        RecordSchema::new("posts")
            .primary_key("id", FieldKind::Integer)
            .field("name", FieldKind::Text)
            .field("content", FieldKind::Text)
            .field("createdAt", FieldKind::Timestamp)
    }
}

const POSTS_PG: &str = "CREATE TABLE IF NOT EXISTS posts (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TIMESTAMPTZ
)";

const POSTS_SQLITE: &str = "CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT
)";

/// Open the store for `settings` and make sure the demo table exists.
async fn open_store(settings: &Settings) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if settings.database_url.starts_with("sqlite:") {
        let store = SqliteStore::connect(&settings.database_url, settings.max_connections).await?;
        sqlx::query(POSTS_SQLITE).execute(store.pool()).await?;
        return Ok(Arc::new(store));
    }
    if !settings.database_url.starts_with("postgres") {
        return Err(ConfigError::UnsupportedUrl(settings.database_url.clone()).into());
    }
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    sqlx::query(POSTS_PG).execute(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("crud_routes=info,example_consumer=info");
    let settings = Settings::from_env()?;
    let store = open_store(&settings).await?;

    let require_json = |cx: &StepContext| -> Result<(), AppError> {
        let is_json = cx
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);
        if is_json {
            Ok(())
        } else {
            Err(AppError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json"))
        }
    };
    let log_read = |cx: &StepContext| -> Result<(), AppError> {
        tracing::info!(resource = %cx.resource, uri = %cx.uri, status = ?cx.status, "read");
        Ok(())
    };

    let config = Arc::new(
        CrudConfig::new(store.clone())
            .with_create(Chain::before().step(require_json))
            .with_update(Chain::before().step(require_json))
            .with_read(Chain::after().step(log_read)),
    );
    let api = register::<Post>(Router::new(), &config, "posts")?;

    let app = if settings.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&settings.api_prefix, api)
    };
    let app = app.merge(common_routes_with_ready(store));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
