//! Shared fixtures: a `Post` record, an in-memory SQLite store and request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use crud_routes::schema::ResolvedSchema;
use crud_routes::sql::{Dialect, QueryBuf};
use crud_routes::store::Row;
use crud_routes::{AppError, CrudConfig, FieldKind, Record, RecordSchema, SqliteStore, Store};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Record for Post {
    fn schema() -> RecordSchema {
        RecordSchema::new("posts")
            .primary_key("id", FieldKind::Integer)
            .field("name", FieldKind::Text)
            .field("content", FieldKind::Text)
            .field("views", FieldKind::Integer)
            .field("publishedAt", FieldKind::Timestamp)
    }
}

const POSTS_DDL: &str = r#"
    CREATE TABLE posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        content TEXT NOT NULL,
        views INTEGER NOT NULL DEFAULT 0,
        published_at TEXT
    )
"#;

/// Fresh in-memory database with the `posts` table.
pub async fn sqlite_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    sqlx::query(POSTS_DDL).execute(store.pool()).await.unwrap();
    store
}

/// Store wrapper counting every call that reaches the database.
pub struct CountingStore {
    inner: Arc<dyn Store>,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn Store>) -> Self {
        CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for CountingStore {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(q).await
    }

    async fn fetch_all(&self, q: &QueryBuf, schema: &ResolvedSchema) -> Result<Vec<Row>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_all(q, schema).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

/// Router with `Post` registered under `/posts`, plus a handle on the call counter.
pub async fn posts_app_with(configure: impl FnOnce(CrudConfig) -> CrudConfig) -> (Router, Arc<CountingStore>) {
    let counting = Arc::new(CountingStore::new(Arc::new(sqlite_store().await)));
    let config = Arc::new(configure(CrudConfig::new(counting.clone())));
    let app = crud_routes::register::<Post>(Router::new(), &config, "posts").unwrap();
    (app, counting)
}

pub async fn posts_app() -> (Router, Arc<CountingStore>) {
    posts_app_with(|c| c).await
}

pub fn post(name: &str, views: i64) -> Post {
    Post {
        id: 0,
        name: name.to_string(),
        content: format!("{} content", name),
        views,
        published_at: None,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: &impl Serialize) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, req).await
}

pub async fn create(app: &Router, p: &Post) {
    let (status, body) = post_json(app, "/posts/new", p).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

/// `result` array of a read response, decoded.
pub fn posts_in(body: &Value) -> Vec<Post> {
    serde_json::from_value(body["result"].clone()).unwrap()
}

pub fn names(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.name.as_str()).collect()
}
