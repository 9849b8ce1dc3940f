//! End-to-end behavior of the six record routes over in-memory SQLite.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn create_then_list_includes_record_once() {
    let (app, _) = posts_app().await;
    create(&app, &post("first", 3)).await;

    let (status, body) = get(&app, "/posts/list").await;
    assert_eq!(status, StatusCode::OK);
    let posts = posts_in(&body);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].name, "first");
    assert_eq!(posts[0].content, "first content");
    assert_eq!(posts[0].views, 3);
    assert!(posts[0].id > 0, "database assigns the id");
}

#[tokio::test]
async fn create_acknowledges_with_message() {
    let (app, _) = posts_app().await;
    let (status, body) = post_json(&app, "/posts/new", &post("a", 0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "successfully created"}));
}

#[tokio::test]
async fn list_of_empty_table_is_empty() {
    let (app, _) = posts_app().await;
    let (status, body) = get(&app, "/posts/list").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": []}));
}

#[tokio::test]
async fn timestamps_survive_the_round_trip() {
    let (app, _) = posts_app().await;
    let mut p = post("dated", 0);
    p.published_at = Some("2024-03-01T10:00:00Z".parse().unwrap());
    create(&app, &p).await;

    let (_, body) = get(&app, "/posts/list").await;
    assert_eq!(posts_in(&body)[0].published_at, p.published_at);
}

#[tokio::test]
async fn malformed_body_is_client_error() {
    let (app, store) = posts_app().await;
    let req = Request::post("/posts/new")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": 5"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_body");

    let (status, body) = post_json(&app, "/posts/new", &json!({"name": "missing content"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_body");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn storage_failure_is_generic_server_error() {
    let (app, _) = posts_app().await;
    let mut p = post("dup", 0);
    p.id = 42;
    create(&app, &p).await;

    // Same explicit id again violates the primary key.
    let (status, body) = post_json(&app, "/posts/new", &p).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "database_error");
    assert_eq!(body["error"]["message"], "database error");
}

#[tokio::test]
async fn update_replaces_stored_fields() {
    let (app, _) = posts_app().await;
    create(&app, &post("before", 1)).await;
    let (_, body) = get(&app, "/posts/list").await;
    let mut stored = posts_in(&body).remove(0);

    stored.name = "after".into();
    stored.views = 99;
    let (status, body) = post_json(&app, "/posts/update", &stored).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "successfully updated"}));

    let (_, body) = get(&app, "/posts/list").await;
    let posts = posts_in(&body);
    assert_eq!(posts, vec![stored]);
}

#[tokio::test]
async fn update_with_unknown_id_inserts_and_without_id_creates() {
    let (app, _) = posts_app().await;
    let mut p = post("explicit", 0);
    p.id = 7;
    let (status, _) = post_json(&app, "/posts/update", &p).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_json(&app, "/posts/update", &post("fresh", 0)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/posts/list").await;
    let posts = posts_in(&body);
    assert_eq!(names(&posts), vec!["explicit", "fresh"]);
    assert_eq!(posts[0].id, 7);
}

#[tokio::test]
async fn delete_removes_record() {
    let (app, _) = posts_app().await;
    create(&app, &post("gone", 0)).await;
    create(&app, &post("kept", 0)).await;
    let (_, body) = get(&app, "/posts/list").await;
    let id = posts_in(&body)[0].id;

    let (status, body) = get(&app, &format!("/posts/delete?id={}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "successfully deleted record"}));

    let (_, body) = get(&app, "/posts/list").await;
    assert_eq!(names(&posts_in(&body)), vec!["kept"]);
}

#[tokio::test]
async fn delete_of_missing_id_still_succeeds() {
    let (app, _) = posts_app().await;
    let (status, body) = get(&app, "/posts/delete?id=12345").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "successfully deleted record");
}

#[tokio::test]
async fn delete_requires_a_well_formed_id() {
    let (app, store) = posts_app().await;
    let (status, body) = get(&app, "/posts/delete").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_operand");

    let (status, body) = get(&app, "/posts/delete?id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn by_property_is_exact_match() {
    let (app, _) = posts_app().await;
    create(&app, &post("alpha", 1)).await;
    create(&app, &post("beta", 1)).await;
    create(&app, &post("alphabet", 2)).await;

    let (status, body) = get(&app, "/posts/by/name?value=alpha").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&posts_in(&body)), vec!["alpha"]);

    let (_, body) = get(&app, "/posts/by/views?value=1").await;
    assert_eq!(names(&posts_in(&body)), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn by_property_accepts_field_or_column_name() {
    let (app, _) = posts_app().await;
    let mut p = post("dated", 0);
    p.published_at = Some("2024-03-01T10:00:00Z".parse().unwrap());
    create(&app, &p).await;
    create(&app, &post("undated", 0)).await;

    for property in ["publishedAt", "published_at"] {
        let uri = format!("/posts/by/{}?value=2024-03-01T10:00:00Z", property);
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(names(&posts_in(&body)), vec!["dated"], "{property}");
    }
}

#[tokio::test]
async fn by_property_rejects_undeclared_fields_without_storage_access() {
    let (app, store) = posts_app().await;
    for property in ["title", "name%3D%27x%27%20OR%201%3D1%20--", "Name"] {
        let (status, body) = get(&app, &format!("/posts/by/{}?value=x", property)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{property}");
        assert_eq!(body["error"]["code"], "unknown_property");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn by_property_validates_value_kind() {
    let (app, store) = posts_app().await;
    let (status, body) = get(&app, "/posts/by/views?value=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = get(&app, "/posts/by/views").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_operand");
    assert_eq!(store.calls(), 0);
}

async fn seeded_views(views: &[i64]) -> (axum::Router, std::sync::Arc<CountingStore>) {
    let (app, store) = posts_app().await;
    for v in views {
        create(&app, &post(&format!("v{}", v), *v)).await;
    }
    (app, store)
}

#[tokio::test]
async fn between_is_inclusive() {
    let (app, _) = seeded_views(&[0, 1, 5, 10, 11]).await;
    let (status, body) = get(&app, "/posts/where/views/between?from=1&to=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&posts_in(&body)), vec!["v1", "v5", "v10"]);
}

#[tokio::test]
async fn comparison_operators() {
    let (app, _) = seeded_views(&[1, 5, 10]).await;
    let cases = [
        ("%3D", "5", vec!["v5"]),
        ("%3E", "5", vec!["v10"]),
        ("%3C", "5", vec!["v1"]),
        ("%3E%3D", "5", vec!["v5", "v10"]),
        ("%3C%3D", "5", vec!["v1", "v5"]),
        ("%21%3D", "5", vec!["v1", "v10"]),
    ];
    for (op, value, expected) in cases {
        let (status, body) = get(&app, &format!("/posts/where/views/{}?value={}", op, value)).await;
        assert_eq!(status, StatusCode::OK, "{op}");
        assert_eq!(names(&posts_in(&body)), expected, "{op}");
    }
}

#[tokio::test]
async fn like_matches_wildcards() {
    let (app, _) = posts_app().await;
    create(&app, &post("rust book", 0)).await;
    create(&app, &post("go book", 0)).await;
    create(&app, &post("rustacean", 0)).await;

    let (status, body) = get(&app, "/posts/where/name/like?pattern=rust%25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&posts_in(&body)), vec!["rust book", "rustacean"]);
}

#[tokio::test]
async fn unknown_operator_is_rejected_without_storage_access() {
    let (app, store) = posts_app().await;
    for op in ["in", "%3D%3D", "BETWEEN", "%3B%20DROP%20TABLE%20posts"] {
        let (status, body) = get(&app, &format!("/posts/where/views/{}?value=1", op)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{op}");
        assert_eq!(body["error"]["code"], "invalid_operator");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn comparison_on_undeclared_field_is_rejected() {
    let (app, store) = posts_app().await;
    let (status, body) = get(&app, "/posts/where/secret/%3E?value=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "unknown_property");
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn comparison_reports_missing_operands() {
    let (app, store) = posts_app().await;
    let (status, body) = get(&app, "/posts/where/views/between?from=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "missing_operand");
    assert_eq!(body["error"]["message"], "missing query parameter 'to'");

    let (status, _) = get(&app, "/posts/where/name/like").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn each_request_issues_one_statement() {
    let (app, store) = posts_app().await;
    create(&app, &post("one", 1)).await;
    get(&app, "/posts/list").await;
    get(&app, "/posts/by/name?value=one").await;
    get(&app, "/posts/where/views/between?from=0&to=2").await;
    get(&app, "/posts/delete?id=1").await;
    assert_eq!(store.calls(), 5);
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stamped {
    #[serde(default)]
    id: i64,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl crud_routes::Record for Stamped {
    fn schema() -> crud_routes::RecordSchema {
        crud_routes::RecordSchema::new("stamped")
            .primary_key("id", crud_routes::FieldKind::Integer)
            .field("label", crud_routes::FieldKind::Text)
            .field("createdAt", crud_routes::FieldKind::Timestamp)
    }
}

#[tokio::test]
async fn database_default_timestamps_are_readable() {
    let store = sqlite_store().await;
    sqlx::query(
        "CREATE TABLE stamped (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(store.pool())
    .await
    .unwrap();
    let config = std::sync::Arc::new(crud_routes::CrudConfig::new(std::sync::Arc::new(store)));
    let app = crud_routes::register::<Stamped>(axum::Router::new(), &config, "stamped").unwrap();

    let (status, _) = post_json(&app, "/stamped/new", &json!({"label": "first"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/stamped/list").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rows: Vec<Stamped> = serde_json::from_value(body["result"].clone()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "first");
    assert!(rows[0].created_at.is_some());

    let (status, body) = get(&app, "/stamped/by/label?value=first").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["result"].as_array().map(Vec::len), Some(1));
}
