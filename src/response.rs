//! Response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ResultBody<T> {
    pub result: Vec<T>,
}

/// 200 with `{"message": ...}`. Used by the write operations.
pub fn message(message: &'static str) -> (StatusCode, Json<MessageBody>) {
    (StatusCode::OK, Json(MessageBody { message }))
}

/// 200 with `{"result": [...]}`.
pub fn results<T: Serialize>(result: Vec<T>) -> (StatusCode, Json<ResultBody<T>>) {
    (StatusCode::OK, Json(ResultBody { result }))
}
