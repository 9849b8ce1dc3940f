//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Raised while resolving a record schema at registration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("resource name must not be empty")]
    EmptyResourceName,
    #[error("table name must not be empty")]
    EmptyTable,
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("primary key '{0}' is not declared")]
    MissingPrimaryKey(String),
    #[error("duplicate field: {0}")]
    DuplicateField(String),
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
}

/// Startup configuration problems (environment, connection URL).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid operator: {0}")]
    InvalidOperator(String),
    #[error("missing query parameter '{0}'")]
    MissingOperand(&'static str),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("encode: {0}")]
    Encode(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    /// Error returned by a step to stop the request with a chosen status.
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Schema(_) | AppError::Encode(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidBody(_)
            | AppError::BadRequest(_)
            | AppError::UnknownProperty(_)
            | AppError::InvalidOperator(_)
            | AppError::MissingOperand(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Schema(_) => "schema_error",
            AppError::InvalidBody(_) => "invalid_body",
            AppError::BadRequest(_) => "bad_request",
            AppError::UnknownProperty(_) => "unknown_property",
            AppError::InvalidOperator(_) => "invalid_operator",
            AppError::MissingOperand(_) => "missing_operand",
            AppError::Rejected { .. } => "rejected",
            AppError::Encode(_) => "encode_error",
            AppError::Db(_) => "database_error",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Driver errors carry SQL and connection details; keep them in the log.
            AppError::Db(e) => {
                tracing::error!(error = %e, "database operation failed");
                "database error".to_string()
            }
            _ => self.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
