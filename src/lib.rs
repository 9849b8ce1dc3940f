//! crud-routes: register create/update/delete/list/by/where routes for a record type.
//!
//! A model implements [`Record`] with a [`RecordSchema`]; [`register`] resolves the
//! schema once and mounts six axum handlers that each issue one SQL statement
//! through a [`Store`].

pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{CrudConfig, Settings};
pub use error::{AppError, ConfigError, SchemaError};
pub use filter::{Operands, Operator, Predicate};
pub use middleware::{Chain, Operation, Placement, Step, StepContext};
pub use routes::{common_routes, common_routes_with_ready, record_routes, register};
pub use schema::{FieldKind, NamingStrategy, Record, RecordSchema, ResolvedSchema};
pub use service::CrudService;
pub use store::{connect, PgStore, SqliteStore, Store};
pub use telemetry::init_tracing;
