//! Record routes: six handlers per resource name, each wrapped by its operation's chain.
//!
//! | Method | Path | Chain |
//! |---|---|---|
//! | POST | `/<name>/new` | create |
//! | POST | `/<name>/update` | update |
//! | GET | `/<name>/delete?id=` | delete |
//! | GET | `/<name>/list` | read |
//! | GET | `/<name>/by/:property?value=` | read |
//! | GET | `/<name>/where/:property/:operator` | read |

use crate::config::CrudConfig;
use crate::error::SchemaError;
use crate::handlers::{by_property, create, delete, list, update, where_compare};
use crate::middleware::{run_chain, ChainState, Operation};
use crate::schema::{validate_resource_name, Record, ResolvedSchema};
use crate::state::ResourceState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Build the six routes for `T` under `/<name>`. The schema is validated and
/// resolved here, so an invalid model fails at startup rather than per request.
pub fn record_routes<T: Record>(config: &Arc<CrudConfig>, name: &str) -> Result<Router, SchemaError> {
    validate_resource_name(name)?;
    let schema = ResolvedSchema::resolve(&T::schema(), &config.naming)?;
    let resource: Arc<str> = Arc::from(name.trim_matches('/'));
    let table = schema.table.clone();

    let limit = RequestBodyLimitLayer::new(config.body_limit);
    let base = format!("/{}", resource);

    let router = Router::new()
        .route(
            &format!("{}/new", base),
            with_chain(post(create::<T>), config, Operation::Create, &resource).layer(limit.clone()),
        )
        .route(
            &format!("{}/update", base),
            with_chain(post(update::<T>), config, Operation::Update, &resource).layer(limit),
        )
        .route(
            &format!("{}/delete", base),
            with_chain(get(delete::<T>), config, Operation::Delete, &resource),
        )
        .route(&format!("{}/list", base), with_chain(get(list::<T>), config, Operation::Read, &resource))
        .route(
            &format!("{}/by/:property", base),
            with_chain(get(by_property::<T>), config, Operation::Read, &resource),
        )
        .route(
            &format!("{}/where/:property/:operator", base),
            with_chain(get(where_compare::<T>), config, Operation::Read, &resource),
        )
        .with_state(ResourceState::<T>::new(config.clone(), schema, resource.clone()));

    tracing::info!(resource = %resource, table = %table, "registered record routes");
    Ok(router)
}

fn with_chain<S>(route: MethodRouter<S>, config: &CrudConfig, operation: Operation, resource: &Arc<str>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = ChainState {
        chain: config.chain(operation).clone(),
        operation,
        resource: resource.clone(),
    };
    route.layer(from_fn_with_state(state, run_chain))
}

/// Attach the routes for `T` to an existing router.
pub fn register<T: Record>(router: Router, config: &Arc<CrudConfig>, name: &str) -> Result<Router, SchemaError> {
    Ok(router.merge(record_routes::<T>(config, name)?))
}
