//! Per-resource state shared by the six generated handlers.

use crate::config::CrudConfig;
use crate::schema::ResolvedSchema;
use crate::store::Store;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct ResourceState<T> {
    pub config: Arc<CrudConfig>,
    pub schema: Arc<ResolvedSchema>,
    /// Resource name the routes are grouped under.
    pub resource: Arc<str>,
    _record: PhantomData<fn() -> T>,
}

impl<T> ResourceState<T> {
    pub fn new(config: Arc<CrudConfig>, schema: ResolvedSchema, resource: Arc<str>) -> Self {
        ResourceState {
            config,
            schema: Arc::new(schema),
            resource,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.config.store.as_ref()
    }
}

// Manual impl: T itself need not be Clone.
impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        ResourceState {
            config: self.config.clone(),
            schema: self.schema.clone(),
            resource: self.resource.clone(),
            _record: PhantomData,
        }
    }
}
