//! Shared configuration handed to every generated handler.

use crate::middleware::{Chain, Operation};
use crate::schema::NamingStrategy;
use crate::store::Store;
use std::sync::Arc;

/// Default request body limit for create and update: 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Store handle, naming strategy and one chain per operation class.
/// Built once at startup and shared read-only.
#[derive(Clone)]
pub struct CrudConfig {
    pub store: Arc<dyn Store>,
    pub naming: NamingStrategy,
    pub body_limit: usize,
    pub create: Chain,
    pub read: Chain,
    pub update: Chain,
    pub delete: Chain,
}

impl CrudConfig {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CrudConfig {
            store,
            naming: NamingStrategy::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            create: Chain::default(),
            read: Chain::default(),
            update: Chain::default(),
            delete: Chain::default(),
        }
    }

    pub fn with_create(mut self, chain: Chain) -> Self {
        self.create = chain;
        self
    }

    pub fn with_read(mut self, chain: Chain) -> Self {
        self.read = chain;
        self
    }

    pub fn with_update(mut self, chain: Chain) -> Self {
        self.update = chain;
        self
    }

    pub fn with_delete(mut self, chain: Chain) -> Self {
        self.delete = chain;
        self
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn chain(&self, operation: Operation) -> &Chain {
        match operation {
            Operation::Create => &self.create,
            Operation::Read => &self.read,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }
}
