//! Per-operation step chains attached to the generated handlers.
//!
//! A chain runs either before the handler (guards: the first failing step ends
//! the request) or after it (observers: they see the final status and cannot
//! change the response).

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Operation class a handler belongs to. Each class has its own chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    BeforeHandler,
    /// Steps run once the handler has produced its response.
    #[default]
    AfterHandler,
}

/// What a step gets to see about the request.
#[derive(Clone, Debug)]
pub struct StepContext {
    pub operation: Operation,
    pub resource: Arc<str>,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Set only for steps placed after the handler.
    pub status: Option<StatusCode>,
}

#[async_trait]
pub trait Step: Send + Sync + 'static {
    async fn call(&self, cx: &StepContext) -> Result<(), AppError>;
}

#[async_trait]
impl<F> Step for F
where
    F: Fn(&StepContext) -> Result<(), AppError> + Send + Sync + 'static,
{
    async fn call(&self, cx: &StepContext) -> Result<(), AppError> {
        self(cx)
    }
}

/// Ordered steps plus where they run relative to the handler.
#[derive(Clone, Default)]
pub struct Chain {
    pub placement: Placement,
    pub steps: Vec<Arc<dyn Step>>,
}

impl Chain {
    pub fn before() -> Self {
        Chain {
            placement: Placement::BeforeHandler,
            steps: Vec::new(),
        }
    }

    pub fn after() -> Self {
        Chain {
            placement: Placement::AfterHandler,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: impl Step) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("placement", &self.placement)
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// State for [`run_chain`]: one per generated route.
#[derive(Clone)]
pub struct ChainState {
    pub chain: Chain,
    pub operation: Operation,
    pub resource: Arc<str>,
}

/// axum middleware executing a chain around the handler.
pub async fn run_chain(State(state): State<ChainState>, req: Request, next: Next) -> Response {
    if state.chain.is_empty() {
        return next.run(req).await;
    }
    let mut cx = StepContext {
        operation: state.operation,
        resource: state.resource.clone(),
        method: req.method().clone(),
        uri: req.uri().clone(),
        headers: req.headers().clone(),
        status: None,
    };
    match state.chain.placement {
        Placement::BeforeHandler => {
            for step in &state.chain.steps {
                if let Err(e) = step.call(&cx).await {
                    tracing::debug!(resource = %cx.resource, operation = ?cx.operation, error = %e, "step rejected request");
                    return e.into_response();
                }
            }
            next.run(req).await
        }
        Placement::AfterHandler => {
            let response = next.run(req).await;
            cx.status = Some(response.status());
            for step in &state.chain.steps {
                if let Err(e) = step.call(&cx).await {
                    tracing::warn!(resource = %cx.resource, operation = ?cx.operation, error = %e, "post-handler step failed");
                }
            }
            response
        }
    }
}
