//! The six record handlers: create, update, delete, list, by-property, where.

use crate::error::AppError;
use crate::filter::{Operands, Operator, Predicate};
use crate::response::{message, results};
use crate::schema::Record;
use crate::service::CrudService;
use crate::sql::BindValue;
use crate::state::ResourceState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValueQuery {
    pub value: Option<String>,
}

fn parse_body<T: Record>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(AppError::InvalidBody)
}

pub async fn create<T: Record>(
    State(state): State<ResourceState<T>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let record: T = parse_body(&body)?;
    CrudService::create(state.store(), &state.schema, &record).await?;
    Ok(message("successfully created"))
}

pub async fn update<T: Record>(
    State(state): State<ResourceState<T>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let record: T = parse_body(&body)?;
    CrudService::save(state.store(), &state.schema, &record).await?;
    Ok(message("successfully updated"))
}

/// Succeeds whether or not a row matched.
pub async fn delete<T: Record>(
    State(state): State<ResourceState<T>>,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let raw = q.id.ok_or(AppError::MissingOperand("id"))?;
    let id = BindValue::parse(&raw, state.schema.primary_key())?;
    let removed = CrudService::delete(state.store(), &state.schema, id).await?;
    tracing::debug!(resource = %state.resource, id = %raw, removed, "delete");
    Ok(message("successfully deleted record"))
}

pub async fn list<T: Record>(State(state): State<ResourceState<T>>) -> Result<impl IntoResponse, AppError> {
    let rows: Vec<T> = CrudService::find_all(state.store(), &state.schema).await?;
    Ok(results(rows))
}

pub async fn by_property<T: Record>(
    State(state): State<ResourceState<T>>,
    Path(property): Path<String>,
    Query(q): Query<ValueQuery>,
) -> Result<impl IntoResponse, AppError> {
    let field = state.schema.field(&property)?;
    let raw = q.value.ok_or(AppError::MissingOperand("value"))?;
    let predicate = Predicate::equals(field, &raw)?;
    let rows: Vec<T> = CrudService::find_where(state.store(), &state.schema, &predicate).await?;
    Ok(results(rows))
}

/// Operator and property are both checked before the store is touched.
pub async fn where_compare<T: Record>(
    State(state): State<ResourceState<T>>,
    Path((property, operator)): Path<(String, String)>,
    Query(operands): Query<Operands>,
) -> Result<impl IntoResponse, AppError> {
    let op: Operator = operator.parse()?;
    let field = state.schema.field(&property)?;
    let predicate = Predicate::compare(field, op, &operands)?;
    let rows: Vec<T> = CrudService::find_where(state.store(), &state.schema, &predicate).await?;
    Ok(results(rows))
}
