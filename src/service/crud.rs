//! Generic CRUD execution: records in, records out, one statement each.

use crate::error::AppError;
use crate::filter::Predicate;
use crate::schema::{Record, ResolvedSchema};
use crate::sql::{delete_by_id, insert, select, upsert, BindValue, FieldValues};
use crate::store::{Row, Store};
use serde::Serialize;
use serde_json::Value;

pub struct CrudService;

impl CrudService {
    /// Insert one record. A zero-valued primary key is left to the database.
    pub async fn create<T: Record>(store: &dyn Store, schema: &ResolvedSchema, record: &T) -> Result<(), AppError> {
        let values = Self::without_zero_key(schema, field_values(schema, record)?);
        let q = insert(store.dialect(), schema, &values);
        store.execute(&q).await?;
        Ok(())
    }

    /// Upsert by primary key. Without an assigned key this is a plain insert.
    pub async fn save<T: Record>(store: &dyn Store, schema: &ResolvedSchema, record: &T) -> Result<(), AppError> {
        let values = field_values(schema, record)?;
        let pk = &schema.primary_key().column;
        let has_key = values.iter().any(|(f, v)| f.column == *pk && !v.is_zero());
        let q = if has_key {
            upsert(store.dialect(), schema, &values)
        } else {
            insert(store.dialect(), schema, &Self::without_zero_key(schema, values))
        };
        store.execute(&q).await?;
        Ok(())
    }

    /// Delete by primary key. Returns the number of rows removed (0 when absent).
    pub async fn delete(store: &dyn Store, schema: &ResolvedSchema, id: BindValue) -> Result<u64, AppError> {
        let q = delete_by_id(store.dialect(), schema, id);
        store.execute(&q).await
    }

    pub async fn find_all<T: Record>(store: &dyn Store, schema: &ResolvedSchema) -> Result<Vec<T>, AppError> {
        let q = select(store.dialect(), schema, None);
        let rows = store.fetch_all(&q, schema).await?;
        rows_to_records(schema, rows)
    }

    pub async fn find_where<T: Record>(
        store: &dyn Store,
        schema: &ResolvedSchema,
        predicate: &Predicate<'_>,
    ) -> Result<Vec<T>, AppError> {
        let q = select(store.dialect(), schema, Some(predicate));
        let rows = store.fetch_all(&q, schema).await?;
        rows_to_records(schema, rows)
    }

    fn without_zero_key<'s>(schema: &ResolvedSchema, values: FieldValues<'s>) -> FieldValues<'s> {
        let pk = &schema.primary_key().column;
        values
            .into_iter()
            .filter(|(f, v)| f.column != *pk || !v.is_zero())
            .collect()
    }
}

/// Serialize a record and pick out the declared fields it carries.
/// Fields the record does not serialize are left out so column defaults apply.
fn field_values<'s, T: Serialize>(schema: &'s ResolvedSchema, record: &T) -> Result<FieldValues<'s>, AppError> {
    let value = serde_json::to_value(record).map_err(|e| AppError::Encode(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(AppError::Encode("record must serialize to a JSON object".into()));
    };
    let mut out = Vec::with_capacity(schema.fields.len());
    for f in &schema.fields {
        if let Some(v) = obj.get(&f.name) {
            out.push((f, BindValue::from_json(v, f)?));
        }
    }
    Ok(out)
}

/// Rows are keyed by column; records by field name.
fn rows_to_records<T: Record>(schema: &ResolvedSchema, rows: Vec<Row>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|mut row| {
            let obj: serde_json::Map<String, Value> = schema
                .fields
                .iter()
                .map(|f| (f.name.clone(), row.remove(&f.column).unwrap_or(Value::Null)))
                .collect();
            serde_json::from_value(Value::Object(obj)).map_err(|e| AppError::Encode(e.to_string()))
        })
        .collect()
}
