//! Resolved schema: validated descriptor flattened for runtime use.

use crate::error::{AppError, SchemaError};
use crate::schema::{validate_schema, FieldKind, NamingStrategy, RecordSchema};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    /// Serialized (JSON) name.
    pub name: String,
    /// Database column, from the naming strategy.
    pub column: String,
    pub kind: FieldKind,
}

/// Table, columns and the queryable-property allow-list for one record type.
#[derive(Clone, Debug)]
pub struct ResolvedSchema {
    pub table: String,
    pub fields: Vec<ResolvedField>,
    pk_index: usize,
    /// Field name and column name -> index into `fields`.
    lookup: HashMap<String, usize>,
}

impl ResolvedSchema {
    pub fn resolve(schema: &RecordSchema, naming: &NamingStrategy) -> Result<Self, SchemaError> {
        validate_schema(schema, naming)?;

        let fields: Vec<ResolvedField> = schema
            .fields
            .iter()
            .map(|f| ResolvedField {
                name: f.name.clone(),
                column: naming.column_name(&f.name),
                kind: f.kind,
            })
            .collect();

        let mut lookup = HashMap::new();
        for (i, f) in fields.iter().enumerate() {
            lookup.insert(f.name.clone(), i);
            lookup.entry(f.column.clone()).or_insert(i);
        }
        let pk_index = lookup
            .get(schema.primary_key.as_str())
            .copied()
            .ok_or_else(|| SchemaError::MissingPrimaryKey(schema.primary_key.clone()))?;

        Ok(ResolvedSchema {
            table: naming.table_name(&schema.table),
            fields,
            pk_index,
            lookup,
        })
    }

    pub fn primary_key(&self) -> &ResolvedField {
        &self.fields[self.pk_index]
    }

    /// Look up a user-supplied property (path segment) by field or column name.
    /// Anything outside the declared fields is rejected.
    pub fn field(&self, property: &str) -> Result<&ResolvedField, AppError> {
        self.lookup
            .get(property)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| AppError::UnknownProperty(property.to_string()))
    }
}
