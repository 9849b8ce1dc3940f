//! Registration-time validation of record schemas and resource names.

use crate::error::SchemaError;
use crate::schema::{NamingStrategy, RecordSchema};
use regex::Regex;
use std::collections::HashSet;

const IDENTIFIER: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
const RESOURCE: &str = r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+)*$";

fn identifier_re() -> Regex {
    Regex::new(IDENTIFIER).expect("identifier pattern is valid")
}

/// Resource names become path segments; nested names like `v1/posts` are allowed.
pub fn validate_resource_name(name: &str) -> Result<(), SchemaError> {
    let name = name.trim_matches('/');
    if name.is_empty() {
        return Err(SchemaError::EmptyResourceName);
    }
    let re = Regex::new(RESOURCE).expect("resource pattern is valid");
    if !re.is_match(name) {
        return Err(SchemaError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

pub fn validate_schema(schema: &RecordSchema, naming: &NamingStrategy) -> Result<(), SchemaError> {
    if schema.table.is_empty() {
        return Err(SchemaError::EmptyTable);
    }
    let ident = identifier_re();
    let table = naming.table_name(&schema.table);
    if !ident.is_match(&table) {
        return Err(SchemaError::InvalidIdentifier(table));
    }

    let mut names = HashSet::new();
    let mut columns = HashSet::new();
    for f in &schema.fields {
        if !names.insert(f.name.as_str()) {
            return Err(SchemaError::DuplicateField(f.name.clone()));
        }
        let column = naming.column_name(&f.name);
        if !ident.is_match(&column) {
            return Err(SchemaError::InvalidIdentifier(f.name.clone()));
        }
        if !columns.insert(column.clone()) {
            return Err(SchemaError::DuplicateColumn(column));
        }
    }

    if !names.contains(schema.primary_key.as_str()) {
        return Err(SchemaError::MissingPrimaryKey(schema.primary_key.clone()));
    }
    Ok(())
}
