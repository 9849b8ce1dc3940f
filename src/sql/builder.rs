//! Builds parameterized INSERT, upsert, SELECT and DELETE from a resolved schema.

use crate::filter::{Condition, Predicate};
use crate::schema::{FieldKind, ResolvedField, ResolvedSchema};
use crate::sql::BindValue;

/// Placeholder style of the target database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// `$1, $2, ...`
    Postgres,
    /// `?`
    Sqlite,
}

/// Quote identifier (safe: only from the resolved schema).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
    dialect: Dialect,
}

impl QueryBuf {
    fn new(dialect: Dialect) -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Register a parameter and return its placeholder.
    fn push_param(&mut self, v: BindValue) -> String {
        self.params.push(v);
        match self.dialect {
            Dialect::Postgres => format!("${}", self.params.len()),
            Dialect::Sqlite => "?".to_string(),
        }
    }
}

/// Field values for a write, in schema order.
pub type FieldValues<'a> = Vec<(&'a ResolvedField, BindValue)>;

fn select_column_list(schema: &ResolvedSchema) -> String {
    schema
        .fields
        .iter()
        .map(|f| quoted(&f.column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// INSERT of the given fields. No fields at all inserts a row of defaults.
pub fn insert(dialect: Dialect, schema: &ResolvedSchema, values: &FieldValues<'_>) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let table = quoted(&schema.table);
    if values.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES", table);
        return q;
    }
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (field, value) in values {
        cols.push(quoted(&field.column));
        placeholders.push(q.push_param(value.clone()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// Upsert by primary key: insert, or overwrite every non-key column of the existing row.
/// `values` must include the primary key.
pub fn upsert(dialect: Dialect, schema: &ResolvedSchema, values: &FieldValues<'_>) -> QueryBuf {
    let mut q = insert(dialect, schema, values);
    let pk = &schema.primary_key().column;
    let sets: Vec<String> = values
        .iter()
        .filter(|(f, _)| f.column != *pk)
        .map(|(f, _)| {
            let c = quoted(&f.column);
            format!("{} = excluded.{}", c, c)
        })
        .collect();
    if sets.is_empty() {
        q.sql.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", quoted(pk)));
    } else {
        q.sql.push_str(&format!(
            " ON CONFLICT ({}) DO UPDATE SET {}",
            quoted(pk),
            sets.join(", ")
        ));
    }
    q
}

/// DELETE by primary key.
pub fn delete_by_id(dialect: Dialect, schema: &ResolvedSchema, id: BindValue) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let ph = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(&schema.table),
        quoted(&schema.primary_key().column),
        ph
    );
    q
}

/// SELECT every column, optionally filtered by one predicate, ordered by primary key.
pub fn select(dialect: Dialect, schema: &ResolvedSchema, predicate: Option<&Predicate<'_>>) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let where_clause = match predicate {
        Some(p) => format!(" WHERE {}", condition_sql(&mut q, p)),
        None => String::new(),
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(schema),
        quoted(&schema.table),
        where_clause,
        quoted(&schema.primary_key().column)
    );
    q
}

fn condition_sql(q: &mut QueryBuf, p: &Predicate<'_>) -> String {
    let col = quoted(&p.field.column);
    match &p.condition {
        Condition::Compare(op, value) => {
            let ph = q.push_param(value.clone());
            format!("{} {} {}", col, op.token(), ph)
        }
        Condition::Between(from, to) => {
            let lo = q.push_param(from.clone());
            let hi = q.push_param(to.clone());
            format!("{} BETWEEN {} AND {}", col, lo, hi)
        }
        Condition::Like(pattern) => {
            let ph = q.push_param(BindValue::Text(pattern.clone()));
            if p.field.kind == FieldKind::Text {
                format!("{} LIKE {}", col, ph)
            } else {
                format!("CAST({} AS TEXT) LIKE {}", col, ph)
            }
        }
    }
}
