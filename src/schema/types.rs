//! Declarative record schema: what a model tells the generator about itself.

use serde::{de::DeserializeOwned, Serialize};

/// Storage kind of a field. Drives parameter binding, query-string parsing and row decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    Uuid,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Serialized (JSON) name of the field.
    pub name: String,
    pub kind: FieldKind,
}

/// Schema descriptor handed to the generator at registration time.
///
/// ```
/// use crud_routes::{FieldKind, RecordSchema};
///
/// let schema = RecordSchema::new("posts")
///     .primary_key("id", FieldKind::Integer)
///     .field("name", FieldKind::Text)
///     .field("createdAt", FieldKind::Timestamp);
/// assert_eq!(schema.fields.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub table: String,
    /// Name of the identifier field. Defaults to `id`.
    pub primary_key: String,
    pub fields: Vec<FieldDef>,
}

impl RecordSchema {
    pub fn new(table: impl Into<String>) -> Self {
        RecordSchema {
            table: table.into(),
            primary_key: "id".to_string(),
            fields: Vec::new(),
        }
    }

    /// Declare the identifier field. It is also added to the field list.
    pub fn primary_key(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        self.primary_key = name.clone();
        self.fields.push(FieldDef { name, kind });
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }
}

/// A model the generator can serve. Field names in [`RecordSchema`] must match
/// the names the type (de)serializes with.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn schema() -> RecordSchema;
}
