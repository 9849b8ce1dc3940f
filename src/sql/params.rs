//! Values bound to SQL parameters, typed by the field they target.

use crate::error::AppError;
use crate::schema::{FieldKind, ResolvedField};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
use sqlx::{Database, Type};

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// A parameter value. Nulls remember the kind of their column so PostgreSQL
/// gets a correctly typed parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null(FieldKind),
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
    Json(Value),
}

impl BindValue {
    /// Convert a serialized record value. A mismatch means the record's serde
    /// shape disagrees with its declared schema.
    pub fn from_json(v: &Value, field: &ResolvedField) -> Result<Self, AppError> {
        let mismatch = || {
            AppError::Encode(format!(
                "field '{}' does not hold a {:?} value: {}",
                field.name, field.kind, v
            ))
        };
        if v.is_null() {
            return Ok(BindValue::Null(field.kind));
        }
        Ok(match field.kind {
            FieldKind::Integer => BindValue::I64(v.as_i64().ok_or_else(mismatch)?),
            FieldKind::Float => BindValue::F64(v.as_f64().ok_or_else(mismatch)?),
            FieldKind::Boolean => BindValue::Bool(v.as_bool().ok_or_else(mismatch)?),
            FieldKind::Text => BindValue::Text(v.as_str().ok_or_else(mismatch)?.to_string()),
            FieldKind::Timestamp => {
                let s = v.as_str().ok_or_else(mismatch)?;
                BindValue::Timestamp(parse_timestamp(s).ok_or_else(mismatch)?)
            }
            FieldKind::Uuid => {
                let s = v.as_str().ok_or_else(mismatch)?;
                BindValue::Uuid(uuid::Uuid::parse_str(s).map_err(|_| mismatch())?)
            }
            FieldKind::Json => BindValue::Json(v.clone()),
        })
    }

    /// Parse a query-string operand for `field`.
    pub fn parse(s: &str, field: &ResolvedField) -> Result<Self, AppError> {
        let invalid = |what: &str| {
            AppError::BadRequest(format!("'{}' is not a valid {} for {}", s, what, field.name))
        };
        Ok(match field.kind {
            FieldKind::Integer => BindValue::I64(s.trim().parse().map_err(|_| invalid("integer"))?),
            FieldKind::Float => BindValue::F64(s.trim().parse().map_err(|_| invalid("number"))?),
            FieldKind::Boolean => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => BindValue::Bool(true),
                "false" | "0" => BindValue::Bool(false),
                _ => return Err(invalid("boolean")),
            },
            FieldKind::Text => BindValue::Text(s.to_string()),
            FieldKind::Timestamp => BindValue::Timestamp(parse_timestamp(s).ok_or_else(|| invalid("timestamp"))?),
            FieldKind::Uuid => BindValue::Uuid(uuid::Uuid::parse_str(s).map_err(|_| invalid("uuid"))?),
            FieldKind::Json => BindValue::Json(serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))),
        })
    }

    /// Zero values in an identifier mean "not assigned yet".
    pub fn is_zero(&self) -> bool {
        match self {
            BindValue::Null(_) => true,
            BindValue::I64(n) => *n == 0,
            BindValue::Text(s) => s.is_empty(),
            BindValue::Uuid(u) => u.is_nil(),
            _ => false,
        }
    }
}

/// RFC 3339, then naive date-time or date interpreted as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

fn pg_type_of(kind: FieldKind) -> PgTypeInfo {
    match kind {
        FieldKind::Integer => <i64 as Type<Postgres>>::type_info(),
        FieldKind::Float => <f64 as Type<Postgres>>::type_info(),
        FieldKind::Text => <String as Type<Postgres>>::type_info(),
        FieldKind::Boolean => <bool as Type<Postgres>>::type_info(),
        FieldKind::Timestamp => <DateTime<Utc> as Type<Postgres>>::type_info(),
        FieldKind::Uuid => <uuid::Uuid as Type<Postgres>>::type_info(),
        FieldKind::Json => <Value as Type<Postgres>>::type_info(),
    }
}

impl BindValue {
    fn kind(&self) -> FieldKind {
        match self {
            BindValue::Null(k) => *k,
            BindValue::Bool(_) => FieldKind::Boolean,
            BindValue::I64(_) => FieldKind::Integer,
            BindValue::F64(_) => FieldKind::Float,
            BindValue::Text(_) => FieldKind::Text,
            BindValue::Timestamp(_) => FieldKind::Timestamp,
            BindValue::Uuid(_) => FieldKind::Uuid,
            BindValue::Json(_) => FieldKind::Json,
        }
    }
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(&self, buf: &mut <Postgres as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        match self {
            BindValue::Null(_) => <Option<i64> as Encode<Postgres>>::encode_by_ref(&None, buf),
            BindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            BindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
            BindValue::Timestamp(d) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(d, buf),
            BindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf),
            BindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(pg_type_of(self.kind()))
    }
}

impl Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}

impl<'q> Encode<'q, Sqlite> for BindValue {
    fn encode_by_ref(&self, buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>) -> Result<IsNull, BoxDynError> {
        match self {
            BindValue::Null(_) => <Option<i64> as Encode<Sqlite>>::encode_by_ref(&None, buf),
            BindValue::Bool(b) => <bool as Encode<Sqlite>>::encode_by_ref(b, buf),
            BindValue::I64(n) => <i64 as Encode<Sqlite>>::encode_by_ref(n, buf),
            BindValue::F64(n) => <f64 as Encode<Sqlite>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <String as Encode<Sqlite>>::encode_by_ref(s, buf),
            BindValue::Timestamp(d) => <String as Encode<Sqlite>>::encode(d.to_rfc3339(), buf),
            BindValue::Uuid(u) => <String as Encode<Sqlite>>::encode(u.to_string(), buf),
            BindValue::Json(v) => <String as Encode<Sqlite>>::encode(v.to_string(), buf),
        }
    }
}

impl Type<Sqlite> for BindValue {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}
