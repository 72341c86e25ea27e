//! Value ↔ PostgreSQL conversions and placeholder numbering.

use crate::column::SqlType;
use crate::error::OrmResult;
use crate::value::{FromValue, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::Row as PgRow;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type};

pub(crate) type PgParam = Box<dyn ToSql + Sync + Send>;

/// A NULL that Postgres accepts for any parameter type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Null;

impl ToSql for Null {
    fn to_sql(&self, _ty: &Type, _out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// Any column type without a dedicated mapping.
///
/// Types whose binary form is their text (text-like types, enums, xml) read as
/// [`Value::Text`]; everything else is kept as [`Value::Bytes`].
struct Raw(Value);

impl<'a> FromSql<'a> for Raw {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        let textual = <&str as FromSql>::accepts(ty)
            || matches!(ty.kind(), Kind::Enum(_))
            || *ty == Type::XML;
        let value = match std::str::from_utf8(raw) {
            Ok(text) if textual => Value::Text(text.to_owned()),
            _ => Value::Bytes(raw.to_vec()),
        };
        Ok(Raw(value))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn boxed<T: ToSql + Sync + Send + 'static>(value: T) -> PgParam {
    Box::new(value)
}

fn parse_text<T>(value: &Value, what: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, String> {
    let text = String::from_value(value)?;
    parse(&text).ok_or_else(|| format!("'{text}' is not a valid {what}"))
}

fn to_decimal(value: &Value) -> Result<Decimal, String> {
    match value {
        Value::Int(v) => Ok(Decimal::from(*v)),
        Value::Double(v) => {
            Decimal::try_from(*v).map_err(|e| format!("{v} is not a valid numeric: {e}"))
        }
        Value::Text(_) => parse_text(value, "numeric", |s| s.parse::<Decimal>().ok()),
        other => Err(format!("expected numeric, got {}", other.kind())),
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Convert a non-null value into a parameter of the prepared type `ty`.
pub(crate) fn to_param(value: &Value, ty: &Type) -> Result<PgParam, String> {
    let param = match *ty {
        Type::INT2 => boxed(i16::from_value(value)?),
        Type::INT4 => boxed(i32::from_value(value)?),
        Type::INT8 => boxed(i64::from_value(value)?),
        Type::FLOAT4 => boxed(f32::from_value(value)?),
        Type::FLOAT8 => boxed(f64::from_value(value)?),
        Type::BOOL => boxed(bool::from_value(value)?),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            boxed(String::from_value(value)?)
        }
        Type::JSON | Type::JSONB => boxed(serde_json::Value::from_value(value)?),
        Type::NUMERIC => boxed(to_decimal(value)?),
        Type::BYTEA => match value {
            Value::Bytes(bytes) => boxed(bytes.clone()),
            other => return Err(format!("expected bytes, got {}", other.kind())),
        },
        Type::UUID => boxed(parse_text(value, "uuid", |s| uuid::Uuid::parse_str(s).ok())?),
        Type::TIMESTAMPTZ => boxed(parse_text(value, "timestamptz", |s| {
            DateTime::parse_from_rfc3339(s).ok()
        })?),
        Type::TIMESTAMP => boxed(parse_text(value, "timestamp", parse_timestamp)?),
        Type::DATE => boxed(parse_text(value, "date", |s| s.parse::<NaiveDate>().ok())?),
        Type::INT2_ARRAY => boxed(Vec::<Option<i16>>::from_value(value)?),
        Type::INT4_ARRAY => boxed(Vec::<Option<i32>>::from_value(value)?),
        Type::INT8_ARRAY => boxed(Vec::<Option<i64>>::from_value(value)?),
        Type::FLOAT4_ARRAY => boxed(Vec::<Option<f32>>::from_value(value)?),
        Type::FLOAT8_ARRAY => boxed(Vec::<Option<f64>>::from_value(value)?),
        Type::BOOL_ARRAY => boxed(Vec::<Option<bool>>::from_value(value)?),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => boxed(Vec::<Option<String>>::from_value(value)?),
        _ => return Err(format!("unsupported parameter type {ty}")),
    };
    Ok(param)
}

/// Column type as seen by the builders and mappers.
pub(crate) fn sql_type_of(ty: &Type) -> SqlType {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => SqlType::Integer,
        Type::FLOAT4 | Type::FLOAT8 => SqlType::Double,
        Type::BOOL => SqlType::Boolean,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => SqlType::Varchar,
        _ if matches!(ty.kind(), tokio_postgres::types::Kind::Array(_)) => SqlType::Array,
        _ => SqlType::Other,
    }
}

fn opt<T>(value: Option<T>, wrap: impl FnOnce(T) -> Value) -> Value {
    value.map_or(Value::Null, wrap)
}

fn array<T>(items: Option<Vec<Option<T>>>, wrap: impl Fn(T) -> Value) -> Value {
    opt(items, |items| {
        Value::Array(items.into_iter().map(|item| opt(item, &wrap)).collect())
    })
}

/// Read column `idx` of `row`, whose declared type is `ty`.
pub(crate) fn read_value(row: &PgRow, idx: usize, ty: &Type) -> OrmResult<Value> {
    let value = match *ty {
        Type::INT2 => opt(row.try_get::<_, Option<i16>>(idx)?, |v| Value::Int(v.into())),
        Type::INT4 => opt(row.try_get::<_, Option<i32>>(idx)?, |v| Value::Int(v.into())),
        Type::INT8 => opt(row.try_get::<_, Option<i64>>(idx)?, Value::Int),
        Type::FLOAT4 => opt(row.try_get::<_, Option<f32>>(idx)?, |v| Value::Double(v.into())),
        Type::FLOAT8 => opt(row.try_get::<_, Option<f64>>(idx)?, Value::Double),
        Type::BOOL => opt(row.try_get::<_, Option<bool>>(idx)?, Value::Bool),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            opt(row.try_get::<_, Option<String>>(idx)?, Value::Text)
        }
        Type::JSON | Type::JSONB => {
            opt(row.try_get::<_, Option<serde_json::Value>>(idx)?, Value::Json)
        }
        Type::NUMERIC => opt(row.try_get::<_, Option<Decimal>>(idx)?, |v| {
            Value::Text(v.to_string())
        }),
        Type::BYTEA => opt(row.try_get::<_, Option<Vec<u8>>>(idx)?, Value::Bytes),
        Type::UUID => opt(row.try_get::<_, Option<uuid::Uuid>>(idx)?, |v| {
            Value::Text(v.to_string())
        }),
        Type::TIMESTAMPTZ => opt(row.try_get::<_, Option<DateTime<Utc>>>(idx)?, |v| {
            Value::Text(v.to_rfc3339())
        }),
        Type::TIMESTAMP => opt(row.try_get::<_, Option<NaiveDateTime>>(idx)?, |v| {
            Value::Text(v.to_string())
        }),
        Type::DATE => opt(row.try_get::<_, Option<NaiveDate>>(idx)?, |v| {
            Value::Text(v.to_string())
        }),
        Type::INT2_ARRAY => array(row.try_get::<_, Option<Vec<Option<i16>>>>(idx)?, |v| {
            Value::Int(v.into())
        }),
        Type::INT4_ARRAY => array(row.try_get::<_, Option<Vec<Option<i32>>>>(idx)?, |v| {
            Value::Int(v.into())
        }),
        Type::INT8_ARRAY => array(row.try_get::<_, Option<Vec<Option<i64>>>>(idx)?, Value::Int),
        Type::FLOAT4_ARRAY => array(row.try_get::<_, Option<Vec<Option<f32>>>>(idx)?, |v| {
            Value::Double(v.into())
        }),
        Type::FLOAT8_ARRAY => {
            array(row.try_get::<_, Option<Vec<Option<f64>>>>(idx)?, Value::Double)
        }
        Type::BOOL_ARRAY => array(row.try_get::<_, Option<Vec<Option<bool>>>>(idx)?, Value::Bool),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => {
            array(row.try_get::<_, Option<Vec<Option<String>>>>(idx)?, Value::Text)
        }
        _ => opt(row.try_get::<_, Option<Raw>>(idx)?, |raw| raw.0),
    };
    Ok(value)
}

/// Rewrite `?` placeholders to `$1, $2, ...`, leaving quoted text alone.
pub(crate) fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0usize;
    let mut quote: Option<char> = None;
    for ch in sql.chars() {
        match (quote, ch) {
            (None, '\'' | '"') => {
                quote = Some(ch);
                out.push(ch);
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push(ch);
            }
            (None, '?') => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Turn `INSERT ...;` into `INSERT ... RETURNING <column>`.
pub(crate) fn with_returning(sql: &str, column: &str) -> String {
    let body = sql.trim_end().trim_end_matches(';').trim_end();
    format!("{body} RETURNING {column}")
}
