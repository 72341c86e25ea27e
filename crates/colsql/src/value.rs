//! Bind and result values.

use std::fmt;

/// A nullable SQL value, as bound to a statement or read from a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Text(String),
    Array(Vec<Value>),
    Json(serde_json::Value),
    /// Raw bytes, e.g. `bytea` or a column type the driver has no mapping for.
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Bool(_) => "boolean",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Json(_) => "json",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{v}'"),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            Value::Json(v) => write!(f, "{v}"),
            Value::Bytes(bytes) => {
                f.write_str("\\x")?;
                bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a column [`Value`] into a Rust type.
///
/// Used by typed row getters and by [`FieldMapper`](crate::mapper::FieldMapper)
/// setters. `Option<T>` accepts `NULL`; every other implementation rejects it.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {}", got.kind())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch("integer", other)),
        }
    }
}

macro_rules! impl_from_value_narrow_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, String> {
                    let wide = i64::from_value(value)?;
                    <$t>::try_from(wide).map_err(|_| {
                        format!("integer {wide} out of range for {}", stringify!($t))
                    })
                }
            }
        )*
    };
}

impl_from_value_narrow_int!(i8, i16, i32, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Double(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch("double", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v.clone()),
            Value::Null | Value::Bytes(_) => Err(mismatch("json", value)),
            Value::Int(v) => Ok(serde_json::Value::from(*v)),
            Value::Double(v) => Ok(serde_json::Value::from(*v)),
            Value::Bool(v) => Ok(serde_json::Value::from(*v)),
            Value::Text(v) => Ok(serde_json::Value::from(v.as_str())),
            Value::Array(items) => items
                .iter()
                .map(serde_json::Value::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("array", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rust_values() {
        assert_eq!(Value::from(30i32), Value::Int(30));
        assert_eq!(Value::from(1.5f64), Value::Double(1.5));
        assert_eq!(Value::from("alice"), Value::Text("alice".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
        assert_eq!(
            Value::from(vec![1i64, 2]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_from_value_scalars() {
        assert_eq!(i32::from_value(&Value::Int(30)), Ok(30));
        assert_eq!(f64::from_value(&Value::Int(2)), Ok(2.0));
        assert_eq!(bool::from_value(&Value::Bool(false)), Ok(false));
        assert_eq!(
            String::from_value(&Value::Text("x".into())),
            Ok("x".to_string())
        );
    }

    #[test]
    fn test_from_value_rejects_null_for_plain_types() {
        assert_eq!(
            i32::from_value(&Value::Null),
            Err("expected integer, got null".to_string())
        );
        assert_eq!(Option::<i32>::from_value(&Value::Null), Ok(None));
    }

    #[test]
    fn test_from_value_out_of_range() {
        let err = i16::from_value(&Value::Int(70_000)).unwrap_err();
        assert!(err.contains("out of range for i16"));
    }

    #[test]
    fn test_from_value_arrays() {
        let arr = Value::Array(vec![Value::Text("a".into()), Value::Null]);
        assert_eq!(
            Vec::<Option<String>>::from_value(&arr),
            Ok(vec![Some("a".to_string()), None])
        );
        assert!(Vec::<String>::from_value(&arr).is_err());
    }

    #[test]
    fn test_display() {
        let arr = Value::Array(vec![Value::Int(1), Value::Text("b".into())]);
        assert_eq!(arr.to_string(), "{1,'b'}");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_string(), "\\xdead");
    }
}
