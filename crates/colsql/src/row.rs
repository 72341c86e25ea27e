//! Result rows and typed getters.

use crate::column::SqlType;
use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};
use std::sync::Arc;

/// Metadata of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// Something that can locate a column in a [`Row`]: a 0-based index or a name.
pub trait ColumnIndex {
    fn position(&self, columns: &[ColumnMeta]) -> Option<usize>;

    fn describe(&self) -> String;
}

impl ColumnIndex for usize {
    fn position(&self, columns: &[ColumnMeta]) -> Option<usize> {
        (*self < columns.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{self}")
    }
}

impl ColumnIndex for &str {
    fn position(&self, columns: &[ColumnMeta]) -> Option<usize> {
        columns.iter().position(|c| c.name == *self)
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }
}

impl ColumnIndex for String {
    fn position(&self, columns: &[ColumnMeta]) -> Option<usize> {
        self.as_str().position(columns)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

/// One row of a result.
///
/// Column metadata is shared between every row produced by the same cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[ColumnMeta]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. `values` must line up with `columns`.
    pub fn new(columns: Arc<[ColumnMeta]>, values: Vec<Value>) -> OrmResult<Self> {
        if columns.len() != values.len() {
            return Err(OrmError::decode(
                "*",
                format!(
                    "row has {} values for {} columns",
                    values.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(metadata, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnMeta, &Value)> {
        self.columns.iter().zip(self.values.iter())
    }

    /// Raw value of a column.
    pub fn value<I: ColumnIndex>(&self, idx: I) -> OrmResult<&Value> {
        let pos = self.position_of(&idx)?;
        Ok(&self.values[pos])
    }

    /// Typed value of a column.
    pub fn get<T: FromValue, I: ColumnIndex>(&self, idx: I) -> OrmResult<T> {
        let pos = self.position_of(&idx)?;
        T::from_value(&self.values[pos]).map_err(|msg| OrmError::decode(idx.describe(), msg))
    }

    fn position_of<I: ColumnIndex>(&self, idx: &I) -> OrmResult<usize> {
        idx.position(&self.columns)
            .ok_or_else(|| OrmError::decode(idx.describe(), "no such column"))
    }

    pub fn get_i64<I: ColumnIndex>(&self, idx: I) -> OrmResult<i64> {
        self.get(idx)
    }

    pub fn get_i32<I: ColumnIndex>(&self, idx: I) -> OrmResult<i32> {
        self.get(idx)
    }

    pub fn get_f64<I: ColumnIndex>(&self, idx: I) -> OrmResult<f64> {
        self.get(idx)
    }

    pub fn get_bool<I: ColumnIndex>(&self, idx: I) -> OrmResult<bool> {
        self.get(idx)
    }

    pub fn get_string<I: ColumnIndex>(&self, idx: I) -> OrmResult<String> {
        self.get(idx)
    }

    pub fn get_array<I: ColumnIndex>(&self, idx: I) -> OrmResult<Vec<Value>> {
        self.get(idx)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        let columns: Arc<[ColumnMeta]> = vec![
            ColumnMeta::new("name", SqlType::Varchar),
            ColumnMeta::new("age", SqlType::Integer),
            ColumnMeta::new("nickname", SqlType::Varchar),
        ]
        .into();
        Row::new(
            columns,
            vec![Value::Text("Alice".into()), Value::Int(30), Value::Null],
        )
        .unwrap()
    }

    #[test]
    fn test_get_by_name_and_index() {
        let row = sample();
        assert_eq!(row.get_string("name").unwrap(), "Alice");
        assert_eq!(row.get_i32(1usize).unwrap(), 30);
        assert_eq!(row.get::<Option<String>, _>("nickname").unwrap(), None);
    }

    #[test]
    fn test_missing_column() {
        let row = sample();
        let err = row.get_i64("missing").unwrap_err();
        assert!(err.is_decode());
        assert!(row.value(7usize).is_err());
    }

    #[test]
    fn test_type_mismatch() {
        let row = sample();
        let err = row.get_bool("age").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Decode error on column 'age': expected boolean, got integer"
        );
    }

    #[test]
    fn test_length_mismatch() {
        let columns: Arc<[ColumnMeta]> = vec![ColumnMeta::new("a", SqlType::Integer)].into();
        assert!(Row::new(columns, vec![]).is_err());
    }
}
