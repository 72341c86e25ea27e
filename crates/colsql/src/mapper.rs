//! Row → value mapping.
//!
//! A [`SelectBuilder`](crate::builder::SelectBuilder) hands every row it reads
//! to a [`RowMapper`]:
//!
//! - [`IdentityMapper`] passes the [`Row`] through untouched.
//! - Any `Fn(Row) -> OrmResult<T>` closure is a mapper.
//! - [`FieldMapper`] builds a `T` and fills it through a table of named,
//!   typed setters. [`FromRow`] (derivable) supplies that table for a type.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::{FromValue, Value};
use std::collections::HashMap;
use std::fmt;

/// Maps one result row to an output value.
pub trait RowMapper {
    type Output;

    fn map_row(&self, row: Row) -> OrmResult<Self::Output>;
}

impl<F, T> RowMapper for F
where
    F: Fn(Row) -> OrmResult<T>,
{
    type Output = T;

    fn map_row(&self, row: Row) -> OrmResult<T> {
        self(row)
    }
}

/// Returns each row as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl RowMapper for IdentityMapper {
    type Output = Row;

    fn map_row(&self, row: Row) -> OrmResult<Row> {
        Ok(row)
    }
}

/// What a [`FieldMapper`] does with a result column that has no setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedColumns {
    /// Ignore the column.
    #[default]
    Skip,
    /// Fail the row with [`OrmError::Mapping`].
    Error,
}

/// Types that describe how to build themselves from a row.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Default, colsql::FromRow)]
/// struct User {
///     name: String,
///     age: i32,
///     #[colsql(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
pub trait FromRow: Sized + 'static {
    fn field_mapper() -> FieldMapper<Self>;

    /// Map a single row through [`FromRow::field_mapper`].
    fn from_row(row: Row) -> OrmResult<Self> {
        Self::field_mapper().map_row(row)
    }
}

type Constructor<T> = Box<dyn Fn() -> OrmResult<T> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), String> + Send + Sync>;

/// Explicit column-name → setter table for a target type `T`.
///
/// ```
/// use colsql::FieldMapper;
///
/// #[derive(Default)]
/// struct User {
///     name: String,
///     age: i32,
/// }
///
/// let mapper = FieldMapper::<User>::new()
///     .field("name", |u: &mut User, v: String| u.name = v)
///     .field("age", |u: &mut User, v: i32| u.age = v);
/// assert_eq!(mapper.len(), 2);
/// ```
pub struct FieldMapper<T> {
    type_name: &'static str,
    construct: Constructor<T>,
    setters: HashMap<String, Setter<T>>,
    unmatched: UnmatchedColumns,
}

impl<T: Default + 'static> FieldMapper<T> {
    /// Mapper that starts every row from `T::default()`.
    pub fn new() -> Self {
        Self::with_constructor(|| Ok(T::default()))
    }
}

impl<T: Default + 'static> Default for FieldMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FieldMapper<T> {
    /// Mapper with a fallible constructor.
    ///
    /// A constructor error fails the row with [`OrmError::Mapping`].
    pub fn with_constructor<F>(construct: F) -> Self
    where
        F: Fn() -> OrmResult<T> + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            construct: Box::new(construct),
            setters: HashMap::new(),
            unmatched: UnmatchedColumns::Skip,
        }
    }

    /// Register a setter for the column called `column` (case-sensitive).
    ///
    /// Registering the same column twice replaces the earlier setter.
    pub fn field<V, F>(mut self, column: impl Into<String>, set: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let setter: Setter<T> = Box::new(move |target, value| {
            let converted = V::from_value(value)?;
            set(target, converted);
            Ok(())
        });
        self.setters.insert(column.into(), setter);
        self
    }

    /// Choose how columns without a setter are handled.
    pub fn unmatched(mut self, policy: UnmatchedColumns) -> Self {
        self.unmatched = policy;
        self
    }

    /// Reject rows that carry columns without a setter.
    pub fn strict(self) -> Self {
        self.unmatched(UnmatchedColumns::Error)
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    pub fn has_field(&self, column: &str) -> bool {
        self.setters.contains_key(column)
    }
}

impl<T: 'static> RowMapper for FieldMapper<T> {
    type Output = T;

    fn map_row(&self, row: Row) -> OrmResult<T> {
        let mut target = (self.construct)().map_err(|e| {
            OrmError::mapping(format!(
                "can't instantiate instance of type {}: {e}",
                self.type_name
            ))
        })?;

        for (meta, value) in row.iter() {
            match self.setters.get(&meta.name) {
                Some(set) => {
                    set(&mut target, value)
                        .map_err(|msg| OrmError::decode(meta.name.as_str(), msg))?;
                }
                None => match self.unmatched {
                    UnmatchedColumns::Skip => {
                        tracing::trace!(
                            target: "colsql.mapper",
                            column = %meta.name,
                            target_type = self.type_name,
                            "skipping column without a field"
                        );
                    }
                    UnmatchedColumns::Error => {
                        return Err(OrmError::mapping(format!(
                            "column '{}' has no field on {}",
                            meta.name, self.type_name
                        )));
                    }
                },
            }
        }

        Ok(target)
    }
}

impl<T> fmt::Debug for FieldMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        columns.sort_unstable();
        f.debug_struct("FieldMapper")
            .field("type", &self.type_name)
            .field("columns", &columns)
            .field("unmatched", &self.unmatched)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::SqlType;
    use crate::row::ColumnMeta;
    use std::sync::Arc;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        name: String,
        age: i32,
        score: Option<f64>,
    }

    fn person_mapper() -> FieldMapper<Person> {
        FieldMapper::new()
            .field("name", |p: &mut Person, v: String| p.name = v)
            .field("age", |p: &mut Person, v: i32| p.age = v)
            .field("score", |p: &mut Person, v: Option<f64>| p.score = v)
    }

    fn row(columns: &[(&str, SqlType)], values: Vec<Value>) -> Row {
        let meta: Arc<[ColumnMeta]> = columns
            .iter()
            .map(|(n, t)| ColumnMeta::new(*n, *t))
            .collect::<Vec<_>>()
            .into();
        Row::new(meta, values).unwrap()
    }

    impl FromRow for Person {
        fn field_mapper() -> FieldMapper<Self> {
            person_mapper()
        }
    }

    #[test]
    fn test_from_row_uses_field_mapper() {
        let r = row(
            &[("name", SqlType::Varchar), ("score", SqlType::Double)],
            vec![Value::Text("Dana".into()), Value::Double(4.5)],
        );
        let person = Person::from_row(r).unwrap();
        assert_eq!(person.name, "Dana");
        assert_eq!(person.score, Some(4.5));
    }

    #[test]
    fn test_identity_mapper_returns_row() {
        let r = row(&[("id", SqlType::Integer)], vec![Value::Int(7)]);
        let mapped = IdentityMapper.map_row(r.clone()).unwrap();
        assert_eq!(mapped, r);
    }

    #[test]
    fn test_closure_mapper() {
        let mapper = |r: Row| r.get_i64("id");
        let r = row(&[("id", SqlType::Integer)], vec![Value::Int(7)]);
        assert_eq!(mapper.map_row(r).unwrap(), 7);
    }

    #[test]
    fn test_field_mapper_skips_unknown_columns() {
        let r = row(
            &[
                ("name", SqlType::Varchar),
                ("age", SqlType::Integer),
                ("unknownCol", SqlType::Varchar),
            ],
            vec![
                Value::Text("Alice".into()),
                Value::Int(30),
                Value::Text("x".into()),
            ],
        );
        let person = person_mapper().map_row(r).unwrap();
        assert_eq!(
            person,
            Person {
                name: "Alice".into(),
                age: 30,
                score: None,
            }
        );
    }

    #[test]
    fn test_field_mapper_column_names_are_case_sensitive() {
        let r = row(&[("Name", SqlType::Varchar)], vec![Value::Text("Bob".into())]);
        let person = person_mapper().map_row(r).unwrap();
        assert_eq!(person.name, "");
    }

    #[test]
    fn test_strict_mapper_rejects_unknown_columns() {
        let r = row(&[("unknownCol", SqlType::Varchar)], vec![Value::Text("x".into())]);
        let err = person_mapper().strict().map_row(r).unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("unknownCol"));
    }

    #[test]
    fn test_type_mismatch_is_decode_error() {
        let r = row(&[("age", SqlType::Varchar)], vec![Value::Text("thirty".into())]);
        let err = person_mapper().map_row(r).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_constructor_failure_is_fatal() {
        let mapper: FieldMapper<Person> =
            FieldMapper::with_constructor(|| Err(OrmError::mapping("no default")))
                .field("name", |p: &mut Person, v: String| p.name = v);
        let r = row(&[("name", SqlType::Varchar)], vec![Value::Text("x".into())]);
        let err = mapper.map_row(r).unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("can't instantiate"));
    }

    #[test]
    fn test_debug_lists_columns() {
        let dbg = format!("{:?}", person_mapper());
        assert!(dbg.contains("\"age\", \"name\", \"score\""));
    }
}
