//! Typed column descriptors.

use std::borrow::Cow;
use std::fmt;

/// SQL type of a column, used as the bind-type hint for its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Integer,
    Double,
    Boolean,
    Varchar,
    Array,
    /// Anything without a dedicated variant (json, uuid, timestamps, ...).
    Other,
}

impl SqlType {
    /// Lower-case name used in log output and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::Double => "double",
            SqlType::Boolean => "boolean",
            SqlType::Varchar => "varchar",
            SqlType::Array => "array",
            SqlType::Other => "other",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a table: a SQL identifier plus the type its values bind as.
///
/// Implement this for an enum to describe a whole table:
///
/// ```
/// use colsql::{Column, SqlType};
///
/// enum Users {
///     Id,
///     Name,
/// }
///
/// impl Column for Users {
///     fn name(&self) -> &str {
///         match self {
///             Users::Id => "id",
///             Users::Name => "name",
///         }
///     }
///
///     fn sql_type(&self) -> SqlType {
///         match self {
///             Users::Id => SqlType::Integer,
///             Users::Name => SqlType::Varchar,
///         }
///     }
/// }
/// ```
pub trait Column {
    /// Name of the column, exactly as it is called in the database.
    fn name(&self) -> &str;

    /// Type used when binding values for this column.
    fn sql_type(&self) -> SqlType;

    /// Snapshot this column into an owned descriptor.
    fn to_col(&self) -> Col {
        Col {
            name: Cow::Owned(self.name().to_string()),
            sql_type: self.sql_type(),
        }
    }
}

/// Owned column descriptor.
///
/// ```
/// use colsql::{Col, SqlType};
///
/// const ID: Col = Col::new("id", SqlType::Integer);
/// assert_eq!(ID.name(), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Col {
    name: Cow<'static, str>,
    sql_type: SqlType,
}

impl Col {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name: Cow::Borrowed(name),
            sql_type,
        }
    }

    /// Build a descriptor from a runtime name.
    pub fn named(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            sql_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }
}

impl Column for Col {
    fn name(&self) -> &str {
        &self.name
    }

    fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    fn to_col(&self) -> Col {
        self.clone()
    }
}

impl<C: Column + ?Sized> Column for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sql_type(&self) -> SqlType {
        (**self).sql_type()
    }

    fn to_col(&self) -> Col {
        (**self).to_col()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_col() {
        const AGE: Col = Col::new("age", SqlType::Integer);
        assert_eq!(AGE.name(), "age");
        assert_eq!(AGE.sql_type(), SqlType::Integer);
        assert_eq!(AGE.to_col(), AGE);
    }

    #[test]
    fn test_named_col_equals_const_col() {
        assert_eq!(
            Col::named("age", SqlType::Integer),
            Col::new("age", SqlType::Integer)
        );
    }

    #[test]
    fn test_reference_is_a_column() {
        let col = Col::new("name", SqlType::Varchar);
        let by_ref: &Col = &col;
        assert_eq!(Column::name(&by_ref), "name");
        assert_eq!(by_ref.to_col(), col);
    }
}
