//! Connection contract consumed by the statement builders.
//!
//! The builders never talk to a database directly. Anything that can prepare
//! a statement from SQL text, bind positional parameters with a type hint and
//! hand back a row cursor can drive them: the bundled
//! [`PgConnection`](crate::pg::PgConnection), the in-memory
//! [`MockConnection`](crate::testing::MockConnection), or a user adapter.
//!
//! All calls are blocking. A builder only borrows the connection; it never
//! closes it.

use crate::column::SqlType;
use crate::error::OrmResult;
use crate::row::{ColumnMeta, Row};
use crate::value::Value;

/// Whether `prepare` should arrange for generated keys to be readable after
/// an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    #[default]
    Skip,
    Return,
}

/// A database connection.
pub trait Connection {
    /// Prepare a statement from literal SQL text with `?` placeholders.
    fn prepare(
        &self,
        sql: &str,
        keys: GeneratedKeys,
    ) -> OrmResult<Box<dyn PreparedStatement + '_>>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn prepare(
        &self,
        sql: &str,
        keys: GeneratedKeys,
    ) -> OrmResult<Box<dyn PreparedStatement + '_>> {
        (**self).prepare(sql, keys)
    }
}

/// A prepared statement. Parameter indices are 1-based.
pub trait PreparedStatement {
    /// Bind a non-null value, converted as `sql_type`.
    fn bind(&mut self, index: usize, value: &Value, sql_type: SqlType) -> OrmResult<()>;

    /// Bind an explicit, typed NULL.
    fn bind_null(&mut self, index: usize, sql_type: SqlType) -> OrmResult<()>;

    /// Execute a data-modifying statement and return the affected row count.
    fn execute_update(&mut self) -> OrmResult<u64>;

    /// Execute a query and return a cursor over its rows.
    fn execute_query(&mut self) -> OrmResult<Box<dyn RowCursor + '_>>;

    /// Cursor over the keys generated by the last `execute_update`.
    ///
    /// Only meaningful when the statement was prepared with
    /// [`GeneratedKeys::Return`].
    fn generated_keys(&mut self) -> OrmResult<Box<dyn RowCursor + '_>>;
}

/// Forward-only cursor over result rows.
pub trait RowCursor {
    /// Metadata of the columns in this result.
    fn columns(&self) -> &[ColumnMeta];

    /// Advance to the next row. `None` once the cursor is exhausted.
    fn next_row(&mut self) -> OrmResult<Option<Row>>;
}
