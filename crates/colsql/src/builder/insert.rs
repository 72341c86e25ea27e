use super::{Binder, Pairs, Tokens, require_table};
use crate::column::Column;
use crate::driver::{Connection, GeneratedKeys};
use crate::error::OrmResult;
use crate::keywords::{INSERT, INTO, PLACEHOLDER, VALUES};
use crate::log::{self, StatementKind};
use crate::value::Value;

/// Builder for `INSERT INTO ... (...) VALUES (...);`
///
/// ```
/// use colsql::{Col, InsertBuilder, SqlType};
///
/// const NAME: Col = Col::new("name", SqlType::Varchar);
/// const AGE: Col = Col::new("age", SqlType::Integer);
///
/// let insert = InsertBuilder::new()
///     .table("users")
///     .value(NAME, "alice")
///     .value(AGE, None::<i32>);
/// assert_eq!(insert.render(), "INSERT INTO users (name, age) VALUES (?, ?);");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InsertBuilder {
    table: Option<String>,
    values: Pairs,
}

impl InsertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the table to insert into.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the value of a column. `None`/[`Value::Null`] inserts NULL.
    pub fn value(mut self, column: impl Column, value: impl Into<Value>) -> Self {
        self.values.upsert(column.to_col(), value.into());
        self
    }

    /// Render the statement text.
    ///
    /// With no values this is the degenerate `INSERT INTO <table>;`.
    pub fn render(&self) -> String {
        let mut sql = Tokens::new(INSERT);
        sql.push(INTO).push(self.table.as_deref().unwrap_or_default());
        if !self.values.is_empty() {
            let placeholders = vec![PLACEHOLDER; self.values.len()];
            sql.push(format!("({})", self.values.names().join(", ")))
                .push(VALUES)
                .push(format!("({})", placeholders.join(", ")));
        }
        sql.finish()
    }

    /// Execute the insert and return the first generated key, if any.
    ///
    /// Returns `None` when no row was inserted, or when the driver produced no
    /// key or a key that is not an integer (NULL, text, uuid, ...).
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> OrmResult<Option<i64>> {
        require_table(self.table.as_deref(), "INSERT")?;
        let sql = self.render();
        log::before_execute(StatementKind::Insert, &sql, self.values.len());

        let mut stmt = conn.prepare(&sql, GeneratedKeys::Return)?;
        let mut binder = Binder::new(stmt.as_mut());
        for (col, value) in self.values.iter() {
            binder.value(col, value)?;
        }
        debug_assert_eq!(binder.bound(), self.values.len());

        let rows = stmt.execute_update()?;
        log::after_execute(StatementKind::Insert, rows);
        if rows == 0 {
            return Ok(None);
        }

        let mut keys = stmt.generated_keys()?;
        let Some(row) = keys.next_row()? else {
            return Ok(None);
        };
        // The row is already written; an unreadable key reports as no key.
        match row.into_values().into_iter().next() {
            Some(Value::Int(key)) => Ok(Some(key)),
            other => {
                tracing::debug!(target: "colsql.sql", key = ?other, "generated key is not an integer");
                Ok(None)
            }
        }
    }
}
