use super::{Binder, Pairs, Tokens, require_table};
use crate::column::Column;
use crate::driver::{Connection, GeneratedKeys};
use crate::error::{OrmError, OrmResult};
use crate::keywords::{SET, UPDATE, WHERE};
use crate::log::{self, StatementKind};
use crate::value::Value;

/// Builder for `UPDATE ... SET ... [WHERE ...];`
///
/// ```
/// use colsql::{Col, SqlType, UpdateBuilder};
///
/// const ID: Col = Col::new("id", SqlType::Integer);
/// const STATUS: Col = Col::new("status", SqlType::Varchar);
///
/// let update = UpdateBuilder::new()
///     .table("users")
///     .value(STATUS, "inactive")
///     .where_(ID, 42);
/// assert_eq!(update.render(), "UPDATE users SET status = ? WHERE id = ?;");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    table: Option<String>,
    values: Pairs,
    clauses: Pairs,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the table to update.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set a column. `None`/[`Value::Null`] sets it to NULL.
    pub fn value(mut self, column: impl Column, value: impl Into<Value>) -> Self {
        self.values.upsert(column.to_col(), value.into());
        self
    }

    /// Restrict the update to rows where `column = value` (or `IS NULL`).
    pub fn where_(mut self, column: impl Column, value: impl Into<Value>) -> Self {
        self.clauses.upsert(column.to_col(), value.into());
        self
    }

    /// Render the statement text.
    ///
    /// Without any value the SET list is empty and the SQL is not valid;
    /// [`execute`](Self::execute) refuses that case.
    pub fn render(&self) -> String {
        let mut sql = Tokens::new(UPDATE);
        sql.push(self.table.as_deref().unwrap_or_default())
            .push(SET)
            .push(self.values.render_assignments());
        if !self.clauses.is_empty() {
            sql.push(WHERE).push(self.clauses.render_clauses());
        }
        sql.finish()
    }

    /// Execute the update. Returns the affected row count, or `None` when no
    /// row matched.
    ///
    /// SET values are bound first, then the non-null filters.
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> OrmResult<Option<u64>> {
        require_table(self.table.as_deref(), "UPDATE")?;
        if self.values.is_empty() {
            return Err(OrmError::config("UPDATE needs at least one value to set"));
        }
        let sql = self.render();
        let params = self.values.len() + self.clauses.bound_clause_count();
        log::before_execute(StatementKind::Update, &sql, params);

        let mut stmt = conn.prepare(&sql, GeneratedKeys::Skip)?;
        let mut binder = Binder::new(stmt.as_mut());
        for (col, value) in self.values.iter() {
            binder.value(col, value)?;
        }
        for (col, value) in self.clauses.iter() {
            binder.clause(col, value)?;
        }
        debug_assert_eq!(binder.bound(), params);

        let rows = stmt.execute_update()?;
        log::after_execute(StatementKind::Update, rows);
        Ok((rows > 0).then_some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Col, SqlType};

    const ID: Col = Col::new("id", SqlType::Integer);
    const NAME: Col = Col::new("name", SqlType::Varchar);
    const NICK: Col = Col::new("nick", SqlType::Varchar);

    #[test]
    fn test_update_without_where() {
        let qb = UpdateBuilder::new().table("users").value(NAME, "a");
        assert_eq!(qb.render(), "UPDATE users SET name = ?;");
    }

    #[test]
    fn test_update_multiple_values_and_clauses() {
        let qb = UpdateBuilder::new()
            .table("users")
            .value(NAME, "a")
            .value(NICK, None::<String>)
            .where_(ID, 1)
            .where_(NICK, None::<String>);
        assert_eq!(
            qb.render(),
            "UPDATE users SET name = ?, nick = ? WHERE id = ? AND nick IS NULL;"
        );
    }
}
