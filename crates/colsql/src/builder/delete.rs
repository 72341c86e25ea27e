use super::{Binder, Pairs, Tokens, require_table};
use crate::column::Column;
use crate::driver::{Connection, GeneratedKeys};
use crate::error::{OrmError, OrmResult};
use crate::keywords::{DELETE, FROM, WHERE};
use crate::log::{self, StatementKind};
use crate::value::Value;

/// Builder for `DELETE FROM ... WHERE ...;`
///
/// There is no unconditional form: executing without a filter is a
/// configuration error.
#[derive(Debug, Clone, Default)]
pub struct DeleteBuilder {
    table: Option<String>,
    clauses: Pairs,
}

impl DeleteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the table to delete from.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Delete only rows where `column = value` (or `IS NULL`).
    pub fn where_(mut self, column: impl Column, value: impl Into<Value>) -> Self {
        self.clauses.upsert(column.to_col(), value.into());
        self
    }

    /// Render the statement text.
    pub fn render(&self) -> String {
        let mut sql = Tokens::new(DELETE);
        sql.push(FROM)
            .push(self.table.as_deref().unwrap_or_default())
            .push(WHERE)
            .push(self.clauses.render_clauses());
        sql.finish()
    }

    /// Execute the delete. Returns the affected row count, or `None` when no
    /// row matched.
    pub fn execute<C: Connection + ?Sized>(&self, conn: &C) -> OrmResult<Option<u64>> {
        require_table(self.table.as_deref(), "DELETE")?;
        if self.clauses.is_empty() {
            return Err(OrmError::config("DELETE needs at least one where clause"));
        }
        let sql = self.render();
        let params = self.clauses.bound_clause_count();
        log::before_execute(StatementKind::Delete, &sql, params);

        let mut stmt = conn.prepare(&sql, GeneratedKeys::Skip)?;
        let mut binder = Binder::new(stmt.as_mut());
        for (col, value) in self.clauses.iter() {
            binder.clause(col, value)?;
        }
        debug_assert_eq!(binder.bound(), params);

        let rows = stmt.execute_update()?;
        log::after_execute(StatementKind::Delete, rows);
        Ok((rows > 0).then_some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Col, SqlType};

    const ID: Col = Col::new("id", SqlType::Integer);
    const EMAIL: Col = Col::new("email", SqlType::Varchar);

    #[test]
    fn test_simple_delete() {
        let qb = DeleteBuilder::new().table("users").where_(ID, 1);
        assert_eq!(qb.render(), "DELETE FROM users WHERE id = ?;");
    }

    #[test]
    fn test_delete_mixed_clauses() {
        let qb = DeleteBuilder::new()
            .table("users")
            .where_(EMAIL, None::<String>)
            .where_(ID, 3);
        assert_eq!(
            qb.render(),
            "DELETE FROM users WHERE email IS NULL AND id = ?;"
        );
    }
}
