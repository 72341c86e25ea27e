//! `tracing` events for executed statements.
//!
//! Everything is emitted under the `colsql.sql` target: a `DEBUG` event with
//! the rendered SQL right before a statement is prepared, and a `TRACE` event
//! with the row count once it completes.

use std::fmt;

/// Longest SQL text (in bytes) included in a log event.
pub const MAX_LOGGED_SQL: usize = 200;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Select,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::Select => "select",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

pub(crate) fn before_execute(kind: StatementKind, sql: &str, params: usize) {
    let shown = truncate_sql_bytes(sql, MAX_LOGGED_SQL);
    let truncated = shown.len() < sql.len();
    tracing::debug!(
        target: "colsql.sql",
        kind = kind.as_str(),
        params,
        truncated,
        sql = %shown,
        "executing statement"
    );
}

pub(crate) fn after_execute(kind: StatementKind, rows: u64) {
    tracing::trace!(target: "colsql.sql", kind = kind.as_str(), rows, "statement finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_sql_bytes("SELECT 1;", 6), "SELECT");
        assert_eq!(truncate_sql_bytes("SELECT 1;", 100), "SELECT 1;");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; cutting in the middle backs off.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(StatementKind::Select.to_string(), "select");
        assert_eq!(StatementKind::Delete.as_str(), "delete");
    }
}
