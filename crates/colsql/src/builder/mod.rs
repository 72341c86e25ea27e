//! Statement builders.
//!
//! ## Design
//!
//! - Every builder keeps its columns as an ordered list of `(column, value)`
//!   pairs. That single list drives both the text of the statement and the
//!   order parameters are bound in, so the Nth `?` always binds the Nth entry
//!   that consumes a slot.
//! - Setting a column again replaces its value in place; the column keeps
//!   its original position.
//! - `NULL` in a filter renders as `col IS NULL` and binds nothing. `NULL` as
//!   an INSERT/UPDATE value still takes a slot and is bound as a typed NULL.
//! - Missing required state (table, values, clauses) is reported as
//!   [`OrmError::Config`] before the connection is touched.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use select::{OrderDirection, SelectBuilder};
pub use update::UpdateBuilder;

use crate::column::Col;
use crate::driver::PreparedStatement;
use crate::error::{OrmError, OrmResult};
use crate::keywords::{AND, IS_NULL, PLACEHOLDER};
use crate::value::Value;

/// Ordered `(column, value)` pairs keyed by column name.
#[derive(Debug, Clone, Default)]
pub(crate) struct Pairs(Vec<(Col, Value)>);

impl Pairs {
    pub(crate) fn upsert(&mut self, col: Col, value: Value) {
        match self.0.iter_mut().find(|(c, _)| c.name() == col.name()) {
            Some(entry) => *entry = (col, value),
            None => self.0.push((col, value)),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &(Col, Value)> {
        self.0.iter()
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(c, _)| c.name()).collect()
    }

    /// Number of entries that take a placeholder when rendered as filters.
    pub(crate) fn bound_clause_count(&self) -> usize {
        self.0.iter().filter(|(_, v)| !v.is_null()).count()
    }

    /// `a = ? AND b IS NULL ...`
    pub(crate) fn render_clauses(&self) -> String {
        self.0
            .iter()
            .map(|(col, value)| {
                if value.is_null() {
                    format!("{} {IS_NULL}", col.name())
                } else {
                    format!("{} = {PLACEHOLDER}", col.name())
                }
            })
            .collect::<Vec<_>>()
            .join(&format!(" {AND} "))
    }

    /// `a = ?, b = ?`
    pub(crate) fn render_assignments(&self) -> String {
        self.0
            .iter()
            .map(|(col, _)| format!("{} = {PLACEHOLDER}", col.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Joins statement tokens with single spaces and terminates with `;`.
pub(crate) struct Tokens(Vec<String>);

impl Tokens {
    pub(crate) fn new(first: &str) -> Self {
        Self(vec![first.to_string()])
    }

    pub(crate) fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.0.push(token.into());
        self
    }

    pub(crate) fn finish(self) -> String {
        let mut sql = self.0.join(" ");
        sql.push(';');
        sql
    }
}

/// Assigns 1-based parameter positions in call order.
pub(crate) struct Binder<'s, 'c> {
    stmt: &'s mut (dyn PreparedStatement + 'c),
    next: usize,
}

impl<'s, 'c> Binder<'s, 'c> {
    pub(crate) fn new(stmt: &'s mut (dyn PreparedStatement + 'c)) -> Self {
        Self { stmt, next: 1 }
    }

    /// Bind a value slot; `NULL` is bound explicitly with the column's type.
    pub(crate) fn value(&mut self, col: &Col, value: &Value) -> OrmResult<()> {
        let index = self.take();
        if value.is_null() {
            self.stmt.bind_null(index, col.sql_type())
        } else {
            self.stmt.bind(index, value, col.sql_type())
        }
    }

    /// Bind a filter; `NULL` filters were rendered as `IS NULL` and take no slot.
    pub(crate) fn clause(&mut self, col: &Col, value: &Value) -> OrmResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let index = self.take();
        self.stmt.bind(index, value, col.sql_type())
    }

    pub(crate) fn bound(&self) -> usize {
        self.next - 1
    }

    fn take(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Table name, or a configuration error when unset or blank.
pub(crate) fn require_table<'a>(table: Option<&'a str>, what: &str) -> OrmResult<&'a str> {
    match table {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(OrmError::config(format!("No table defined for {what}"))),
    }
}
