use super::{Binder, Pairs, Tokens, require_table};
use crate::column::Column;
use crate::driver::{Connection, GeneratedKeys, PreparedStatement};
use crate::error::OrmResult;
use crate::keywords::{ASC, DESC, FROM, GROUP_BY, ORDER_BY, SELECT, WHERE};
use crate::log::{self, StatementKind};
use crate::mapper::{FieldMapper, FromRow, IdentityMapper, RowMapper};
use crate::value::Value;
use std::fmt;

/// Sort direction of an `ORDER BY` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => ASC,
            OrderDirection::Desc => DESC,
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for `SELECT` queries, mapping each returned row through `M`.
///
/// ```
/// use colsql::{Col, OrderDirection, SelectBuilder, SqlType};
///
/// const ID: Col = Col::new("id", SqlType::Integer);
/// const NAME: Col = Col::new("name", SqlType::Varchar);
/// const DELETED_AT: Col = Col::new("deleted_at", SqlType::Other);
///
/// let query = SelectBuilder::rows()
///     .table("users")
///     .select(ID)
///     .select(NAME)
///     .where_(NAME, "alice")
///     .where_(DELETED_AT, None::<String>)
///     .order_by(ID, Some(OrderDirection::Desc));
/// assert_eq!(
///     query.render(),
///     "SELECT id, name FROM users WHERE name = ? AND deleted_at IS NULL ORDER BY id DESC;"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder<M> {
    table: Option<String>,
    columns: Vec<String>,
    clauses: Pairs,
    groupings: Vec<String>,
    orderings: Vec<(String, Option<OrderDirection>)>,
    mapper: M,
}

impl SelectBuilder<IdentityMapper> {
    /// A query that returns the raw rows.
    pub fn rows() -> Self {
        Self::with_mapper(IdentityMapper)
    }
}

impl<T: FromRow + 'static> SelectBuilder<FieldMapper<T>> {
    /// A query that maps rows into `T` through its field table.
    pub fn mapped() -> Self {
        Self::with_mapper(T::field_mapper())
    }
}

impl<M: RowMapper> SelectBuilder<M> {
    /// A query that maps rows with a custom mapper (any `Fn(Row) -> OrmResult<T>`
    /// closure works).
    pub fn with_mapper(mapper: M) -> Self {
        Self {
            table: None,
            columns: Vec::new(),
            clauses: Pairs::default(),
            groupings: Vec::new(),
            orderings: Vec::new(),
            mapper,
        }
    }

    /// Name of the table to read from.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a column to the projection. Never calling this selects `*`.
    pub fn select(mut self, column: impl Column) -> Self {
        self.columns.push(column.name().to_string());
        self
    }

    /// Filter on `column = value`, or `column IS NULL` when `value` is null.
    pub fn where_(mut self, column: impl Column, value: impl Into<Value>) -> Self {
        self.clauses.upsert(column.to_col(), value.into());
        self
    }

    /// Add a `GROUP BY` column.
    pub fn group_by(mut self, column: impl Column) -> Self {
        self.groupings.push(column.name().to_string());
        self
    }

    /// Add an `ORDER BY` column; `None` leaves the direction to the database.
    ///
    /// Ordering by the same column again replaces its direction in place.
    pub fn order_by(mut self, column: impl Column, direction: Option<OrderDirection>) -> Self {
        let name = column.name();
        match self.orderings.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = direction,
            None => self.orderings.push((name.to_string(), direction)),
        }
        self
    }

    pub fn order_by_asc(self, column: impl Column) -> Self {
        self.order_by(column, Some(OrderDirection::Asc))
    }

    pub fn order_by_desc(self, column: impl Column) -> Self {
        self.order_by(column, Some(OrderDirection::Desc))
    }

    /// Render the statement text.
    pub fn render(&self) -> String {
        let mut sql = Tokens::new(SELECT);
        if self.columns.is_empty() {
            sql.push("*");
        } else {
            sql.push(self.columns.join(", "));
        }
        sql.push(FROM).push(self.table.as_deref().unwrap_or_default());

        if !self.clauses.is_empty() {
            sql.push(WHERE).push(self.clauses.render_clauses());
        }

        if !self.groupings.is_empty() {
            sql.push(GROUP_BY).push(self.groupings.join(", "));
        }

        if !self.orderings.is_empty() {
            let orders: Vec<String> = self
                .orderings
                .iter()
                .map(|(name, dir)| match dir {
                    Some(dir) => format!("{name} {dir}"),
                    None => name.clone(),
                })
                .collect();
            sql.push(ORDER_BY).push(orders.join(", "));
        }

        sql.finish()
    }

    /// Fetch the first row, if any, and map it. Further rows are never read.
    pub fn fetch_one<C: Connection + ?Sized>(&self, conn: &C) -> OrmResult<Option<M::Output>> {
        let mut stmt = self.prepare(conn)?;
        let mut cursor = stmt.execute_query()?;
        let first = cursor.next_row()?;
        log::after_execute(StatementKind::Select, u64::from(first.is_some()));
        first.map(|row| self.mapper.map_row(row)).transpose()
    }

    /// Fetch and map every row, in cursor order.
    pub fn fetch_many<C: Connection + ?Sized>(&self, conn: &C) -> OrmResult<Vec<M::Output>> {
        let mut stmt = self.prepare(conn)?;
        let mut cursor = stmt.execute_query()?;
        let mut out = Vec::new();
        while let Some(row) = cursor.next_row()? {
            out.push(self.mapper.map_row(row)?);
        }
        log::after_execute(StatementKind::Select, out.len() as u64);
        Ok(out)
    }

    fn prepare<'c, C: Connection + ?Sized>(
        &self,
        conn: &'c C,
    ) -> OrmResult<Box<dyn PreparedStatement + 'c>> {
        require_table(self.table.as_deref(), "SELECT")?;
        let sql = self.render();
        log::before_execute(StatementKind::Select, &sql, self.clauses.bound_clause_count());

        let mut stmt = conn.prepare(&sql, GeneratedKeys::Skip)?;
        let mut binder = Binder::new(stmt.as_mut());
        for (col, value) in self.clauses.iter() {
            binder.clause(col, value)?;
        }
        Ok(stmt)
    }
}

impl SelectBuilder<IdentityMapper> {
    /// Swap the identity mapper for another one, keeping the configuration.
    pub fn map_with<N: RowMapper>(self, mapper: N) -> SelectBuilder<N> {
        SelectBuilder {
            table: self.table,
            columns: self.columns,
            clauses: self.clauses,
            groupings: self.groupings,
            orderings: self.orderings,
            mapper,
        }
    }
}

/// Convenience alias for a row-returning select.
pub type RowSelect = SelectBuilder<IdentityMapper>;
