//! In-memory driver for tests.
//!
//! [`MockConnection`] implements the [`driver`](crate::driver) contract without
//! a database. It serves scripted rows, affected-row counts and generated keys,
//! and records every driver call so tests can assert on SQL text, bind order,
//! bind types and how far a cursor was advanced.
//!
//! ```
//! use colsql::testing::{Call, MockConnection};
//! use colsql::{Col, DeleteBuilder, SqlType, Value};
//!
//! const ID: Col = Col::new("id", SqlType::Integer);
//!
//! let conn = MockConnection::new().with_affected_rows(1);
//! let deleted = DeleteBuilder::new().table("users").where_(ID, 7).execute(&conn)?;
//! assert_eq!(deleted, Some(1));
//! assert_eq!(
//!     conn.binds(),
//!     vec![Call::Bind { index: 1, value: Value::Int(7), sql_type: SqlType::Integer }]
//! );
//! # Ok::<(), colsql::OrmError>(())
//! ```

use crate::column::SqlType;
use crate::driver::{Connection, GeneratedKeys, PreparedStatement, RowCursor};
use crate::error::{OrmError, OrmResult};
use crate::row::{ColumnMeta, Row};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Prepare { sql: String, keys: GeneratedKeys },
    Bind {
        index: usize,
        value: Value,
        sql_type: SqlType,
    },
    BindNull { index: usize, sql_type: SqlType },
    ExecuteUpdate,
    ExecuteQuery,
    GeneratedKeys,
    /// A `next_row` call on a query cursor.
    Advance,
}

impl Call {
    fn is_bind(&self) -> bool {
        matches!(self, Call::Bind { .. } | Call::BindNull { .. })
    }
}

/// Error returned by a [`MockConnection`] configured with
/// [`MockConnection::failing_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    columns: Option<Arc<[ColumnMeta]>>,
    rows: Vec<Vec<Value>>,
    affected_rows: u64,
    generated_keys: Vec<Value>,
    failure: Option<String>,
}

/// Scripted, recording [`Connection`].
#[derive(Debug, Default)]
pub struct MockConnection {
    state: Mutex<State>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned by every query.
    pub fn with_rows(self, columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) -> Self {
        {
            let mut state = self.lock();
            state.columns = Some(columns.into());
            state.rows = rows;
        }
        self
    }

    /// Count returned by every `execute_update`.
    pub fn with_affected_rows(self, rows: u64) -> Self {
        self.lock().affected_rows = rows;
        self
    }

    /// Keys served by the generated-keys cursor, one row each.
    pub fn with_generated_keys(self, keys: Vec<i64>) -> Self {
        self.with_generated_key_values(keys.into_iter().map(Value::Int).collect())
    }

    /// Like [`with_generated_keys`](Self::with_generated_keys), for keys of any
    /// shape (text, NULL, ...).
    pub fn with_generated_key_values(self, keys: Vec<Value>) -> Self {
        self.lock().generated_keys = keys;
        self
    }

    /// Make `prepare` fail with a [`MockError`].
    pub fn failing_with(self, message: impl Into<String>) -> Self {
        self.lock().failure = Some(message.into());
        self
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Only the bind calls, in order.
    pub fn binds(&self) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_bind())
            .cloned()
            .collect()
    }

    /// SQL text of every prepared statement.
    pub fn prepared_sql(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Prepare { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `next_row` calls made on query cursors.
    pub fn advances(&self) -> usize {
        self.count(|c| matches!(c, Call::Advance))
    }

    /// True when nothing at all reached the connection.
    pub fn untouched(&self) -> bool {
        self.lock().calls.is_empty()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connection for MockConnection {
    fn prepare(
        &self,
        sql: &str,
        keys: GeneratedKeys,
    ) -> OrmResult<Box<dyn PreparedStatement + '_>> {
        self.record(Call::Prepare {
            sql: sql.to_string(),
            keys,
        });
        if let Some(message) = self.lock().failure.clone() {
            return Err(OrmError::driver(MockError(message)));
        }
        Ok(Box::new(MockStatement { conn: self }))
    }
}

struct MockStatement<'a> {
    conn: &'a MockConnection,
}

impl PreparedStatement for MockStatement<'_> {
    fn bind(&mut self, index: usize, value: &Value, sql_type: SqlType) -> OrmResult<()> {
        self.conn.record(Call::Bind {
            index,
            value: value.clone(),
            sql_type,
        });
        Ok(())
    }

    fn bind_null(&mut self, index: usize, sql_type: SqlType) -> OrmResult<()> {
        self.conn.record(Call::BindNull { index, sql_type });
        Ok(())
    }

    fn execute_update(&mut self) -> OrmResult<u64> {
        self.conn.record(Call::ExecuteUpdate);
        Ok(self.conn.lock().affected_rows)
    }

    fn execute_query(&mut self) -> OrmResult<Box<dyn RowCursor + '_>> {
        self.conn.record(Call::ExecuteQuery);
        let (columns, rows) = {
            let state = self.conn.lock();
            let columns = state
                .columns
                .clone()
                .unwrap_or_else(|| Vec::<ColumnMeta>::new().into());
            (columns, state.rows.clone())
        };
        Ok(Box::new(MockCursor {
            conn: Some(self.conn),
            columns,
            rows: rows.into_iter(),
        }))
    }

    fn generated_keys(&mut self) -> OrmResult<Box<dyn RowCursor + '_>> {
        self.conn.record(Call::GeneratedKeys);
        let keys = self.conn.lock().generated_keys.clone();
        let columns: Arc<[ColumnMeta]> = vec![ColumnMeta::new("id", SqlType::Integer)].into();
        Ok(Box::new(MockCursor {
            conn: None,
            columns,
            rows: keys
                .into_iter()
                .map(|k| vec![k])
                .collect::<Vec<_>>()
                .into_iter(),
        }))
    }
}

struct MockCursor<'a> {
    /// Set for query cursors, whose advances are recorded.
    conn: Option<&'a MockConnection>,
    columns: Arc<[ColumnMeta]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl RowCursor for MockCursor<'_> {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> OrmResult<Option<Row>> {
        if let Some(conn) = self.conn {
            conn.record(Call::Advance);
        }
        self.rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
            .transpose()
    }
}
