//! Blocking PostgreSQL driver built on `tokio-postgres`.
//!
//! [`PgConnection`] owns a single-threaded tokio runtime and blocks on it for
//! every call, so it can be handed to the builders like any other
//! [`Connection`].
//!
//! Differences from a generic driver that callers should know about:
//!
//! - `?` placeholders are renumbered to `$1, $2, ...` before preparing.
//! - Generated keys are implemented with `RETURNING <generated_key_column>`
//!   and only when that column is configured; otherwise inserts report no key.
//! - Values are converted to the parameter types Postgres inferred for the
//!   prepared statement; the column's [`SqlType`] is only used in errors.
//!
//! ```ignore
//! use colsql::pg::{PgConfig, PgConnection};
//!
//! let conn = PgConnection::connect(PgConfig::from_env()?.generated_key_column("id"))?;
//! let id = colsql::insert().table("users").value(NAME, "alice").execute(&conn)?;
//! ```

mod config;
mod convert;

pub use config::{DATABASE_URL_ENV, GENERATED_KEY_ENV, PgConfig};

use crate::column::SqlType;
use crate::driver::{Connection, GeneratedKeys, PreparedStatement, RowCursor};
use crate::error::{OrmError, OrmResult};
use crate::row::{ColumnMeta, Row};
use crate::value::Value;
use convert::{Null, PgParam};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Statement};

/// A blocking PostgreSQL connection.
pub struct PgConnection {
    runtime: Runtime,
    client: Client,
    config: PgConfig,
}

impl PgConnection {
    /// Connect using `config`.
    pub fn connect(config: PgConfig) -> OrmResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OrmError::Connection(format!("failed to start runtime: {e}")))?;

        let (client, connection) = runtime.block_on(tokio_postgres::connect(&config.url, NoTls))?;
        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "colsql.pg", error = %e, "postgres connection closed with error");
            }
        });
        tracing::debug!(target: "colsql.pg", "postgres connection established");

        Ok(Self {
            runtime,
            client,
            config,
        })
    }

    /// Connect to `url` with default settings.
    pub fn connect_url(url: impl Into<String>) -> OrmResult<Self> {
        Self::connect(PgConfig::new(url))
    }

    /// Connect using [`PgConfig::from_env`].
    pub fn from_env() -> OrmResult<Self> {
        Self::connect(PgConfig::from_env()?)
    }

    pub fn config(&self) -> &PgConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    /// Run one or more statements without parameters (DDL, fixtures).
    pub fn batch_execute(&self, sql: &str) -> OrmResult<()> {
        self.runtime.block_on(self.client.batch_execute(sql))?;
        Ok(())
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("generated_key_column", &self.config.generated_key_column)
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection for PgConnection {
    fn prepare(
        &self,
        sql: &str,
        keys: GeneratedKeys,
    ) -> OrmResult<Box<dyn PreparedStatement + '_>> {
        let mut pg_sql = convert::number_placeholders(sql);
        let returning = match (keys, self.config.generated_key_column.as_deref()) {
            (GeneratedKeys::Return, Some(column)) => {
                pg_sql = convert::with_returning(&pg_sql, column);
                true
            }
            _ => false,
        };

        let statement = self.runtime.block_on(self.client.prepare(&pg_sql))?;
        let params = std::iter::repeat_with(|| None)
            .take(statement.params().len())
            .collect();
        Ok(Box::new(PgStatement {
            conn: self,
            statement,
            params,
            returning,
            keys: Vec::new(),
        }))
    }
}

struct PgStatement<'c> {
    conn: &'c PgConnection,
    statement: Statement,
    params: Vec<Option<PgParam>>,
    returning: bool,
    keys: Vec<tokio_postgres::Row>,
}

impl PgStatement<'_> {
    fn slot(&mut self, index: usize) -> OrmResult<(&Type, &mut Option<PgParam>)> {
        let count = self.params.len();
        match (
            index.checked_sub(1).and_then(|i| self.statement.params().get(i)),
            index.checked_sub(1).and_then(|i| self.params.get_mut(i)),
        ) {
            (Some(ty), Some(slot)) => Ok((ty, slot)),
            _ => Err(OrmError::bind(
                index,
                format!("statement has {count} parameters"),
            )),
        }
    }

    fn param_refs(&self) -> OrmResult<Vec<&(dyn ToSql + Sync)>> {
        self.params
            .iter()
            .enumerate()
            .map(|(i, p)| match p {
                Some(p) => Ok(&**p as &(dyn ToSql + Sync)),
                None => Err(OrmError::bind(i + 1, "parameter was never bound")),
            })
            .collect()
    }

    fn run_query(&self) -> OrmResult<Vec<tokio_postgres::Row>> {
        let params = self.param_refs()?;
        let rows = self
            .conn
            .runtime
            .block_on(self.conn.client.query(&self.statement, &params))?;
        Ok(rows)
    }
}

impl PreparedStatement for PgStatement<'_> {
    fn bind(&mut self, index: usize, value: &Value, sql_type: SqlType) -> OrmResult<()> {
        let (ty, slot) = self.slot(index)?;
        let param = convert::to_param(value, ty)
            .map_err(|msg| OrmError::bind(index, format!("{msg} (column type {sql_type})")))?;
        *slot = Some(param);
        Ok(())
    }

    fn bind_null(&mut self, index: usize, _sql_type: SqlType) -> OrmResult<()> {
        let (_, slot) = self.slot(index)?;
        *slot = Some(Box::new(Null));
        Ok(())
    }

    fn execute_update(&mut self) -> OrmResult<u64> {
        if self.returning {
            let rows = self.run_query()?;
            let count = rows.len() as u64;
            self.keys = rows;
            return Ok(count);
        }
        let params = self.param_refs()?;
        let count = self
            .conn
            .runtime
            .block_on(self.conn.client.execute(&self.statement, &params))?;
        Ok(count)
    }

    fn execute_query(&mut self) -> OrmResult<Box<dyn RowCursor + '_>> {
        let rows = self.run_query()?;
        Ok(Box::new(PgCursor::new(&self.statement, rows)))
    }

    fn generated_keys(&mut self) -> OrmResult<Box<dyn RowCursor + '_>> {
        let rows = std::mem::take(&mut self.keys);
        Ok(Box::new(PgCursor::new(&self.statement, rows)))
    }
}

struct PgCursor {
    columns: Arc<[ColumnMeta]>,
    types: Vec<Type>,
    rows: std::vec::IntoIter<tokio_postgres::Row>,
}

impl PgCursor {
    fn new(statement: &Statement, rows: Vec<tokio_postgres::Row>) -> Self {
        let columns = statement
            .columns()
            .iter()
            .map(|c| ColumnMeta::new(c.name(), convert::sql_type_of(c.type_())))
            .collect::<Vec<_>>()
            .into();
        let types = statement
            .columns()
            .iter()
            .map(|c| c.type_().clone())
            .collect();
        Self {
            columns,
            types,
            rows: rows.into_iter(),
        }
    }
}

impl RowCursor for PgCursor {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    fn next_row(&mut self) -> OrmResult<Option<Row>> {
        let Some(pg_row) = self.rows.next() else {
            return Ok(None);
        };
        let values = self
            .types
            .iter()
            .enumerate()
            .map(|(idx, ty)| convert::read_value(&pg_row, idx, ty))
            .collect::<OrmResult<Vec<_>>>()?;
        Row::new(Arc::clone(&self.columns), values).map(Some)
    }
}
