//! # colsql
//!
//! Fluent builders for parameterized `INSERT`, `SELECT`, `UPDATE` and
//! `DELETE` statements over typed column descriptors.
//!
//! ## Features
//!
//! - **Typed columns**: every column carries its SQL type, used as the bind hint
//! - **Positional binding**: the Nth `?` is bound to the Nth value, in the order values were added
//! - **NULL-aware filters**: a NULL filter renders `col IS NULL` and takes no bind slot
//! - **Config errors first**: a missing table, an empty UPDATE or an unfiltered DELETE fail before any driver call
//! - **Row mapping**: keep raw [`Row`]s, pass a closure, or fill a struct through a [`FieldMapper`]
//! - **Pluggable driver**: builders talk to a small blocking [`Connection`] contract
//!
//! ## Example
//!
//! ```ignore
//! use colsql::{Col, SqlType};
//!
//! const NAME: Col = Col::new("name", SqlType::Varchar);
//! const AGE: Col = Col::new("age", SqlType::Integer);
//!
//! let config = colsql::PgConfig::from_env()?.generated_key_column("id");
//! let conn = colsql::PgConnection::connect(config)?;
//!
//! // INSERT, returning the generated key
//! let id = colsql::insert()
//!     .table("users")
//!     .value(NAME, "alice")
//!     .value(AGE, 30)
//!     .execute(&conn)?;
//!
//! // SELECT into a struct
//! #[derive(Default, colsql::FromRow)]
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//! let users: Vec<User> = colsql::select_as::<User>()
//!     .table("users")
//!     .where_(AGE, 30)
//!     .order_by_asc(NAME)
//!     .fetch_many(&conn)?;
//!
//! // UPDATE / DELETE
//! colsql::update().table("users").value(AGE, 31).where_(NAME, "alice").execute(&conn)?;
//! colsql::delete().table("users").where_(NAME, "alice").execute(&conn)?;
//! ```

pub mod builder;
pub mod column;
pub mod driver;
pub mod error;
pub mod keywords;
pub mod log;
pub mod mapper;
pub mod row;
pub mod testing;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

pub use builder::{
    DeleteBuilder, InsertBuilder, OrderDirection, SelectBuilder, UpdateBuilder,
    select::RowSelect,
};
pub use column::{Col, Column, SqlType};
pub use driver::{Connection, GeneratedKeys, PreparedStatement, RowCursor};
pub use error::{DriverError, OrmError, OrmResult};
pub use log::StatementKind;
pub use mapper::{FieldMapper, FromRow, IdentityMapper, RowMapper, UnmatchedColumns};
pub use row::{ColumnIndex, ColumnMeta, Row};
pub use value::{FromValue, Value};

#[cfg(feature = "postgres")]
pub use pg::{PgConfig, PgConnection};

// Derive macro shares the trait's name; they live in different namespaces.
#[cfg(feature = "derive")]
pub use colsql_derive::FromRow;

/// Start an `INSERT`.
pub fn insert() -> InsertBuilder {
    InsertBuilder::new()
}

/// Start a `SELECT` that returns raw [`Row`]s.
pub fn select() -> RowSelect {
    SelectBuilder::rows()
}

/// Start a `SELECT` that maps rows into `T` through its [`FieldMapper`].
pub fn select_as<T: FromRow + 'static>() -> SelectBuilder<FieldMapper<T>> {
    SelectBuilder::mapped()
}

/// Start an `UPDATE`.
pub fn update() -> UpdateBuilder {
    UpdateBuilder::new()
}

/// Start a `DELETE`.
pub fn delete() -> DeleteBuilder {
    DeleteBuilder::new()
}
