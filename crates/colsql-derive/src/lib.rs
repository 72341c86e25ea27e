//! Derive macros for colsql
//!
//! Provides `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_row;

/// Derive `FromRow` for a struct with named fields.
///
/// Every field becomes an entry in the type's `FieldMapper`: the column name
/// maps to a setter that converts the column value into the field type. The
/// struct must implement `Default`, which supplies the starting value for
/// every row.
///
/// # Example
///
/// ```ignore
/// use colsql::FromRow;
///
/// #[derive(Default, FromRow)]
/// struct User {
///     name: String,
///     age: i32,
///     #[colsql(column = "email_address")]
///     email: Option<String>,
///     #[colsql(skip)]
///     cached_label: String,
/// }
/// ```
///
/// # Attributes
///
/// - `#[colsql(column = "name")]` - Map field to a different column name
/// - `#[colsql(skip)]` - Leave the field at its default value
#[proc_macro_derive(FromRow, attributes(colsql))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
