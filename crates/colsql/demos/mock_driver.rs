//! Drive the builders without a database.
//!
//! Run with: cargo run --example mock_driver -p colsql
//!
//! Shows the SQL each builder renders and the bind calls it makes.

use colsql::testing::MockConnection;
use colsql::{Col, ColumnMeta, OrmError, Row, SqlType, Value};

const NAME: Col = Col::new("name", SqlType::Varchar);
const AGE: Col = Col::new("age", SqlType::Integer);

fn main() -> Result<(), OrmError> {
    let conn = MockConnection::new()
        .with_affected_rows(1)
        .with_generated_keys(vec![1])
        .with_rows(
            vec![
                ColumnMeta::new("name", SqlType::Varchar),
                ColumnMeta::new("age", SqlType::Integer),
            ],
            vec![
                vec![Value::from("alice"), Value::Int(30)],
                vec![Value::from("bob"), Value::Null],
            ],
        );

    let id = colsql::insert()
        .table("people")
        .value(NAME, "carol")
        .value(AGE, None::<i32>)
        .execute(&conn)?;
    println!("insert -> {id:?}");

    let ages = colsql::select()
        .table("people")
        .where_(AGE, Value::Null)
        .map_with(|row: Row| row.get::<Option<i64>, _>("age"))
        .fetch_many(&conn)?;
    println!("select -> {ages:?}");

    colsql::update()
        .table("people")
        .value(AGE, 31)
        .where_(NAME, "alice")
        .execute(&conn)?;

    for call in conn.calls() {
        println!("  {call:?}");
    }
    Ok(())
}
