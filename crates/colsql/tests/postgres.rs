//! Round trip against a live PostgreSQL server.
//!
//! Skipped unless `DATABASE_URL` is set.

#![cfg(feature = "postgres")]

use colsql::{Col, OrmResult, PgConfig, PgConnection, SqlType, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const ID: Col = Col::new("id", SqlType::Integer);
const NAME: Col = Col::new("name", SqlType::Varchar);
const AGE: Col = Col::new("age", SqlType::Integer);
const SCORE: Col = Col::new("score", SqlType::Double);
const TAGS: Col = Col::new("tags", SqlType::Array);
const PRICE: Col = Col::new("price", SqlType::Other);

#[derive(Debug, Default, PartialEq, colsql::FromRow)]
struct Person {
    id: i64,
    name: String,
    age: Option<i32>,
    score: f64,
    tags: Vec<String>,
}

fn connect(test: &str) -> OrmResult<Option<PgConnection>> {
    connect_with(test, |config| config)
}

fn connect_with(
    test: &str,
    configure: impl FnOnce(PgConfig) -> PgConfig,
) -> OrmResult<Option<PgConnection>> {
    match std::env::var(colsql::pg::DATABASE_URL_ENV) {
        Ok(url) => PgConnection::connect(configure(PgConfig::new(url))).map(Some),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            Ok(None)
        }
    }
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{nanos}", std::process::id())
}

#[test]
fn insert_select_update_delete_roundtrip() -> OrmResult<()> {
    let Some(conn) = connect_with("insert_select_update_delete_roundtrip", |c| {
        c.generated_key_column("id")
    })?
    else {
        return Ok(());
    };
    let table = unique_table("colsql_people");
    conn.batch_execute(&format!(
        "CREATE TEMP TABLE {table} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            age INT,
            score DOUBLE PRECISION NOT NULL DEFAULT 0,
            tags TEXT[] NOT NULL DEFAULT '{{}}'
        )"
    ))?;

    let alice = colsql::insert()
        .table(&table)
        .value(NAME, "alice")
        .value(AGE, 30)
        .value(SCORE, 9.5)
        .value(TAGS, vec!["admin", "ops"])
        .execute(&conn)?
        .expect("generated key");
    let bob = colsql::insert()
        .table(&table)
        .value(NAME, "bob")
        .value(AGE, Value::Null)
        .value(SCORE, 4.0)
        .execute(&conn)?
        .expect("generated key");
    assert_ne!(alice, bob);

    let people: Vec<Person> = colsql::select_as::<Person>()
        .table(&table)
        .order_by_asc(ID)
        .fetch_many(&conn)?;
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].name, "alice");
    assert_eq!(people[0].tags, vec!["admin", "ops"]);
    assert_eq!(people[1].age, None);

    let ageless = colsql::select()
        .table(&table)
        .select(NAME)
        .where_(AGE, Value::Null)
        .fetch_one(&conn)?
        .expect("bob has no age");
    assert_eq!(ageless.get_string("name")?, "bob");

    let updated = colsql::update()
        .table(&table)
        .value(AGE, 42)
        .where_(ID, bob)
        .execute(&conn)?;
    assert_eq!(updated, Some(1));

    let deleted = colsql::delete()
        .table(&table)
        .where_(NAME, "nobody")
        .execute(&conn)?;
    assert_eq!(deleted, None);

    let deleted = colsql::delete().table(&table).where_(ID, alice).execute(&conn)?;
    assert_eq!(deleted, Some(1));

    let remaining = colsql::select().table(&table).fetch_many(&conn)?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].get_i32("age")?, 42);
    Ok(())
}

#[test]
fn bad_parameter_type_is_a_bind_error() -> OrmResult<()> {
    let Some(conn) = connect("bad_parameter_type_is_a_bind_error")? else {
        return Ok(());
    };
    let table = unique_table("colsql_bind");
    conn.batch_execute(&format!("CREATE TEMP TABLE {table} (id BIGSERIAL, age INT)"))?;

    let err = colsql::insert()
        .table(&table)
        .value(AGE, "not a number")
        .execute(&conn)
        .unwrap_err();
    assert!(matches!(err, colsql::OrmError::Bind { index: 1, .. }));
    Ok(())
}

#[test]
fn insert_without_key_column_reports_no_key() -> OrmResult<()> {
    let Some(conn) = connect("insert_without_key_column_reports_no_key")? else {
        return Ok(());
    };
    let table = unique_table("colsql_tags");
    conn.batch_execute(&format!("CREATE TEMP TABLE {table} (name TEXT NOT NULL)"))?;

    let key = colsql::insert().table(&table).value(NAME, "a").execute(&conn)?;
    assert_eq!(key, None);

    let rows = colsql::select().table(&table).fetch_many(&conn)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_string("name")?, "a");
    Ok(())
}

#[test]
fn insert_with_uuid_key_reports_no_key() -> OrmResult<()> {
    let Some(conn) = connect_with("insert_with_uuid_key_reports_no_key", |c| {
        c.generated_key_column("id")
    })?
    else {
        return Ok(());
    };
    let table = unique_table("colsql_uuid");
    conn.batch_execute(&format!(
        "CREATE TEMP TABLE {table} (
            id UUID PRIMARY KEY DEFAULT md5(random()::text)::uuid,
            name TEXT NOT NULL
        )"
    ))?;

    let key = colsql::insert().table(&table).value(NAME, "a").execute(&conn)?;
    assert_eq!(key, None);

    let rows = colsql::select().table(&table).fetch_many(&conn)?;
    assert_eq!(rows.len(), 1);
    assert!(matches!(rows[0].value("id")?, Value::Text(id) if id.len() == 36));
    Ok(())
}

#[test]
fn unmapped_column_types_read_as_generic_values() -> OrmResult<()> {
    let Some(conn) = connect("unmapped_column_types_read_as_generic_values")? else {
        return Ok(());
    };
    let table = unique_table("colsql_misc");
    conn.batch_execute(&format!(
        "CREATE TEMP TABLE {table} (
            name TEXT NOT NULL,
            price NUMERIC NOT NULL,
            blob BYTEA NOT NULL,
            wait INTERVAL NOT NULL
        );
        INSERT INTO {table} VALUES ('widget', 12.50, '\\xdead', '1 day')"
    ))?;

    let rows = colsql::select()
        .table(&table)
        .where_(PRICE, "12.50")
        .fetch_many(&conn)?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get_string("name")?, "widget");
    assert_eq!(row.value("price")?, &Value::Text("12.50".into()));
    assert_eq!(row.value("blob")?, &Value::Bytes(vec![0xde, 0xad]));
    assert!(matches!(row.value("wait")?, Value::Bytes(raw) if raw.len() == 16));
    Ok(())
}
