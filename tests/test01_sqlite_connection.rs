#![cfg(feature = "sqlite")]

mod common;

use std::time::Duration;

use sql_access::prelude::*;
use sql_access::sqlite::{SqliteConnection, SqliteOptions};
use tempfile::tempdir;

#[test]
fn fresh_connection_is_closed() {
    let conn = SqliteConnection::new();
    assert!(!conn.is_open());
    assert!(conn.handle().is_none());
    assert_eq!(conn.exec_dml("SELECT 1").unwrap_err().kind(), ErrorKind::NotOpen);
    assert_eq!(conn.exec_query("SELECT 1").unwrap_err().kind(), ErrorKind::NotOpen);
    assert_eq!(conn.get_result_set("SELECT 1").unwrap_err().kind(), ErrorKind::NotOpen);
    assert_eq!(conn.compile_statement("SELECT 1").unwrap_err().kind(), ErrorKind::NotOpen);
    assert_eq!(conn.begin_transaction().unwrap_err().kind(), ErrorKind::NotOpen);
    assert!(!conn.table_exists("anything"));
    assert!(!conn.in_transaction());
}

#[test]
fn close_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let mut conn = SqliteConnection::new();
    conn.close();
    conn.open(":memory:")?;
    assert!(conn.is_open());
    conn.close();
    conn.close();
    assert!(!conn.is_open());
    Ok(())
}

#[test]
fn blank_locator_is_rejected() {
    let mut conn = SqliteConnection::new();
    let err = conn.open("  ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullArgument);
    assert!(!conn.is_open());
}

#[test]
fn open_failure_reports_not_open() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("missing").join("nested").join("db.sqlite");
    let mut conn = SqliteConnection::new();
    let err = conn.open(&path.to_string_lossy()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotOpen);
    assert!(!err.message().is_empty());
    assert!(!conn.is_open());
}

#[test]
fn reopen_replaces_previous_session() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let first = dir.path().join("first.db").to_string_lossy().into_owned();
    let second = dir.path().join("second.db").to_string_lossy().into_owned();

    let mut conn = SqliteConnection::new();
    conn.open(&first)?;
    conn.exec_dml("CREATE TABLE only_in_first (id INTEGER)")?;
    conn.open(&second)?;
    assert!(conn.is_open());
    assert_eq!(conn.path(), Some(second.as_str()));
    assert!(!conn.table_exists("only_in_first"));

    conn.open(&first)?;
    assert!(conn.table_exists("only_in_first"));
    Ok(())
}

#[test]
fn exec_dml_reports_changed_rows() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    assert_eq!(db.exec_dml("CREATE TABLE t (id INTEGER, v TEXT)")?, 0);
    assert_eq!(db.exec_dml("INSERT INTO t VALUES (1, 'a'), (2, 'b'), (3, 'c')")?, 3);
    assert_eq!(db.exec_dml("UPDATE t SET v = 'z' WHERE id >= 2")?, 2);
    assert_eq!(db.exec_dml("DELETE FROM t WHERE id = 99")?, 0);
    Ok(())
}

#[test]
fn exec_dml_runs_several_statements() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    db.exec_dml(
        "CREATE TABLE a (id INTEGER);
         CREATE TABLE b (id INTEGER);
         INSERT INTO a VALUES (1);",
    )?;
    assert!(db.table_exists("a"));
    assert!(db.table_exists("b"));
    Ok(())
}

#[test]
fn exec_scalar_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    db.exec_dml("CREATE TABLE t (id INTEGER, v INTEGER)")?;
    db.exec_dml("INSERT INTO t VALUES (1, NULL), (2, 40)")?;

    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM t", -1)?, 2);
    assert_eq!(db.exec_scalar("SELECT v FROM t WHERE id = 2", -1)?, 40);
    // NULL field
    assert_eq!(db.exec_scalar("SELECT v FROM t WHERE id = 1", -1)?, -1);
    // no rows
    assert_eq!(db.exec_scalar("SELECT v FROM t WHERE id = 3", -5)?, -5);
    // failure keeps the detail; callers wanting the default use unwrap_or
    let err = db.exec_scalar("SELECT v FROM missing", -1).unwrap_err();
    assert_ne!(err.kind(), ErrorKind::NotOpen);
    assert_eq!(db.exec_scalar("SELECT v FROM missing", -1).unwrap_or(-1), -1);
    Ok(())
}

#[test]
fn table_exists_binds_the_name() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    db.exec_dml("CREATE TABLE accounts (id INTEGER)")?;
    assert!(db.table_exists("accounts"));
    assert!(!db.table_exists("Accounts2"));
    assert!(!db.table_exists("x' OR '1'='1"));
    assert!(!db.table_exists("accounts'; DROP TABLE accounts; --"));
    assert!(db.table_exists("accounts"));
    Ok(())
}

#[test]
fn transaction_state_follows_engine() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    db.exec_dml("CREATE TABLE t (id INTEGER)")?;

    // a transaction started through raw SQL is still visible
    db.exec_dml("BEGIN")?;
    assert!(db.in_transaction());
    db.exec_dml("COMMIT")?;
    assert!(!db.in_transaction());

    db.begin_transaction()?;
    let nested = db.begin_transaction().unwrap_err();
    assert_ne!(nested.kind(), ErrorKind::NotOpen);
    db.rollback()?;

    let err = db.commit().unwrap_err();
    assert!(!err.message().is_empty());
    assert!(!db.in_transaction());
    Ok(())
}

#[test]
fn file_database_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("people.db");
    let path = path.to_string_lossy();

    let mut db = SqliteDb::new();
    db.open(&path)?;
    common::seed_people(&db)?;
    db.close();

    db.open(&path)?;
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM people", 0)?, 3);
    Ok(())
}

#[test]
fn read_only_rejects_writes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("ro.db").to_string_lossy().into_owned();
    {
        let mut conn = SqliteConnection::new();
        conn.open(&path)?;
        conn.exec_dml("CREATE TABLE t (id INTEGER)")?;
    }

    let mut conn = SqliteConnection::new();
    conn.open_with(&SqliteOptions::builder(path.as_str()).read_only(true).finish())?;
    assert_eq!(conn.exec_scalar("SELECT COUNT(*) FROM t", -1)?, 0);
    assert!(conn.exec_dml("INSERT INTO t VALUES (1)").is_err());
    Ok(())
}

#[test]
fn create_false_needs_existing_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.db").to_string_lossy().into_owned();
    let mut conn = SqliteConnection::new();
    let err = conn
        .open_with(&SqliteOptions::builder(path).create(false).finish())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotOpen);
}

#[test]
fn busy_timeout_and_lock_contention() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("busy.db").to_string_lossy().into_owned();

    let mut writer = SqliteConnection::new();
    writer.open(&path)?;
    writer.exec_dml("CREATE TABLE t (id INTEGER)")?;

    let mut other = SqliteConnection::new();
    other.open_with(
        &SqliteOptions::builder(path.as_str())
            .busy_timeout(Duration::from_millis(20))
            .finish(),
    )?;
    other.set_busy_timeout(Duration::from_millis(10))?;

    writer.exec_dml("BEGIN EXCLUSIVE")?;
    let err = other.exec_dml("INSERT INTO t VALUES (1)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);
    writer.rollback()?;
    assert_eq!(other.exec_dml("INSERT INTO t VALUES (1)")?, 1);
    Ok(())
}

#[test]
fn native_handle_is_reachable() -> Result<(), Box<dyn std::error::Error>> {
    let db = common::memory_db();
    let handle = db.inner().handle().expect("open handle");
    handle.execute_batch("CREATE TABLE via_handle (id INTEGER)")?;
    assert!(db.table_exists("via_handle"));
    assert_eq!(db.backend_name(), "sqlite");
    Ok(())
}
