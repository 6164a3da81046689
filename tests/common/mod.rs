#![allow(dead_code)]

use sql_access::prelude::*;

/// Route `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

#[cfg(feature = "sqlite")]
pub fn memory_db() -> SqliteDb {
    init_tracing();
    let mut db = SqliteDb::new();
    db.open(":memory:").expect("open in-memory sqlite");
    db
}

/// `people(id, name)` with (1, Alice), (2, Bob), (3, NULL).
pub fn seed_people<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS people")?;
    db.exec_dml("CREATE TABLE people (id INTEGER PRIMARY KEY, name VARCHAR(64))")?;
    let mut insert = db.compile_statement("INSERT INTO people (id, name) VALUES (?, ?)")?;
    for (id, name) in [(1, Some("Alice")), (2, Some("Bob")), (3, None)] {
        insert.bind(1, id)?;
        insert.bind(2, name)?;
        insert.exec_dml()?;
        insert.reset()?;
    }
    Ok(())
}

// Scenarios below only use the generic facade so every backend runs the same
// checks.

pub fn crud<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS crud_items")?;
    db.exec_dml("CREATE TABLE crud_items (id INTEGER PRIMARY KEY, label VARCHAR(32))")?;
    assert!(db.table_exists("crud_items"));

    assert_eq!(db.exec_dml("INSERT INTO crud_items VALUES (1, 'one')")?, 1);
    assert_eq!(db.exec_dml("INSERT INTO crud_items VALUES (2, 'two')")?, 1);
    assert_eq!(db.exec_dml("UPDATE crud_items SET label = 'uno' WHERE id = 1")?, 1);
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM crud_items", -1)?, 2);

    let cursor = db.exec_query("SELECT label FROM crud_items WHERE id = 1")?;
    assert!(!cursor.eof());
    assert_eq!(cursor.get_string("label", ""), "uno");
    // a cursor with rows left keeps its statement running
    drop(cursor);

    assert_eq!(db.exec_dml("DELETE FROM crud_items")?, 2);
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM crud_items", -1)?, 0);
    db.exec_dml("DROP TABLE crud_items")?;
    assert!(!db.table_exists("crud_items"));
    Ok(())
}

pub fn commit_keeps_rows<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS tx_commit")?;
    db.exec_dml("CREATE TABLE tx_commit (id INTEGER)")?;
    assert!(!db.in_transaction());
    db.begin_transaction()?;
    assert!(db.in_transaction());
    db.exec_dml("INSERT INTO tx_commit VALUES (1)")?;
    db.exec_dml("INSERT INTO tx_commit VALUES (2)")?;
    db.commit()?;
    assert!(!db.in_transaction());
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM tx_commit", -1)?, 2);
    Ok(())
}

pub fn rollback_discards_rows<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS tx_rollback")?;
    db.exec_dml("CREATE TABLE tx_rollback (id INTEGER)")?;
    db.exec_dml("INSERT INTO tx_rollback VALUES (1)")?;
    db.begin_transaction()?;
    db.exec_dml("INSERT INTO tx_rollback VALUES (2)")?;
    db.exec_dml("INSERT INTO tx_rollback VALUES (3)")?;
    db.rollback()?;
    assert!(!db.in_transaction());
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM tx_rollback", -1)?, 1);
    Ok(())
}

pub fn prepared_round_trip<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS typed_values")?;
    db.exec_dml(
        "CREATE TABLE typed_values (i INTEGER, big BIGINT, d DOUBLE, t VARCHAR(32), b BLOB, n INTEGER)",
    )?;
    let blob = [0xDE_u8, 0xAD, 0xBE, 0xEF];
    let mut insert = db.compile_statement("INSERT INTO typed_values VALUES (?, ?, ?, ?, ?, ?)")?;
    assert_eq!(insert.param_count(), 6);
    insert.bind(1, 42)?;
    insert.bind(2, 9_876_543_210_i64)?;
    insert.bind(3, 2.5)?;
    insert.bind(4, "text value")?;
    insert.bind(5, &blob)?;
    insert.bind_null(6)?;
    assert_eq!(insert.exec_dml()?, 1);

    let mut select = db.compile_statement("SELECT i, big, d, t, b, n FROM typed_values WHERE i = ?")?;
    select.bind(1, 42)?;
    let cursor = select.exec_query()?;
    assert!(!select.is_valid());
    assert!(cursor.is_valid());
    assert!(!cursor.eof());
    assert_eq!(cursor.get_int("i", 0), 42);
    assert_eq!(cursor.get_int64("big", 0), 9_876_543_210);
    assert!((cursor.get_double("d", 0.0) - 2.5).abs() < 1e-9);
    assert_eq!(cursor.get_string("t", ""), "text value");
    assert_eq!(cursor.get_blob("b"), Some(&blob[..]));
    assert!(cursor.field_is_null("n"));
    assert_eq!(cursor.get_int("n", -7), -7);
    Ok(())
}

pub fn bind_reset_loop<B: Backend>(db: &Database<B>) -> DbResult<()> {
    db.exec_dml("DROP TABLE IF EXISTS loop_rows")?;
    db.exec_dml("CREATE TABLE loop_rows (id INTEGER, label VARCHAR(16))")?;
    let mut insert = db.compile_statement("INSERT INTO loop_rows VALUES (?, ?)")?;
    for i in 0..10 {
        let label = format!("row-{i}");
        insert.bind(1, i)?;
        insert.bind(2, &label)?;
        assert_eq!(insert.exec_dml()?, 1);
        insert.reset()?;
    }
    assert!(insert.is_valid());
    assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM loop_rows", -1)?, 10);
    assert_eq!(db.exec_scalar("SELECT MAX(id) FROM loop_rows", -1)?, 9);
    Ok(())
}

pub fn result_set_navigation<B: Backend>(db: &Database<B>) -> DbResult<()> {
    seed_people(db)?;
    let mut rs = db.get_result_set("SELECT id, name FROM people ORDER BY id")?;
    assert_eq!(rs.num_rows(), 3);
    assert_eq!(rs.num_fields(), 2);
    assert_eq!(rs.field_name(1), Some("name"));
    assert_eq!(rs.field_index("id"), Some(0));
    assert_eq!(rs.field_value(0).as_deref(), Some("1"));

    rs.seek_row(999);
    assert_eq!(rs.current_row(), 2);
    assert!(rs.field_is_null("name"));

    // backwards walk, which a forward cursor cannot do
    let mut ids = Vec::new();
    for row in (0..rs.num_rows()).rev() {
        rs.seek_row(row);
        ids.push(rs.get_int("id", 0));
    }
    assert_eq!(ids, vec![3, 2, 1]);

    rs.seek_row(0);
    let mut names = Vec::new();
    while !rs.eof() {
        names.push(rs.get_string("name", "<null>").into_owned());
        rs.next_row();
    }
    assert_eq!(names, vec!["Alice", "Bob", "<null>"]);
    Ok(())
}

pub fn moves_leave_empty_handles<B: Backend>(db: &mut Database<B>) -> DbResult<()> {
    seed_people(db)?;
    {
        let mut stmt = db.compile_statement("SELECT name FROM people WHERE id = ?")?;
        let mut moved = std::mem::take(&mut stmt);
        assert!(!stmt.is_valid());
        assert!(moved.is_valid());
        assert!(stmt.bind(1, 1).is_err_and(|e| e.kind() == ErrorKind::Misuse));

        moved.bind(1, 2)?;
        let mut cursor = moved.exec_query()?;
        let taken = std::mem::take(&mut cursor);
        assert!(!cursor.is_valid());
        assert!(cursor.eof());
        assert_eq!(taken.get_string(0, ""), "Bob");
    }

    let mut moved_db = std::mem::take(db);
    assert!(!db.is_open());
    assert!(moved_db.is_open());
    assert!(db.exec_dml("SELECT 1").is_err_and(|e| e.kind() == ErrorKind::NotOpen));
    std::mem::swap(db, &mut moved_db);
    assert!(db.is_open());
    Ok(())
}

pub fn errors_are_classified<B: Backend>(db: &Database<B>) {
    let err = db.exec_dml("THIS IS NOT SQL").unwrap_err();
    assert_ne!(err.kind(), ErrorKind::NotOpen);
    assert!(!err.message().is_empty());

    let err = db.exec_dml("   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullArgument);

    let err = db.compile_statement("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullArgument);

    assert!(db.exec_query("SELECT * FROM no_such_table").is_err());
    assert!(!db.table_exists("no_such_table"));
    assert!(!db.table_exists(""));
}
