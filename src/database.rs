use std::fmt;
use std::time::Duration;

use crate::backend::{Backend, Connection, CursorOf, ResultSetOf, StatementOf};
use crate::error::DbResult;

/// Backend-generic database handle.
///
/// A thin owner of `B::Connection` that forwards every call. Code written
/// against `Database<B>` compiles for any backend and monomorphizes to direct
/// calls on the concrete connection.
///
/// ```rust
/// # #[cfg(feature = "sqlite")] {
/// use sql_access::prelude::*;
///
/// let mut db = SqliteDb::new();
/// db.open(":memory:")?;
/// db.exec_dml("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")?;
/// db.exec_dml("INSERT INTO t VALUES (1, 'Alice')")?;
/// assert_eq!(db.exec_scalar("SELECT COUNT(*) FROM t", -1)?, 1);
/// assert!(db.table_exists("t"));
/// # }
/// # Ok::<(), sql_access::DbError>(())
/// ```
pub struct Database<B: Backend> {
    conn: B::Connection,
}

impl<B: Backend> Database<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            conn: B::Connection::default(),
        }
    }

    /// Wrap an already configured connection.
    #[must_use]
    pub fn from_connection(conn: B::Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        B::NAME
    }

    /// # Errors
    ///
    /// See [`Connection::open`].
    pub fn open(&mut self, locator: &str) -> DbResult<()> {
        self.conn.open(locator)
    }

    pub fn close(&mut self) {
        self.conn.close();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_open()
    }

    /// # Errors
    ///
    /// See [`Connection::exec_dml`].
    pub fn exec_dml(&self, sql: &str) -> DbResult<u64> {
        self.conn.exec_dml(sql)
    }

    /// # Errors
    ///
    /// See [`Connection::exec_scalar`].
    pub fn exec_scalar(&self, sql: &str, null_default: i32) -> DbResult<i32> {
        self.conn.exec_scalar(sql, null_default)
    }

    /// # Errors
    ///
    /// See [`Connection::exec_query`].
    pub fn exec_query(&self, sql: &str) -> DbResult<CursorOf<'_, B::Connection>> {
        self.conn.exec_query(sql)
    }

    /// # Errors
    ///
    /// See [`Connection::get_result_set`].
    pub fn get_result_set(&self, sql: &str) -> DbResult<ResultSetOf<B::Connection>> {
        self.conn.get_result_set(sql)
    }

    /// # Errors
    ///
    /// See [`Connection::compile_statement`].
    pub fn compile_statement(&self, sql: &str) -> DbResult<StatementOf<'_, B::Connection>> {
        self.conn.compile_statement(sql)
    }

    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        self.conn.table_exists(name)
    }

    /// # Errors
    ///
    /// See [`Connection::begin_transaction`].
    pub fn begin_transaction(&self) -> DbResult<()> {
        self.conn.begin_transaction()
    }

    /// # Errors
    ///
    /// See [`Connection::commit`].
    pub fn commit(&self) -> DbResult<()> {
        self.conn.commit()
    }

    /// # Errors
    ///
    /// See [`Connection::rollback`].
    pub fn rollback(&self) -> DbResult<()> {
        self.conn.rollback()
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.conn.in_transaction()
    }

    /// # Errors
    ///
    /// See [`Connection::set_busy_timeout`].
    pub fn set_busy_timeout(&self, timeout: Duration) -> DbResult<()> {
        self.conn.set_busy_timeout(timeout)
    }

    /// The backend connection, for engine-specific calls.
    #[must_use]
    pub fn inner(&self) -> &B::Connection {
        &self.conn
    }

    pub fn inner_mut(&mut self) -> &mut B::Connection {
        &mut self.conn
    }

    #[must_use]
    pub fn into_inner(self) -> B::Connection {
        self.conn
    }
}

impl<B: Backend> Default for Database<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for Database<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("backend", &B::NAME)
            .field("open", &self.conn.is_open())
            .finish()
    }
}

/// Facade over the bundled SQLite engine.
#[cfg(feature = "sqlite")]
pub type SqliteDb = Database<crate::sqlite::SqliteBackend>;

/// Facade over a MySQL or MariaDB server.
#[cfg(feature = "mysql")]
pub type MysqlDb = Database<crate::mysql::MysqlBackend>;
