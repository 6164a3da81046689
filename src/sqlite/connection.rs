use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::backend::Connection;
use crate::error::{DbError, DbResult, ErrorKind, require_text};

use super::SqliteBackend;
use super::config::SqliteOptions;
use super::cursor::SqliteCursor;
use super::prepared::SqliteStatement;
use super::query::build_row_table;
use super::result_set::SqliteResultSet;

const TABLE_EXISTS_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";

/// A single `rusqlite` connection, or none while closed.
#[derive(Default)]
pub struct SqliteConnection {
    conn: Option<rusqlite::Connection>,
    path: Option<String>,
}

impl SqliteConnection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open with explicit options, closing any current session first.
    ///
    /// # Errors
    ///
    /// `NullArgument` for a blank path; `NotOpen` when `SQLite` cannot open the
    /// file or apply the busy timeout.
    pub fn open_with(&mut self, options: &SqliteOptions) -> DbResult<()> {
        require_text(&options.path, "database path")?;
        self.close();

        let conn = rusqlite::Connection::open_with_flags(&options.path, options.open_flags())
            .map_err(|e| DbError::from(e).with_kind(ErrorKind::NotOpen))?;
        if let Some(timeout) = options.busy_timeout {
            conn.busy_timeout(timeout)
                .map_err(|e| DbError::from(e).with_kind(ErrorKind::NotOpen))?;
        }

        debug!(path = %options.path, read_only = options.read_only, "sqlite connection opened");
        self.conn = Some(conn);
        self.path = Some(options.path.clone());
        Ok(())
    }

    /// The underlying `rusqlite` connection while open.
    #[must_use]
    pub fn handle(&self) -> Option<&rusqlite::Connection> {
        self.conn.as_ref()
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn conn(&self) -> DbResult<&rusqlite::Connection> {
        self.conn.as_ref().ok_or_else(DbError::not_open)
    }

    fn prepare(&self, sql: &str) -> DbResult<rusqlite::Statement<'_>> {
        let conn = self.conn()?;
        require_text(sql, "sql")?;
        trace!(sql, "sqlite prepare");
        Ok(conn.prepare(sql)?)
    }
}

impl Connection for SqliteConnection {
    type Backend = SqliteBackend;

    fn open(&mut self, locator: &str) -> DbResult<()> {
        self.open_with(&SqliteOptions::new(locator))
    }

    fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if let Err((_conn, err)) = conn.close() {
            // the returned handle is closed again when dropped
            warn!(error = %err, "sqlite close reported an error");
        }
        debug!(path = self.path.as_deref().unwrap_or_default(), "sqlite connection closed");
        self.path = None;
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn exec_dml(&self, sql: &str) -> DbResult<u64> {
        let conn = self.conn()?;
        require_text(sql, "sql")?;
        trace!(sql, "sqlite exec_dml");
        conn.execute_batch(sql)?;
        Ok(conn.changes())
    }

    fn exec_query(&self, sql: &str) -> DbResult<SqliteCursor<'_>> {
        SqliteCursor::open(self.prepare(sql)?)
    }

    fn get_result_set(&self, sql: &str) -> DbResult<SqliteResultSet> {
        let mut stmt = self.prepare(sql)?;
        Ok(SqliteResultSet::new(build_row_table(&mut stmt)?))
    }

    fn compile_statement(&self, sql: &str) -> DbResult<SqliteStatement<'_>> {
        Ok(SqliteStatement::new(self.prepare(sql)?, sql))
    }

    fn table_exists(&self, name: &str) -> bool {
        let Ok(conn) = self.conn() else {
            return false;
        };
        if name.trim().is_empty() {
            return false;
        }
        match conn.query_row(TABLE_EXISTS_SQL, [name], |row| row.get::<_, i64>(0)) {
            Ok(count) => count > 0,
            Err(err) => {
                trace!(error = %err, table = name, "sqlite table_exists failed");
                false
            }
        }
    }

    fn begin_transaction(&self) -> DbResult<()> {
        self.exec_dml("BEGIN TRANSACTION").map(drop)
    }

    fn commit(&self) -> DbResult<()> {
        self.exec_dml("COMMIT TRANSACTION").map(drop)
    }

    fn rollback(&self) -> DbResult<()> {
        self.exec_dml("ROLLBACK").map(drop)
    }

    fn in_transaction(&self) -> bool {
        self.conn
            .as_ref()
            .is_some_and(|conn| !conn.is_autocommit())
    }

    fn set_busy_timeout(&self, timeout: Duration) -> DbResult<()> {
        Ok(self.conn()?.busy_timeout(timeout)?)
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .field("open", &self.conn.is_some())
            .finish()
    }
}
