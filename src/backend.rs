use std::fmt;
use std::time::Duration;

use crate::error::DbResult;
use crate::results::Fields;
use crate::types::Param;

/// Compile-time binding of the four handle types that make up one engine.
///
/// Code written against `B: Backend` (usually through [`crate::Database`])
/// runs on any engine without dynamic dispatch:
/// ```rust
/// use sql_access::prelude::*;
///
/// fn count_rows<B: Backend>(db: &Database<B>, table: &str) -> DbResult<i32> {
///     db.exec_scalar(&format!("SELECT COUNT(*) FROM {table}"), 0)
/// }
/// ```
pub trait Backend: Sized + 'static {
    type Connection: Connection<Backend = Self>;
    /// Forward-only cursor; may borrow the connection that produced it.
    type Cursor<'c>: Cursor;
    type ResultSet: ResultSet;
    type Statement<'c>: Statement<Cursor = Self::Cursor<'c>>;

    /// Short engine name used in logs.
    const NAME: &'static str;
}

pub type CursorOf<'c, C> = <<C as Connection>::Backend as Backend>::Cursor<'c>;
pub type ResultSetOf<C> = <<C as Connection>::Backend as Backend>::ResultSet;
pub type StatementOf<'c, C> = <<C as Connection>::Backend as Backend>::Statement<'c>;

/// A session with one database engine.
///
/// A connection starts closed (`Default`). `open` replaces any session it
/// already holds. Statements and cursors borrow the connection, so the
/// borrow checker rejects `close` while any of them is alive.
pub trait Connection: fmt::Debug + Default {
    type Backend: Backend<Connection = Self>;

    /// Open a session described by `locator` (a file path for SQLite, a
    /// `host:port:user:password:database` string for MySQL).
    ///
    /// # Errors
    ///
    /// `NullArgument` for a blank locator, `NotOpen` if the engine refuses the
    /// connection. A failed open leaves the connection closed.
    fn open(&mut self, locator: &str) -> DbResult<()>;

    /// Release the session. Safe to call on a closed connection.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Run a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// `NotOpen` without a session, `NullArgument` for blank SQL, otherwise
    /// the classified engine error.
    fn exec_dml(&self, sql: &str) -> DbResult<u64>;

    /// First column of the first row as an integer.
    ///
    /// Returns `null_default` when that field is NULL or the query yields no
    /// rows.
    ///
    /// # Errors
    ///
    /// Same as [`Connection::exec_query`].
    fn exec_scalar(&self, sql: &str, null_default: i32) -> DbResult<i32> {
        let cursor = self.exec_query(sql)?;
        if cursor.eof() {
            return Ok(null_default);
        }
        Ok(cursor.get_int(0, null_default))
    }

    /// Run a query and return a cursor on its first row (or at end of stream
    /// for an empty result).
    ///
    /// # Errors
    ///
    /// `NotOpen`, `NullArgument`, or the engine's compile/execute error.
    fn exec_query(&self, sql: &str) -> DbResult<CursorOf<'_, Self>>;

    /// Run a query and materialize every row.
    ///
    /// # Errors
    ///
    /// `NotOpen`, `NullArgument`, or the engine's compile/execute error.
    fn get_result_set(&self, sql: &str) -> DbResult<ResultSetOf<Self>>;

    /// Compile `sql` without running it.
    ///
    /// # Errors
    ///
    /// `NotOpen`, `NullArgument`, or the engine's compile error.
    fn compile_statement(&self, sql: &str) -> DbResult<StatementOf<'_, Self>>;

    /// Whether a table called `name` exists. Any failure reads as `false`.
    fn table_exists(&self, name: &str) -> bool;

    /// # Errors
    ///
    /// `NotOpen`, or the engine's error (for example a nested BEGIN).
    fn begin_transaction(&self) -> DbResult<()>;

    /// # Errors
    ///
    /// `NotOpen`, or the engine's error (for example no open transaction).
    fn commit(&self) -> DbResult<()>;

    /// # Errors
    ///
    /// `NotOpen`, or the engine's error.
    fn rollback(&self) -> DbResult<()>;

    fn in_transaction(&self) -> bool;

    /// Bound how long the engine waits on a lock before failing with `Busy`.
    ///
    /// # Errors
    ///
    /// `NotOpen`, or the engine's error.
    fn set_busy_timeout(&self, timeout: Duration) -> DbResult<()>;
}

/// Forward-only view over a query's rows.
///
/// A cursor is created positioned on the first row, or already at end of
/// stream. Rows are read one step at a time. Field accessors read the
/// current row; at end of stream every field reads as NULL.
pub trait Cursor: Fields + fmt::Debug + Default {
    fn eof(&self) -> bool;

    /// Advance to the next row, or to end of stream after the last one.
    /// A row that fails to read also ends the stream.
    fn next_row(&mut self);

    /// Release the statement handle and forget the columns. The cursor stays
    /// at end of stream.
    fn finalize(&mut self);

    /// Whether the cursor still holds a statement handle.
    fn is_valid(&self) -> bool;
}

/// A fully fetched, randomly addressable table of rows.
pub trait ResultSet: Fields + fmt::Debug + Default {
    fn num_rows(&self) -> usize;

    /// True once the current row is past the last row.
    fn eof(&self) -> bool;

    fn next_row(&mut self);

    /// Move to `row`, clamped to the last row. Does nothing on an empty set.
    fn seek_row(&mut self, row: usize);

    fn current_row(&self) -> usize;

    /// Drop every row and zero the counts.
    fn finalize(&mut self);
}

/// A compiled statement with 1-based positional parameters.
pub trait Statement: fmt::Debug + Default {
    type Cursor: Cursor;

    /// Bind `value` to parameter `position` (1-based).
    ///
    /// # Errors
    ///
    /// `Misuse` on an empty statement, `OutOfRange` when `position` is 0 or
    /// past [`Statement::param_count`]. A failed bind changes nothing.
    fn bind_param(&mut self, position: usize, value: Param<'_>) -> DbResult<()>;

    /// # Errors
    ///
    /// Same as [`Statement::bind_param`].
    fn bind<'v>(&mut self, position: usize, value: impl Into<Param<'v>>) -> DbResult<()> {
        self.bind_param(position, value.into())
    }

    /// # Errors
    ///
    /// Same as [`Statement::bind_param`].
    fn bind_null(&mut self, position: usize) -> DbResult<()> {
        self.bind_param(position, Param::Null)
    }

    /// Execute with the current bindings and return the affected-row count.
    /// The statement stays valid and keeps its bindings.
    ///
    /// # Errors
    ///
    /// `Misuse` on an empty statement, otherwise the engine's error.
    fn exec_dml(&mut self) -> DbResult<u64>;

    /// Execute as a query. On success the compiled handle moves into the
    /// returned cursor and this statement becomes empty.
    ///
    /// # Errors
    ///
    /// `Misuse` on an empty statement, otherwise the engine's error; the
    /// statement keeps its handle when execution fails.
    fn exec_query(&mut self) -> DbResult<Self::Cursor>;

    /// Clear all bindings, keeping the compiled handle.
    ///
    /// # Errors
    ///
    /// `Misuse` on an empty statement.
    fn reset(&mut self) -> DbResult<()>;

    /// Release the compiled handle. Idempotent.
    fn finalize(&mut self);

    fn is_valid(&self) -> bool;

    /// Number of parameters the statement declares, 0 when empty.
    fn param_count(&self) -> usize;

    /// SQL text the statement was compiled from.
    fn sql(&self) -> Option<&str>;
}
