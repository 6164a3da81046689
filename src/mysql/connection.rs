use std::cell::{RefCell, RefMut};
use std::fmt;
use std::time::Duration;

use sqlx::mysql::{MySqlRow, MySqlStatement};
use tracing::{debug, trace};

use crate::backend::Connection;
use crate::error::{DbError, DbResult, ErrorKind, require_text};

use super::MysqlBackend;
use super::config::MysqlOptions;
use super::cursor::MysqlCursor;
use super::params::ParamSlots;
use super::prepared::MysqlStatement;
use super::query::{ColumnLayout, build_row_table};
use super::result_set::MysqlResultSet;
use super::session::MysqlSession;

/// A MySQL or MariaDB session, or none while closed.
///
/// The session sits in a `RefCell` so shared-reference calls (and the
/// statements that borrow this connection) can drive it. A call made while
/// another one is still running, or while a cursor is still reading rows,
/// reports `Busy`.
#[derive(Default)]
pub struct MysqlConnection {
    session: RefCell<Option<MysqlSession>>,
    target: Option<String>,
}

impl MysqlConnection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect with explicit options, closing any current session first.
    ///
    /// # Errors
    ///
    /// `NullArgument` for a blank host or user; `NotOpen` when the server
    /// refuses the connection or the lock timeout cannot be applied.
    pub fn open_with(&mut self, options: &MysqlOptions) -> DbResult<()> {
        require_text(&options.host, "host")?;
        require_text(&options.user, "user")?;
        self.close();

        let session = MysqlSession::connect(options)?;
        let target = options.to_string();
        debug!(server = %target, charset = %options.charset, "mysql connection opened");
        *self.session.get_mut() = Some(session);
        self.target = Some(target);
        Ok(())
    }

    /// Round-trip to the server to check the session is alive.
    ///
    /// # Errors
    ///
    /// `NotOpen` without a session, otherwise the classified driver error.
    pub fn ping(&self) -> DbResult<()> {
        self.with_session(MysqlSession::ping)
    }

    /// `user@host:port/database` of the open session.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub(crate) fn with_session<T>(
        &self,
        f: impl FnOnce(&mut MysqlSession) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut session = self.lock_session()?;
        f(&mut session)
    }

    /// Hold the session until the guard drops, for a cursor that streams
    /// rows across calls. Other calls report `Busy` meanwhile.
    pub(crate) fn lock_session(&self) -> DbResult<RefMut<'_, MysqlSession>> {
        let guard = self
            .session
            .try_borrow_mut()
            .map_err(|_| DbError::new(ErrorKind::Busy, "connection is already in use"))?;
        RefMut::filter_map(guard, Option::as_mut).map_err(|_| DbError::not_open())
    }

    fn prepare(&self, sql: &str) -> DbResult<MySqlStatement<'static>> {
        self.with_session(|session| {
            require_text(sql, "sql")?;
            session.prepare(sql)
        })
    }

    fn run_query(&self, sql: &str) -> DbResult<(ColumnLayout, Vec<MySqlRow>)> {
        self.with_session(|session| {
            require_text(sql, "sql")?;
            let stmt = session.prepare(sql)?;
            let rows = session.fetch_prepared(&stmt, &ParamSlots::default())?;
            Ok((ColumnLayout::of(&stmt), rows))
        })
    }

    /// The flag is set once BEGIN succeeds and cleared by any COMMIT or ROLLBACK.
    fn transaction_control(&self, sql: &str, in_transaction_after: bool) -> DbResult<()> {
        self.with_session(|session| {
            let result = session.execute(sql).map(drop);
            if result.is_ok() || !in_transaction_after {
                session.in_transaction = in_transaction_after;
            }
            result
        })
    }
}

impl Connection for MysqlConnection {
    type Backend = MysqlBackend;

    fn open(&mut self, locator: &str) -> DbResult<()> {
        let options: MysqlOptions = locator.parse()?;
        self.open_with(&options)
    }

    fn close(&mut self) {
        let Some(session) = self.session.get_mut().take() else {
            return;
        };
        session.close();
        debug!(server = self.target.as_deref().unwrap_or_default(), "mysql connection closed");
        self.target = None;
    }

    fn is_open(&self) -> bool {
        self.session
            .try_borrow()
            .map_or(true, |session| session.is_some())
    }

    fn exec_dml(&self, sql: &str) -> DbResult<u64> {
        self.with_session(|session| {
            require_text(sql, "sql")?;
            session.execute(sql)
        })
    }

    fn exec_query(&self, sql: &str) -> DbResult<MysqlCursor<'_>> {
        let stmt = self.prepare(sql)?;
        MysqlCursor::execute(self, stmt, ParamSlots::default()).map_err(|(_, _, err)| err)
    }

    fn get_result_set(&self, sql: &str) -> DbResult<MysqlResultSet> {
        let (layout, rows) = self.run_query(sql)?;
        Ok(MysqlResultSet::new(build_row_table(&layout, &rows)?))
    }

    fn compile_statement(&self, sql: &str) -> DbResult<MysqlStatement<'_>> {
        let stmt = self.prepare(sql)?;
        Ok(MysqlStatement::new(self, stmt))
    }

    fn table_exists(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        match self.with_session(|session| session.table_exists(name)) {
            Ok(exists) => exists,
            Err(err) => {
                trace!(error = %err, table = name, "mysql table_exists failed");
                false
            }
        }
    }

    fn begin_transaction(&self) -> DbResult<()> {
        self.transaction_control("START TRANSACTION", true)
    }

    fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT", false)
    }

    fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK", false)
    }

    fn in_transaction(&self) -> bool {
        self.session
            .try_borrow()
            .ok()
            .and_then(|session| session.as_ref().map(|s| s.in_transaction))
            .unwrap_or(false)
    }

    fn set_busy_timeout(&self, timeout: Duration) -> DbResult<()> {
        self.with_session(|session| session.set_lock_wait_timeout(timeout))
    }
}

impl Drop for MysqlConnection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for MysqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConnection")
            .field("target", &self.target)
            .field("open", &self.is_open())
            .finish()
    }
}
