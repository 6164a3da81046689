use std::fmt;

use sqlx::Either;
use sqlx::Statement as _;
use sqlx::mysql::MySqlStatement;

use crate::backend::Statement;
use crate::error::{DbError, DbResult};
use crate::types::Param;

use super::connection::MysqlConnection;
use super::cursor::MysqlCursor;
use super::params::ParamSlots;

/// A server-side prepared statement plus one owned cell per parameter.
///
/// Bound values live in [`ParamSlots`] until the statement executes; the
/// slots are sized from the server's parameter count when the statement is
/// compiled.
#[derive(Default)]
pub struct MysqlStatement<'conn> {
    conn: Option<&'conn MysqlConnection>,
    stmt: Option<MySqlStatement<'static>>,
    slots: ParamSlots,
}

impl<'conn> MysqlStatement<'conn> {
    pub(crate) fn new(conn: &'conn MysqlConnection, stmt: MySqlStatement<'static>) -> Self {
        let count = match stmt.parameters() {
            Some(Either::Left(types)) => types.len(),
            Some(Either::Right(count)) => count,
            None => 0,
        };
        Self {
            conn: Some(conn),
            stmt: Some(stmt),
            slots: ParamSlots::new(count),
        }
    }

    /// The parameter cells as currently bound.
    #[must_use]
    pub fn slots(&self) -> &ParamSlots {
        &self.slots
    }

    fn handles(&self) -> DbResult<(&'conn MysqlConnection, &MySqlStatement<'static>)> {
        match (self.conn, self.stmt.as_ref()) {
            (Some(conn), Some(stmt)) => Ok((conn, stmt)),
            _ => Err(DbError::statement_not_initialized()),
        }
    }
}

impl<'conn> Statement for MysqlStatement<'conn> {
    type Cursor = MysqlCursor<'conn>;

    fn bind_param(&mut self, position: usize, value: Param<'_>) -> DbResult<()> {
        if self.stmt.is_none() {
            return Err(DbError::statement_not_initialized());
        }
        self.slots.set(position, value)
    }

    fn exec_dml(&mut self) -> DbResult<u64> {
        let (conn, stmt) = self.handles()?;
        conn.with_session(|session| session.execute_prepared(stmt, &self.slots))
    }

    fn exec_query(&mut self) -> DbResult<MysqlCursor<'conn>> {
        let conn = self.handles()?.0;
        let stmt = self
            .stmt
            .take()
            .ok_or_else(DbError::statement_not_initialized)?;
        let slots = std::mem::take(&mut self.slots);
        match MysqlCursor::execute(conn, stmt, slots) {
            Ok(cursor) => {
                self.conn = None;
                Ok(cursor)
            }
            Err((stmt, slots, err)) => {
                self.stmt = Some(stmt);
                self.slots = slots;
                Err(err)
            }
        }
    }

    fn reset(&mut self) -> DbResult<()> {
        if self.stmt.is_none() {
            return Err(DbError::statement_not_initialized());
        }
        self.slots.clear();
        Ok(())
    }

    fn finalize(&mut self) {
        self.stmt = None;
        self.conn = None;
        self.slots = ParamSlots::default();
    }

    fn is_valid(&self) -> bool {
        self.stmt.is_some()
    }

    fn param_count(&self) -> usize {
        if self.stmt.is_some() { self.slots.len() } else { 0 }
    }

    fn sql(&self) -> Option<&str> {
        self.stmt.as_ref().map(|stmt| stmt.sql())
    }
}

impl fmt::Debug for MysqlStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlStatement")
            .field("sql", &self.sql())
            .field("valid", &self.stmt.is_some())
            .field("params", &self.slots.len())
            .finish()
    }
}
