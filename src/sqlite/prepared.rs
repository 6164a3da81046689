use std::fmt;

use rusqlite::Statement as RawStatement;
use rusqlite::types::Null;
use tracing::{trace, warn};

use crate::backend::Statement;
use crate::error::{DbError, DbResult};
use crate::types::Param;

use super::cursor::SqliteCursor;

/// A compiled `SQLite` statement borrowed from its connection.
///
/// `rusqlite` copies text and blob parameters when they are bound, so no
/// per-slot storage is kept here.
#[derive(Default)]
pub struct SqliteStatement<'conn> {
    stmt: Option<RawStatement<'conn>>,
    sql: String,
}

impl<'conn> SqliteStatement<'conn> {
    pub(crate) fn new(stmt: RawStatement<'conn>, sql: &str) -> Self {
        Self {
            stmt: Some(stmt),
            sql: sql.to_owned(),
        }
    }

    fn handle(&mut self) -> DbResult<&mut RawStatement<'conn>> {
        self.stmt.as_mut().ok_or_else(DbError::statement_not_initialized)
    }
}

impl<'conn> Statement for SqliteStatement<'conn> {
    type Cursor = SqliteCursor<'conn>;

    fn bind_param(&mut self, position: usize, value: Param<'_>) -> DbResult<()> {
        let stmt = self.handle()?;
        let count = stmt.parameter_count();
        if position == 0 || position > count {
            return Err(DbError::param_out_of_range(position, count));
        }
        match value {
            Param::Null => stmt.raw_bind_parameter(position, Null)?,
            Param::Int(v) => stmt.raw_bind_parameter(position, v)?,
            Param::Int64(v) => stmt.raw_bind_parameter(position, v)?,
            Param::Double(v) => stmt.raw_bind_parameter(position, v)?,
            Param::Text(v) => stmt.raw_bind_parameter(position, v)?,
            Param::Blob(v) => stmt.raw_bind_parameter(position, v)?,
        }
        Ok(())
    }

    fn exec_dml(&mut self) -> DbResult<u64> {
        let stmt = self
            .stmt
            .as_mut()
            .ok_or_else(DbError::statement_not_initialized)?;
        trace!(sql = %self.sql, "sqlite statement exec_dml");
        let affected = stmt.raw_execute()?;
        Ok(u64::try_from(affected).unwrap_or(u64::MAX))
    }

    fn exec_query(&mut self) -> DbResult<SqliteCursor<'conn>> {
        let stmt = self
            .stmt
            .take()
            .ok_or_else(DbError::statement_not_initialized)?;
        trace!(sql = %self.sql, "sqlite statement exec_query");
        match SqliteCursor::execute(stmt) {
            Ok(cursor) => Ok(cursor),
            Err((stmt, err)) => {
                self.stmt = Some(stmt);
                Err(err)
            }
        }
    }

    fn reset(&mut self) -> DbResult<()> {
        let stmt = self.handle()?;
        for position in 1..=stmt.parameter_count() {
            stmt.raw_bind_parameter(position, Null)?;
        }
        Ok(())
    }

    fn finalize(&mut self) {
        if let Some(stmt) = self.stmt.take()
            && let Err(err) = stmt.finalize()
        {
            warn!(error = %err, sql = %self.sql, "sqlite statement finalize failed");
        }
    }

    fn is_valid(&self) -> bool {
        self.stmt.is_some()
    }

    fn param_count(&self) -> usize {
        self.stmt.as_ref().map_or(0, RawStatement::parameter_count)
    }

    fn sql(&self) -> Option<&str> {
        self.stmt.as_ref().map(|_| self.sql.as_str())
    }
}

impl fmt::Debug for SqliteStatement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("sql", &self.sql)
            .field("valid", &self.stmt.is_some())
            .finish()
    }
}
