use std::fmt;
use std::sync::Arc;

use sqlx::mysql::MySqlStatement;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::Cursor;
use crate::error::{DbError, DbResult};
use crate::results::{CurrentRow, Fields};
use crate::types::Value;

use super::connection::MysqlConnection;
use super::params::ParamSlots;
use super::query::{ColumnKind, ColumnLayout, decode_row};
use super::stream::RowStream;

/// Forward-only cursor over a MySQL query.
///
/// Rows are pulled from the server one [`Cursor::next_row`] at a time. While
/// rows remain the cursor holds its connection, and other calls on that
/// connection report `Busy`; reaching the end of the result, or a failed
/// read, lets go of it.
#[derive(Default)]
pub struct MysqlCursor<'conn> {
    stream: Option<RowStream<'conn>>,
    runtime: Option<Arc<Runtime>>,
    // statement parked here once its stream is done
    stmt: Option<MySqlStatement<'static>>,
    kinds: Vec<ColumnKind>,
    current: CurrentRow,
}

impl<'conn> MysqlCursor<'conn> {
    /// Execute `stmt` with `slots` and step onto the first row.
    ///
    /// When execution or that first read fails the statement and its
    /// parameters come back with the error.
    pub(crate) fn execute(
        conn: &'conn MysqlConnection,
        stmt: MySqlStatement<'static>,
        slots: ParamSlots,
    ) -> Result<Self, (MySqlStatement<'static>, ParamSlots, DbError)> {
        let session = match conn.lock_session() {
            Ok(session) => session,
            Err(err) => return Err((stmt, slots, err)),
        };
        let runtime = session.runtime();
        let ColumnLayout { names, kinds } = ColumnLayout::of(&stmt);

        let mut stream = RowStream::start(session, stmt, slots);
        let first = match stream
            .step(&runtime)
            .and_then(|row| row.map(|row| decode_row(&row, &kinds)).transpose())
        {
            Ok(first) => first,
            Err(err) => {
                let (stmt, slots) = stream.into_parts();
                return Err((stmt, slots, err));
            }
        };

        let mut cursor = Self {
            stream: Some(stream),
            runtime: Some(runtime),
            stmt: None,
            kinds,
            current: CurrentRow::new(names, first),
        };
        if cursor.current.eof() {
            cursor.release();
        }
        Ok(cursor)
    }

    fn fetch_next(&mut self) -> DbResult<Option<Vec<Value>>> {
        let (Some(stream), Some(runtime)) = (self.stream.as_mut(), self.runtime.as_deref()) else {
            return Ok(None);
        };
        match stream.step(runtime)? {
            Some(row) => decode_row(&row, &self.kinds).map(Some),
            None => Ok(None),
        }
    }

    /// Drop the row stream and with it the hold on the connection.
    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            let (stmt, _slots) = stream.into_parts();
            self.stmt = Some(stmt);
        }
        self.runtime = None;
    }
}

impl Fields for MysqlCursor<'_> {
    fn num_fields(&self) -> usize {
        self.current.columns().len()
    }

    fn field_name(&self, col: usize) -> Option<&str> {
        self.current.columns().name(col)
    }

    fn value(&self, col: usize) -> Option<&Value> {
        self.current.value(col)
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.current.columns().position(name)
    }
}

impl Cursor for MysqlCursor<'_> {
    fn eof(&self) -> bool {
        self.current.eof()
    }

    fn next_row(&mut self) {
        if self.current.eof() {
            return;
        }
        let next = self.fetch_next().unwrap_or_else(|err| {
            debug!(error = %err, "mysql cursor read failed, ending stream");
            None
        });
        if next.is_none() {
            self.release();
        }
        self.current.set(next);
    }

    fn finalize(&mut self) {
        self.stream = None;
        self.runtime = None;
        self.stmt = None;
        self.kinds.clear();
        self.current.clear();
    }

    fn is_valid(&self) -> bool {
        self.stream.is_some() || self.stmt.is_some()
    }
}

impl fmt::Debug for MysqlCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlCursor")
            .field("valid", &self.is_valid())
            .field("streaming", &self.stream.is_some())
            .field("eof", &self.current.eof())
            .field("columns", &self.current.columns().as_slice())
            .finish()
    }
}
