use std::fmt;

use rusqlite::Statement;
use tracing::{debug, warn};

use crate::backend::Cursor;
use crate::error::{DbError, DbResult};
use crate::results::{CurrentRow, Fields};
use crate::types::Value;

use super::query::column_names;
use super::stream::RowStream;

/// Forward-only cursor over a `SQLite` query.
///
/// Owns the statement it was produced from and steps it one row per
/// [`Cursor::next_row`]. A step that fails ends the stream.
#[derive(Default)]
pub struct SqliteCursor<'conn> {
    stream: Option<RowStream<'conn>>,
    current: CurrentRow,
}

impl<'conn> SqliteCursor<'conn> {
    /// Execute `stmt` with its current bindings, step onto the first row and
    /// take ownership of the statement.
    ///
    /// When that first step fails the statement is handed back alongside
    /// the error.
    pub(crate) fn execute(stmt: Statement<'conn>) -> Result<Self, (Statement<'conn>, DbError)> {
        let columns = column_names(&stmt);
        let mut stream = RowStream::start(stmt);
        match stream.step(columns.len()) {
            Ok(first) => Ok(Self {
                stream: Some(stream),
                current: CurrentRow::new(columns, first),
            }),
            Err(err) => Err((stream.into_statement(), err)),
        }
    }

    /// Execute a freshly prepared statement, dropping it on failure.
    pub(crate) fn open(stmt: Statement<'conn>) -> DbResult<Self> {
        Self::execute(stmt).map_err(|(_, err)| err)
    }
}

impl Fields for SqliteCursor<'_> {
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

impl Cursor for SqliteCursor<'_> {
    fn eof(&self) -> bool {
        self.current.eof()
    }

    fn next_row(&mut self) {
        if self.current.eof() {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            self.current.set(None);
            return;
        };
        let next = stream.step(self.current.columns().len()).unwrap_or_else(|err| {
            debug!(error = %err, "sqlite cursor step failed, ending stream");
            None
        });
        self.current.set(next);
    }

    fn finalize(&mut self) {
        self.current.clear();
        if let Some(stream) = self.stream.take()
            && let Err(err) = stream.into_statement().finalize()
        {
            warn!(error = %err, "sqlite cursor finalize failed");
        }
    }

    fn is_valid(&self) -> bool {
        self.stream.is_some()
    }
}

impl fmt::Debug for SqliteCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCursor")
            .field("valid", &self.stream.is_some())
            .field("eof", &self.current.eof())
            .field("columns", &self.current.columns().as_slice())
            .finish()
    }
}
