// ouroboros expands to unsafe code for the statement/rows self-borrow
#![allow(unsafe_code)]

use ouroboros::self_referencing;
use rusqlite::{Rows, Statement};

use crate::error::DbResult;
use crate::types::Value;

use super::query::read_row;

/// A statement and the row iterator stepping it, kept together so a cursor
/// can pull one row at a time.
#[self_referencing]
pub(crate) struct RowStream<'conn> {
    stmt: Statement<'conn>,
    #[borrows(mut stmt)]
    #[not_covariant]
    rows: Rows<'this>,
}

impl<'conn> RowStream<'conn> {
    /// Start executing `stmt` with its current bindings.
    pub(crate) fn start(stmt: Statement<'conn>) -> Self {
        RowStream::new(stmt, |stmt| stmt.raw_query())
    }

    /// Step once. `None` once the statement is done.
    pub(crate) fn step(&mut self, width: usize) -> DbResult<Option<Vec<Value>>> {
        self.with_rows_mut(|rows| match rows.next()? {
            Some(row) => read_row(row, width).map(Some),
            None => Ok(None),
        })
    }

    /// Stop stepping and hand the statement back.
    pub(crate) fn into_statement(self) -> Statement<'conn> {
        self.into_heads().stmt
    }
}
