// ouroboros expands to unsafe code for the session/rows self-borrow
#![allow(unsafe_code)]

use std::cell::RefMut;

use futures_util::TryStreamExt as _;
use futures_util::stream::BoxStream;
use ouroboros::self_referencing;
use sqlx::mysql::{MySqlRow, MySqlStatement};
use tokio::runtime::Runtime;

use crate::error::DbResult;

use super::params::ParamSlots;
use super::session::MysqlSession;

/// An executing prepared query. Holds the session borrow, the statement and
/// its parameters for as long as rows are being pulled.
#[self_referencing]
pub(crate) struct RowStream<'conn> {
    session: RefMut<'conn, MysqlSession>,
    stmt: MySqlStatement<'static>,
    slots: ParamSlots,
    #[borrows(mut session, stmt, slots)]
    #[not_covariant]
    rows: BoxStream<'this, Result<MySqlRow, sqlx::Error>>,
}

impl<'conn> RowStream<'conn> {
    pub(crate) fn start(
        session: RefMut<'conn, MysqlSession>,
        stmt: MySqlStatement<'static>,
        slots: ParamSlots,
    ) -> Self {
        RowStream::new(session, stmt, slots, |session, stmt, slots| {
            session.stream_prepared(stmt, slots)
        })
    }

    /// Block on the next row. `None` once the result is exhausted.
    pub(crate) fn step(&mut self, runtime: &Runtime) -> DbResult<Option<MySqlRow>> {
        Ok(self.with_rows_mut(|rows| runtime.block_on(rows.try_next()))?)
    }

    /// Release the session and return the statement and its parameters.
    pub(crate) fn into_parts(self) -> (MySqlStatement<'static>, ParamSlots) {
        let heads = self.into_heads();
        (heads.stmt, heads.slots)
    }
}
