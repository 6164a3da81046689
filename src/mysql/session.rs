use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::BoxStream;

use sqlx::mysql::{MySqlConnection, MySqlRow, MySqlStatement};
use sqlx::{Connection as _, Executor as _, Statement as _};
use tokio::runtime::{Builder, Runtime};
use tracing::{trace, warn};

use crate::error::{DbError, DbResult, ErrorKind};

use super::config::MysqlOptions;
use super::params::ParamSlots;

const TABLE_EXISTS_SQL: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = DATABASE() AND table_name = ?";

/// A live server session and the runtime that drives it.
///
/// Every call blocks on the session's own current-thread runtime, so the
/// public API stays synchronous and no process-wide runtime is shared.
pub(crate) struct MysqlSession {
    // dropped before the runtime that owns its socket
    conn: MySqlConnection,
    runtime: Arc<Runtime>,
    pub(crate) in_transaction: bool,
}

impl MysqlSession {
    pub(crate) fn connect(options: &MysqlOptions) -> DbResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|e| DbError::new(ErrorKind::NotOpen, format!("mysql runtime: {e}")))?;

        let connect_options = options.connect_options();
        let conn = runtime
            .block_on(MySqlConnection::connect_with(&connect_options))
            .map_err(|e| DbError::from(e).with_kind(ErrorKind::NotOpen))?;

        let mut session = Self {
            conn,
            runtime: Arc::new(runtime),
            in_transaction: false,
        };
        if let Some(timeout) = options.busy_timeout {
            // a session that cannot take its lock timeout is closed again
            if let Err(err) = session.set_lock_wait_timeout(timeout) {
                session.close();
                return Err(err.with_kind(ErrorKind::NotOpen));
            }
        }
        Ok(session)
    }

    /// Run one or more statements over the text protocol.
    pub(crate) fn execute(&mut self, sql: &str) -> DbResult<u64> {
        trace!(sql, "mysql execute");
        let Self { conn, runtime, .. } = self;
        let result = runtime.block_on(sqlx::raw_sql(sql).execute(&mut *conn))?;
        Ok(result.rows_affected())
    }

    pub(crate) fn prepare(&mut self, sql: &str) -> DbResult<MySqlStatement<'static>> {
        trace!(sql, "mysql prepare");
        let Self { conn, runtime, .. } = self;
        let stmt = runtime.block_on((&mut *conn).prepare(sql))?;
        Ok(sqlx::Statement::to_owned(&stmt))
    }

    pub(crate) fn execute_prepared(
        &mut self,
        stmt: &MySqlStatement<'_>,
        params: &ParamSlots,
    ) -> DbResult<u64> {
        trace!(sql = stmt.sql(), "mysql execute prepared");
        let Self { conn, runtime, .. } = self;
        let query = params.bind_all(stmt.query());
        let result = runtime.block_on(query.execute(&mut *conn))?;
        Ok(result.rows_affected())
    }

    pub(crate) fn fetch_prepared(
        &mut self,
        stmt: &MySqlStatement<'_>,
        params: &ParamSlots,
    ) -> DbResult<Vec<MySqlRow>> {
        trace!(sql = stmt.sql(), "mysql fetch prepared");
        let Self { conn, runtime, .. } = self;
        let query = params.bind_all(stmt.query());
        Ok(runtime.block_on(query.fetch_all(&mut *conn))?)
    }

    /// Start a prepared query whose rows are pulled on demand.
    ///
    /// The stream holds the connection until it is dropped; poll it on
    /// [`MysqlSession::runtime`].
    pub(crate) fn stream_prepared<'s>(
        &'s mut self,
        stmt: &'s MySqlStatement<'_>,
        params: &'s ParamSlots,
    ) -> BoxStream<'s, Result<MySqlRow, sqlx::Error>> {
        trace!(sql = stmt.sql(), "mysql stream prepared");
        params.bind_all(stmt.query()).fetch(&mut self.conn)
    }

    pub(crate) fn runtime(&self) -> Arc<Runtime> {
        Arc::clone(&self.runtime)
    }

    pub(crate) fn table_exists(&mut self, name: &str) -> DbResult<bool> {
        let Self { conn, runtime, .. } = self;
        let count: i64 = runtime.block_on(
            sqlx::query_scalar(TABLE_EXISTS_SQL)
                .bind(name)
                .fetch_one(&mut *conn),
        )?;
        Ok(count > 0)
    }

    /// Bound row-lock waits, in whole seconds rounded up (server minimum 1).
    pub(crate) fn set_lock_wait_timeout(&mut self, timeout: Duration) -> DbResult<()> {
        let secs = (timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)).max(1);
        self.execute(&format!("SET SESSION innodb_lock_wait_timeout = {secs}"))
            .map(drop)
    }

    pub(crate) fn ping(&mut self) -> DbResult<()> {
        let Self { conn, runtime, .. } = self;
        Ok(runtime.block_on(conn.ping())?)
    }

    pub(crate) fn close(self) {
        let Self { conn, runtime, .. } = self;
        if let Err(err) = runtime.block_on(conn.close()) {
            warn!(error = %err, "mysql close reported an error");
        }
    }
}
