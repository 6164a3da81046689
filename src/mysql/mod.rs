// MySQL / MariaDB backend built on sqlx
//
// Each connection drives its own current-thread tokio runtime and blocks on
// it, so callers see the same synchronous API as the SQLite backend.

pub mod config;
pub mod connection;
pub mod cursor;
pub mod params;
pub mod prepared;
mod query;
pub mod result_set;
mod session;
mod stream;

use crate::backend::Backend;

pub use config::{MysqlOptions, MysqlOptionsBuilder};
pub use connection::MysqlConnection;
pub use cursor::MysqlCursor;
pub use params::{BoundParam, ParamSlots};
pub use prepared::MysqlStatement;
pub use result_set::MysqlResultSet;

/// Type-level marker binding the MySQL handle types together.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlBackend;

impl Backend for MysqlBackend {
    type Connection = MysqlConnection;
    type Cursor<'c> = MysqlCursor<'c>;
    type ResultSet = MysqlResultSet;
    type Statement<'c> = MysqlStatement<'c>;

    const NAME: &'static str = "mysql";
}
