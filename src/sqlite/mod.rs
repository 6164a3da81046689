// SQLite backend built on rusqlite
//
// - config: open options and their builder
// - connection: session handle and statement-less execution
// - prepared: compiled statements with positional binding
// - cursor / result_set: forward and random-access row views
// - query: row extraction shared by the above
// - stream: a statement paired with the rows stepping it

pub mod config;
pub mod connection;
pub mod cursor;
pub mod prepared;
mod query;
mod stream;
pub mod result_set;

use crate::backend::Backend;

pub use config::{MEMORY_PATH, SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use cursor::SqliteCursor;
pub use prepared::SqliteStatement;
pub use result_set::SqliteResultSet;

/// Type-level marker binding the `SQLite` handle types together.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    type Connection = SqliteConnection;
    type Cursor<'c> = SqliteCursor<'c>;
    type ResultSet = SqliteResultSet;
    type Statement<'c> = SqliteStatement<'c>;

    const NAME: &'static str = "sqlite";
}
