//! Move-only database handles over `SQLite` and MySQL/MariaDB.
//!
//! Every engine exposes the same four handle types: a [`Connection`], a
//! forward-only [`Cursor`], a materialized [`ResultSet`] and a prepared
//! [`Statement`]. A [`Backend`] ties them together at compile time and
//! [`Database`] is the generic facade over any backend.
//!
//! Fallible calls return [`DbResult`]. NULL fields are not errors: the typed
//! getters on [`Fields`] return the caller's default instead.
//!
//! ```rust
//! # #[cfg(feature = "sqlite")] {
//! use sql_access::prelude::*;
//!
//! let mut db = SqliteDb::new();
//! db.open(":memory:")?;
//! db.exec_dml("CREATE TABLE people (id INTEGER, name TEXT)")?;
//!
//! let mut insert = db.compile_statement("INSERT INTO people VALUES (?, ?)")?;
//! insert.bind(1, 1)?;
//! insert.bind(2, "Alice")?;
//! insert.exec_dml()?;
//! insert.reset()?;
//! insert.bind(1, 2)?;
//! insert.exec_dml()?;
//! drop(insert);
//!
//! let mut cursor = db.exec_query("SELECT id, name FROM people ORDER BY id")?;
//! assert_eq!(cursor.get_string("name", "?"), "Alice");
//! cursor.next_row();
//! assert!(cursor.field_is_null("name"));
//! assert_eq!(cursor.get_string("name", "nobody"), "nobody");
//! # }
//! # Ok::<(), sql_access::DbError>(())
//! ```

pub mod backend;
pub mod database;
pub mod error;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::{Backend, Connection, Cursor, ResultSet, Statement};
pub use database::Database;
pub use error::{DbError, DbResult, ErrorKind, MAX_MESSAGE_LEN};
pub use results::{ColumnIndex, ColumnNames, Fields};
pub use types::{Param, Value, ValueType};

#[cfg(feature = "mysql")]
pub use database::MysqlDb;
#[cfg(feature = "sqlite")]
pub use database::SqliteDb;
