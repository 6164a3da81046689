//! Convenient imports for common functionality.
//!
//! Brings the handle traits into scope (their methods are called through
//! them) together with the facade and the value types.

pub use crate::backend::{Backend, Connection, Cursor, ResultSet, Statement};
pub use crate::database::Database;
pub use crate::error::{DbError, DbResult, ErrorKind};
pub use crate::results::{ColumnIndex, Fields};
pub use crate::types::{Param, Value, ValueType};

#[cfg(feature = "sqlite")]
pub use crate::database::SqliteDb;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteBackend, SqliteOptions};

#[cfg(feature = "mysql")]
pub use crate::database::MysqlDb;
#[cfg(feature = "mysql")]
pub use crate::mysql::{MysqlBackend, MysqlOptions};
