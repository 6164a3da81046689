use std::time::Duration;

use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

/// Path of the in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteOptions {
    /// Database file, or `:memory:`.
    pub path: String,
    pub busy_timeout: Option<Duration>,
    pub read_only: bool,
    /// Create the file if it does not exist. Ignored when `read_only` is set.
    pub create: bool,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            path: MEMORY_PATH.to_owned(),
            busy_timeout: None,
            read_only: false,
            create: true,
        }
    }
}

impl SqliteOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(path)
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            base | OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.create {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE
        }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(path),
        }
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.opts.create = create;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }
}
