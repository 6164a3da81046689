use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

use crate::error::{DbError, DbResult, ErrorKind, require_text};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Options for connecting to a MySQL or MariaDB server.
///
/// Parsed from a `host:port:user:password:database` locator; empty fields
/// take their defaults and the database field keeps any further `:`.
/// ```rust
/// use sql_access::mysql::MysqlOptions;
///
/// let opts: MysqlOptions = "db.internal::app:s3cret:orders".parse()?;
/// assert_eq!(opts.host, "db.internal");
/// assert_eq!(opts.port, 3306);
/// assert_eq!(opts.database.as_deref(), Some("orders"));
/// # Ok::<(), sql_access::DbError>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Applied as `innodb_lock_wait_timeout` right after connecting.
    pub busy_timeout: Option<Duration>,
    pub charset: String,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_owned(),
            password: None,
            database: None,
            busy_timeout: None,
            charset: DEFAULT_CHARSET.to_owned(),
        }
    }
}

impl MysqlOptions {
    #[must_use]
    pub fn builder() -> MysqlOptionsBuilder {
        MysqlOptionsBuilder::default()
    }

    pub(crate) fn connect_options(&self) -> MySqlConnectOptions {
        let mut opts = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .charset(&self.charset);
        if let Some(password) = &self.password {
            opts = opts.password(password);
        }
        if let Some(database) = &self.database {
            opts = opts.database(database);
        }
        opts
    }
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

impl FromStr for MysqlOptions {
    type Err = DbError;

    fn from_str(locator: &str) -> DbResult<Self> {
        require_text(locator, "locator")?;
        let mut parts = locator.trim().splitn(5, ':');
        let mut opts = Self::default();

        if let Some(host) = non_empty(parts.next()) {
            opts.host = host.to_owned();
        }
        if let Some(port) = non_empty(parts.next()) {
            opts.port = port
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| DbError::new(ErrorKind::OutOfRange, format!("invalid port '{port}'")))?;
        }
        if let Some(user) = non_empty(parts.next()) {
            opts.user = user.to_owned();
        }
        opts.password = non_empty(parts.next()).map(str::to_owned);
        opts.database = non_empty(parts.next()).map(str::to_owned);
        Ok(opts)
    }
}

impl fmt::Debug for MysqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("busy_timeout", &self.busy_timeout)
            .field("charset", &self.charset)
            .finish()
    }
}

/// `user@host:port/database`, without the password.
impl fmt::Display for MysqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)?;
        if let Some(database) = &self.database {
            write!(f, "/{database}")?;
        }
        Ok(())
    }
}

/// Fluent builder for MySQL options.
#[derive(Debug, Clone, Default)]
pub struct MysqlOptionsBuilder {
    opts: MysqlOptions,
}

impl MysqlOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.opts.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = charset.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> MysqlOptions {
        self.opts
    }
}
