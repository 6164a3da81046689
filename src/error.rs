use std::fmt;

use thiserror::Error;

/// Longest message a [`DbError`] keeps, in bytes.
pub const MAX_MESSAGE_LEN: usize = 255;

/// Failure classes surfaced by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The native engine reported an error that has no finer class.
    GenericFailure,
    /// No open connection or compiled statement to act on.
    NotOpen,
    /// Lock contention inside the engine.
    Busy,
    NotFound,
    ConstraintViolation,
    TypeMismatch,
    /// The operation is invalid for the object's current state.
    Misuse,
    /// A parameter position, column index or option value is out of range.
    OutOfRange,
    /// A required argument was absent (empty SQL, locator or name).
    NullArgument,
    IoFailure,
    Full,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::GenericFailure => "generic failure",
            ErrorKind::NotOpen => "not open",
            ErrorKind::Busy => "busy",
            ErrorKind::NotFound => "not found",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Misuse => "misuse",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::NullArgument => "null argument",
            ErrorKind::IoFailure => "I/O failure",
            ErrorKind::Full => "full",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure kind plus a bounded, human readable message.
///
/// This is the only error type the crate returns. Native driver errors are
/// classified into an [`ErrorKind`] at the boundary and their text is kept
/// as the message:
/// ```rust
/// use sql_access::{DbError, ErrorKind};
///
/// let err = DbError::new(ErrorKind::Busy, "database is locked");
/// assert_eq!(err.kind(), ErrorKind::Busy);
/// assert_eq!(err.to_string(), "busy: database is locked");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DbError {
    kind: ErrorKind,
    message: String,
}

/// Result alias used by every fallible operation in the crate.
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Build an error, truncating `message` to [`MAX_MESSAGE_LEN`] bytes.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        truncate_on_char_boundary(&mut message, MAX_MESSAGE_LEN);
        Self { kind, message }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub(crate) fn not_open() -> Self {
        Self::new(ErrorKind::NotOpen, "database not open")
    }

    pub(crate) fn statement_not_initialized() -> Self {
        Self::new(ErrorKind::Misuse, "statement not initialized")
    }

    pub(crate) fn param_out_of_range(position: usize, count: usize) -> Self {
        Self::new(
            ErrorKind::OutOfRange,
            format!("parameter {position} out of range (statement has {count})"),
        )
    }

    /// Re-tag an error with a different kind, keeping its message.
    #[must_use]
    pub(crate) fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Reject SQL text, locators and names that are empty or only whitespace.
pub(crate) fn require_text(value: &str, what: &str) -> DbResult<()> {
    if value.trim().is_empty() {
        Err(DbError::new(ErrorKind::NullArgument, format!("{what} is empty")))
    } else {
        Ok(())
    }
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        let kind = match &err {
            rusqlite::Error::SqliteFailure(ffi_err, _) => match ffi_err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => ErrorKind::Busy,
                ErrorCode::ConstraintViolation => ErrorKind::ConstraintViolation,
                ErrorCode::TypeMismatch => ErrorKind::TypeMismatch,
                ErrorCode::ApiMisuse => ErrorKind::Misuse,
                ErrorCode::ParameterOutOfRange => ErrorKind::OutOfRange,
                ErrorCode::SystemIoFailure => ErrorKind::IoFailure,
                ErrorCode::DiskFull => ErrorKind::Full,
                ErrorCode::NotFound => ErrorKind::NotFound,
                ErrorCode::CannotOpen => ErrorKind::NotOpen,
                _ => ErrorKind::GenericFailure,
            },
            rusqlite::Error::QueryReturnedNoRows => ErrorKind::NotFound,
            rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidParameterCount(_, _)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidParameterName(_) => ErrorKind::OutOfRange,
            rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
                ErrorKind::TypeMismatch
            }
            rusqlite::Error::NulError(_) => ErrorKind::Misuse,
            _ => ErrorKind::GenericFailure,
        };
        DbError::new(kind, err.to_string())
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => mysql_database_kind(db_err.as_ref()),
            sqlx::Error::Io(_) => ErrorKind::IoFailure,
            sqlx::Error::RowNotFound => ErrorKind::NotFound,
            sqlx::Error::ColumnIndexOutOfBounds { .. } | sqlx::Error::ColumnNotFound(_) => {
                ErrorKind::OutOfRange
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::TypeNotFound { .. } => {
                ErrorKind::TypeMismatch
            }
            _ => ErrorKind::GenericFailure,
        };
        DbError::new(kind, err.to_string())
    }
}

#[cfg(feature = "mysql")]
fn mysql_database_kind(db_err: &dyn sqlx::error::DatabaseError) -> ErrorKind {
    use sqlx::error::ErrorKind as SqlxKind;

    // ER_LOCK_WAIT_TIMEOUT, ER_LOCK_DEADLOCK
    const LOCK_ERRORS: [u16; 2] = [1205, 1213];

    if let Some(mysql_err) = db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
        && LOCK_ERRORS.contains(&mysql_err.number())
    {
        return ErrorKind::Busy;
    }
    match db_err.kind() {
        SqlxKind::UniqueViolation
        | SqlxKind::ForeignKeyViolation
        | SqlxKind::NotNullViolation
        | SqlxKind::CheckViolation => ErrorKind::ConstraintViolation,
        _ => ErrorKind::GenericFailure,
    }
}
