//! Error types for rowkeep operations.

use std::fmt;

/// The primary error type for all rowkeep operations.
#[derive(Debug)]
pub enum Error {
    /// The store could not be reached or opened
    Connection(ConnectionError),
    /// A read or write was rejected by the store
    Persistence(PersistenceError),
    /// No record matched the requested identity
    NotFound(NotFoundError),
    /// A stored value could not be decoded into the requested Rust type
    Type(TypeError),
    /// Configuration could not be loaded
    Config(ConfigError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub dsn: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// The engine refused to open the store
    Open,
    /// The DSN cannot be handed to the engine at all
    InvalidDsn,
    /// The handle was already closed
    Closed,
}

#[derive(Debug)]
pub struct PersistenceError {
    pub kind: PersistenceErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceErrorKind {
    /// Unique, not-null or check constraint violation
    Constraint,
    /// Malformed SQL
    Syntax,
    /// A filter or statement named a column the record does not have
    UnknownColumn,
    /// The store is locked by another writer
    Busy,
    /// The store was opened read-only
    ReadOnly,
    /// Disk I/O failure or full disk
    Io,
    /// Any other engine error
    Database,
}

#[derive(Debug)]
pub struct NotFoundError {
    pub table: &'static str,
    pub id: Option<i64>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Is this the explicit "record not found" signal from `get` or `delete`?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Did the store fail to open?
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Was the write rejected by a constraint?
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Persistence(PersistenceError {
                kind: PersistenceErrorKind::Constraint,
                ..
            })
        )
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Persistence(p) => p.sql.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for a persistence error without a source.
    pub fn persistence(
        kind: PersistenceErrorKind,
        sql: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Error::Persistence(PersistenceError {
            kind,
            sql: sql.map(str::to_string),
            message: message.into(),
            source: None,
        })
    }

    /// Shorthand for a not-found error.
    pub fn not_found(table: &'static str, id: Option<i64>) -> Self {
        Error::NotFound(NotFoundError { table, id })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e),
            Error::Persistence(e) => write!(f, "Persistence error: {}", e),
            Error::NotFound(e) => write!(f, "{}", e),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Persistence(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::NotFound(_) | Error::Type(_) => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dsn {
            Some(dsn) => write!(f, "{} ({})", self.message, dsn),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "record not found: {} with id {}", self.table, id),
            None => write!(f, "record not found: {} (record has no id)", self.table),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<PersistenceError> for Error {
    fn from(err: PersistenceError) -> Self {
        Error::Persistence(err)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Result type alias for rowkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_table_and_id() {
        let err = Error::not_found("people", Some(1_230_123));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "record not found: people with id 1230123"
        );

        let unsaved = Error::not_found("people", None);
        assert!(unsaved.to_string().contains("has no id"));
    }

    #[test]
    fn persistence_helpers() {
        let err = Error::persistence(
            PersistenceErrorKind::Constraint,
            Some("INSERT INTO people"),
            "UNIQUE constraint failed: people.email",
        );
        assert!(err.is_constraint_violation());
        assert!(!err.is_not_found());
        assert_eq!(err.sql(), Some("INSERT INTO people"));
        assert!(err.to_string().starts_with("Persistence error:"));
    }

    #[test]
    fn connection_error_carries_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Open,
            dsn: Some("/nope/db.sqlite".to_string()),
            message: "unable to open database file".to_string(),
            source: Some(Box::new(io)),
        });
        assert!(err.is_connection_error());
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(
            err.to_string(),
            "Connection error: unable to open database file (/nope/db.sqlite)"
        );
    }
}
