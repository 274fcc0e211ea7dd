//! SQLite connection implementation.
//!
//! Safe wrappers around SQLite's C API implementing the blocking
//! `Connection` trait from rowkeep-core.

// Casts between usize and c_int are bounded by SQLite's own limits
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::borrow_as_ptr)] // FFI requires raw pointers

use crate::ffi;
use crate::types;
use rowkeep_core::{
    ColumnInfo, Connection, ConnectionError, ConnectionErrorKind, Error, PersistenceError,
    PersistenceErrorKind, Result, Row, Value,
};
use std::ffi::{CString, c_char, c_int};
use std::ptr;
use std::sync::Arc;

/// Configuration for opening SQLite connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Path to the database file, or ":memory:" for an in-memory database.
    pub path: String,
    /// Open flags (read-only, read-write, create, etc.)
    pub flags: OpenFlags,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

/// Flags controlling how the database is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    /// Open for reading only.
    pub read_only: bool,
    /// Open for reading and writing.
    pub read_write: bool,
    /// Create the database if it doesn't exist.
    pub create: bool,
    /// Enable URI filename interpretation.
    pub uri: bool,
}

impl OpenFlags {
    /// Create flags for read-only access.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access (database must exist).
    pub fn read_write() -> Self {
        Self {
            read_write: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access with creation if needed.
    pub fn create_read_write() -> Self {
        Self {
            read_write: true,
            create: true,
            ..Default::default()
        }
    }

    fn to_sqlite_flags(self) -> c_int {
        let mut flags = 0;

        if self.read_only {
            flags |= ffi::SQLITE_OPEN_READONLY;
        }
        if self.read_write {
            flags |= ffi::SQLITE_OPEN_READWRITE;
        }
        if self.create {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }
        if self.uri {
            flags |= ffi::SQLITE_OPEN_URI;
        }

        // Default to read-write if no mode specified
        if flags & (ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_READWRITE) == 0 {
            flags |= ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        }

        flags
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl SqliteConfig {
    /// Create a new config for a file-based database.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            flags: OpenFlags::create_read_write(),
            busy_timeout_ms: 5000,
        }
    }

    /// Create a new config for an in-memory database.
    ///
    /// Every connection opened from this config sees its own empty database.
    pub fn memory() -> Self {
        Self::file(":memory:")
    }

    /// Set open flags.
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }
}

/// A connection to a SQLite database.
///
/// The handle is owned exclusively and closed on drop. The type is `Send` but
/// not `Sync`: one thread uses it at a time.
pub struct SqliteConnection {
    db: *mut ffi::sqlite3,
    path: String,
}

// SAFETY: the bundled SQLite is built in serialized threading mode, and a
// connection is only ever used through `&self` from the thread that owns it.
unsafe impl Send for SqliteConnection {}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteConnection {
    /// Open a new SQLite connection with the given configuration.
    ///
    /// The store is probed before returning, so a file that is not a SQLite
    /// database fails here with a connection error rather than on first use.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let c_path = CString::new(config.path.as_str()).map_err(|_| {
            connection_error(
                ConnectionErrorKind::InvalidDsn,
                &config.path,
                "invalid path: contains null byte".to_string(),
            )
        })?;

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let flags = config.flags.to_sqlite_flags();

        // SAFETY: We pass valid pointers and check the return value
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

        if rc != ffi::SQLITE_OK {
            let msg = if db.is_null() {
                ffi::error_string(rc)
            } else {
                // SAFETY: db was allocated by sqlite3_open_v2 and is closed here
                unsafe {
                    let msg = ffi::last_error_message(db);
                    ffi::sqlite3_close(db);
                    msg
                }
            };
            return Err(connection_error(
                ConnectionErrorKind::Open,
                &config.path,
                format!("failed to open database: {msg}"),
            ));
        }

        let conn = Self {
            db,
            path: config.path.clone(),
        };

        if config.busy_timeout_ms > 0 {
            let ms = c_int::try_from(config.busy_timeout_ms).unwrap_or(c_int::MAX);
            // SAFETY: db is valid
            unsafe {
                ffi::sqlite3_busy_timeout(conn.db, ms);
            }
        }

        conn.execute_raw("PRAGMA schema_version").map_err(|e| {
            connection_error(
                ConnectionErrorKind::Open,
                &config.path,
                format!("failed to open database: {e}"),
            )
        })?;

        tracing::debug!(path = %conn.path, "opened sqlite connection");
        Ok(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open a file-based database.
    pub fn open_file(path: impl Into<String>) -> Result<Self> {
        Self::open(&SqliteConfig::file(path))
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the last insert rowid.
    pub fn last_insert_rowid(&self) -> i64 {
        // SAFETY: db is valid
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    /// Get the number of rows changed by the last statement.
    pub fn changes(&self) -> u64 {
        // SAFETY: db is valid
        let n = unsafe { ffi::sqlite3_changes(self.db) };
        u64::try_from(n).unwrap_or(0)
    }

    /// Close the connection, reporting any failure.
    ///
    /// Dropping the connection closes it too, but silently.
    pub fn close(mut self) -> Result<()> {
        let db = std::mem::replace(&mut self.db, ptr::null_mut());
        // SAFETY: db is valid and no longer reachable through self
        let rc = unsafe { ffi::sqlite3_close_v2(db) };
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(connection_error(
                ConnectionErrorKind::Closed,
                &self.path,
                format!("failed to close database: {}", ffi::error_string(rc)),
            ))
        }
    }

    /// Prepare `sql`, bind `params`, and hand the statement to `f`.
    ///
    /// The statement is always finalized, whether `f` succeeds or not.
    fn with_statement<T>(
        &self,
        sql: &str,
        params: &[Value],
        f: impl FnOnce(*mut ffi::sqlite3_stmt) -> Result<T>,
    ) -> Result<T> {
        let stmt = self.prepare(sql)?;

        let result = params
            .iter()
            .enumerate()
            .try_for_each(|(i, param)| {
                // SAFETY: stmt is valid, index is 1-based
                let rc = unsafe { types::bind_value(stmt, (i + 1) as c_int, param) };
                if rc == ffi::SQLITE_OK {
                    Ok(())
                } else {
                    Err(self.bind_error(sql, i + 1))
                }
            })
            .and_then(|()| f(stmt));

        // SAFETY: stmt is valid and not used after this point
        unsafe { ffi::sqlite3_finalize(stmt) };
        result
    }

    fn prepare(&self, sql: &str) -> Result<*mut ffi::sqlite3_stmt> {
        let c_sql = CString::new(sql).map_err(|_| {
            Error::persistence(
                PersistenceErrorKind::Syntax,
                Some(sql),
                "SQL contains null byte",
            )
        })?;

        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();

        // SAFETY: All pointers are valid
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                self.db,
                c_sql.as_ptr(),
                c_sql.as_bytes().len() as c_int,
                &mut stmt,
                ptr::null_mut(),
            )
        };

        if rc != ffi::SQLITE_OK {
            return Err(self.last_error(sql, true));
        }

        Ok(stmt)
    }

    /// Build a persistence error from the connection's last failure.
    ///
    /// Errors raised while preparing are syntax errors unless SQLite reports
    /// something more specific.
    fn last_error(&self, sql: &str, preparing: bool) -> Error {
        // SAFETY: db is valid
        let (code, msg) = unsafe { (ffi::sqlite3_errcode(self.db), ffi::last_error_message(self.db)) };
        let kind = match error_code_to_kind(code) {
            PersistenceErrorKind::Database if preparing && code == ffi::SQLITE_ERROR => {
                PersistenceErrorKind::Syntax
            }
            kind => kind,
        };
        Error::Persistence(PersistenceError {
            kind,
            sql: Some(sql.to_string()),
            message: msg,
            source: None,
        })
    }

    fn bind_error(&self, sql: &str, param_index: usize) -> Error {
        // SAFETY: db is valid
        let msg = unsafe { ffi::last_error_message(self.db) };
        Error::persistence(
            PersistenceErrorKind::Database,
            Some(sql),
            format!("failed to bind parameter {param_index}: {msg}"),
        )
    }
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.with_statement(sql, params, |stmt| {
            // SAFETY: stmt is valid
            let col_count = unsafe { ffi::sqlite3_column_count(stmt) };
            let col_names = (0..col_count)
                .map(|i| {
                    // SAFETY: i is in range
                    unsafe { types::column_name(stmt, i) }.unwrap_or_else(|| format!("col{i}"))
                })
                .collect();
            let columns = Arc::new(ColumnInfo::new(col_names));

            let mut rows = Vec::new();
            loop {
                // SAFETY: stmt is valid
                match unsafe { ffi::sqlite3_step(stmt) } {
                    ffi::SQLITE_ROW => {
                        let values = (0..col_count)
                            // SAFETY: stmt is positioned on a row and i is in range
                            .map(|i| unsafe { types::read_column(stmt, i) })
                            .collect();
                        rows.push(Row::with_columns(Arc::clone(&columns), values));
                    }
                    ffi::SQLITE_DONE => break,
                    _ => return Err(self.last_error(sql, false)),
                }
            }
            Ok(rows)
        })
    }

    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.with_statement(sql, params, |stmt| {
            // SAFETY: stmt is valid
            match unsafe { ffi::sqlite3_step(stmt) } {
                ffi::SQLITE_DONE | ffi::SQLITE_ROW => Ok(self.changes()),
                _ => Err(self.last_error(sql, false)),
            }
        })
    }

    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.execute(sql, params)?;
        Ok(self.last_insert_rowid())
    }

    fn execute_raw(&self, sql: &str) -> Result<()> {
        let c_sql = CString::new(sql).map_err(|_| {
            Error::persistence(
                PersistenceErrorKind::Syntax,
                Some(sql),
                "SQL contains null byte",
            )
        })?;

        let mut errmsg: *mut c_char = ptr::null_mut();

        // SAFETY: All pointers are valid
        let rc = unsafe {
            ffi::sqlite3_exec(self.db, c_sql.as_ptr(), None, ptr::null_mut(), &mut errmsg)
        };

        if rc != ffi::SQLITE_OK {
            // SAFETY: errmsg is null or allocated by sqlite3_exec; freed exactly once
            let msg = unsafe {
                let msg = ffi::owned_string(errmsg);
                ffi::sqlite3_free(errmsg.cast());
                msg
            }
            .unwrap_or_else(|| ffi::error_string(rc));

            return Err(Error::Persistence(PersistenceError {
                kind: error_code_to_kind(rc),
                sql: Some(sql.to_string()),
                message: msg,
                source: None,
            }));
        }

        Ok(())
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if !self.db.is_null() {
            // SAFETY: db is valid and dropped exactly once
            unsafe {
                ffi::sqlite3_close_v2(self.db);
            }
        }
    }
}

fn connection_error(kind: ConnectionErrorKind, path: &str, message: String) -> Error {
    Error::Connection(ConnectionError {
        kind,
        dsn: Some(path.to_string()),
        message,
        source: None,
    })
}

/// Map a SQLite result code onto a persistence error kind.
///
/// Extended codes are reduced to their primary code first.
pub(crate) fn error_code_to_kind(code: c_int) -> PersistenceErrorKind {
    match code & 0xff {
        ffi::SQLITE_CONSTRAINT => PersistenceErrorKind::Constraint,
        ffi::SQLITE_BUSY | ffi::SQLITE_LOCKED => PersistenceErrorKind::Busy,
        ffi::SQLITE_READONLY => PersistenceErrorKind::ReadOnly,
        ffi::SQLITE_IOERR | ffi::SQLITE_FULL => PersistenceErrorKind::Io,
        _ => PersistenceErrorKind::Database,
    }
}
