//! SQLite driver for rowkeep.
//!
// FFI bindings require unsafe code
#![allow(unsafe_code)]
//!
//! The driver talks to a statically bundled SQLite through `libsqlite3-sys`
//! and implements the blocking `Connection` trait from rowkeep-core.
//! [`SqliteDialectorFactory`] plugs it into the `Database` facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use rowkeep_core::{Connection, Value};
//! use rowkeep_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory()?;
//! conn.execute_raw("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//! let id = conn.insert("INSERT INTO users (name) VALUES (?1)", &[Value::from("Alice")])?;
//! ```
//!
//! # Errors
//!
//! Failures to open the store are `Error::Connection`. Statement failures
//! are `Error::Persistence`, classified from the SQLite result code:
//! constraint, busy/locked, read-only, I/O, or generic.

pub mod connection;
pub mod dialector;
pub mod ffi;
pub mod types;

pub use connection::{OpenFlags, SqliteConfig, SqliteConnection};
pub use dialector::{SqliteDialector, SqliteDialectorFactory};

/// The linked SQLite library version, e.g. `"3.45.1"`.
pub fn sqlite_version() -> &'static str {
    ffi::version()
}
