//! Core types and traits for rowkeep.
//!
//! This crate provides the foundational abstractions shared by every other
//! rowkeep crate:
//!
//! - `Record` trait for struct-to-table mapping
//! - `Connection` trait for blocking database connections
//! - `Dialector` / `DialectorFactory` for pluggable backends
//! - `Value`, `Row` and `Filter` for data moving across the seam
//! - The `Error` taxonomy: connection, persistence, not-found
//! - `DatabaseConfig` for JSON or environment driven setup

pub mod config;
pub mod connection;
pub mod dialector;
pub mod error;
pub mod field;
pub mod filter;
pub mod identifiers;
pub mod record;
pub mod row;
pub mod types;
pub mod value;

pub use config::DatabaseConfig;
pub use connection::Connection;
pub use dialector::{Dialector, DialectorFactory};
pub use error::{
    ConfigError, ConnectionError, ConnectionErrorKind, Error, NotFoundError, PersistenceError,
    PersistenceErrorKind, Result, TypeError,
};
pub use field::{FieldInfo, TableShape};
pub use filter::Filter;
pub use identifiers::quote_ident;
pub use record::Record;
pub use row::{ColumnInfo, FromValue, Row};
pub use types::SqlType;
pub use value::Value;
