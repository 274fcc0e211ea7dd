//! rowkeep - a small generic record store over SQLite.
//!
//! rowkeep maps plain structs onto tables and exposes generic
//! create/update/get/delete/query/auto-migrate operations through a single
//! [`Database`] facade:
//!
//! - `#[derive(Record)]` describes the table for a struct
//! - a [`DialectorFactory`] decides which engine a DSN is opened with
//! - every operation opens its own connection; nothing is cached
//!
//! # Quick Start
//!
//! ```ignore
//! use rowkeep::prelude::*;
//!
//! #[derive(Record, Debug)]
//! struct Person {
//!     id: Option<i64>,
//!     firstname: String,
//!     surname: String,
//! }
//!
//! fn main() -> rowkeep::Result<()> {
//!     let db = Database::new("people.db", SqliteDialectorFactory::default());
//!     db.auto_migrate(&[Person::shape()])?;
//!
//!     let mut michael = Person {
//!         id: None,
//!         firstname: "Michael".into(),
//!         surname: "Cunningham".into(),
//!     };
//!     db.create(&mut michael)?;
//!
//!     let found: Person = db.get(michael.id.unwrap_or_default())?;
//!     let johns: Vec<Person> = db.query(&Filter::new().eq("firstname", "John"))?;
//!     db.delete(&found)?;
//!     Ok(())
//! }
//! ```
//!
//! The derive expands to paths under `rowkeep_core`, so crates deriving
//! `Record` depend on `rowkeep-core` alongside `rowkeep`.
//!
//! # Logging
//!
//! Every facade operation runs inside a `debug` span carrying the table
//! name; generated SQL is emitted at `trace`. rowkeep never installs a
//! subscriber.

pub mod database;

pub use database::{ConnectionOf, Database};

pub use rowkeep_core::{
    Connection, ConnectionError, ConnectionErrorKind, DatabaseConfig, Dialector,
    DialectorFactory, Error, FieldInfo, Filter, NotFoundError, PersistenceError,
    PersistenceErrorKind, Record, Result, Row, SqlType, TableShape, Value,
};
pub use rowkeep_core::config;

pub use rowkeep_macros::Record;

pub use rowkeep_schema::{CreateTable, MigrationReport};

pub use rowkeep_sqlite::{
    OpenFlags, SqliteConfig, SqliteConnection, SqliteDialector, SqliteDialectorFactory,
    sqlite_version,
};

/// A database backed by the bundled SQLite driver.
pub type SqliteDatabase = Database<SqliteDialectorFactory>;

impl SqliteDatabase {
    /// Open a SQLite-backed database at the configured DSN and busy timeout.
    pub fn sqlite(config: &DatabaseConfig) -> Self {
        Database::from_config(config, SqliteDialectorFactory::from_config(config))
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Database, DatabaseConfig, Error, Filter, Record, Result, SqliteDatabase,
        SqliteDialectorFactory, TableShape, Value,
    };
}
