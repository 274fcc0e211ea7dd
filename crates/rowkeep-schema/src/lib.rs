//! Table creation and additive migration for rowkeep.
//!
//! - [`CreateTable`] renders SQLite DDL from a record's [`TableShape`].
//! - [`introspect`] reads live column metadata with `PRAGMA table_info`.
//! - [`auto_migrate`] creates missing tables and adds missing columns; it
//!   never drops, renames or retypes anything.
//!
//! [`TableShape`]: rowkeep_core::TableShape

pub mod create;
pub mod introspect;
pub mod migrate;

pub use create::CreateTable;
pub use introspect::{ColumnInfo, table_columns};
pub use migrate::{MigrationReport, auto_migrate};
