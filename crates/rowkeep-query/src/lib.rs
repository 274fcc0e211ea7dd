//! SQL statement builders for rowkeep.
//!
//! `rowkeep-query` turns `Record` metadata into SQLite SQL plus bound
//! parameters. Identifiers are always double-quoted and values are always
//! bound, never interpolated.
//!
//! | Builder | Statement |
//! |---------|-----------|
//! | [`InsertBuilder`] | `INSERT INTO t (...) VALUES (...)` |
//! | [`UpsertBuilder`] | `INSERT ... ON CONFLICT (id) DO UPDATE SET ...` |
//! | [`SelectBuilder`] | `SELECT cols FROM t [WHERE a = ?1 AND ...] ORDER BY id` |
//! | [`DeleteBuilder`] | `DELETE FROM t WHERE id = ?1` |

pub mod builder;
pub mod clause;

pub use builder::{DeleteBuilder, InsertBuilder, SelectBuilder, UpsertBuilder};
pub use clause::{Where, placeholder};
