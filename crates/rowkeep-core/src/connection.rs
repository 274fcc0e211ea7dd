//! Blocking database connection trait.
//!
//! Every call runs to completion on the calling thread. There is no runtime,
//! no cancellation and no timeout at this layer; drivers expose whatever
//! the engine offers (for SQLite, a busy timeout).

use crate::Result;
use crate::row::Row;
use crate::value::Value;

/// A connection to a relational store.
///
/// A connection is owned by one operation at a time. Drivers release the
/// underlying handle on `Drop`.
pub trait Connection: Send {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement and return the number of rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute an INSERT and return the identity assigned to the new row.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Execute SQL text without parameters (DDL, transaction control).
    fn execute_raw(&self, sql: &str) -> Result<()>;

    /// Execute a query and return the first row, if any.
    fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` succeeds. Rolls back and returns the original error
    /// when it fails; a rollback failure is logged, not returned.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
        Self: Sized,
    {
        self.execute_raw("BEGIN")?;
        match f(self) {
            Ok(value) => {
                self.execute_raw("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.execute_raw("ROLLBACK") {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}
