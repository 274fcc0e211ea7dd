//! Live table introspection through `PRAGMA table_info`.

use rowkeep_core::{Connection, Result, quote_ident};
use serde::Serialize;

/// A column as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as written in the DDL (may be empty)
    pub sql_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

/// Read the columns of `table` in declaration order.
///
/// A table that does not exist yields an empty list rather than an error.
pub fn table_columns<C: Connection>(conn: &C, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    tracing::trace!(sql = %sql, "introspect");
    let rows = conn.query(&sql, &[])?;

    rows.iter()
        .map(|row| {
            Ok(ColumnInfo {
                name: row.get_named("name")?,
                sql_type: row.get_named::<Option<String>>("type")?.unwrap_or_default(),
                nullable: row.get_named::<i64>("notnull")? == 0,
                default: row.get_named("dflt_value")?,
                primary_key: row.get_named::<i64>("pk")? > 0,
            })
        })
        .collect()
}
