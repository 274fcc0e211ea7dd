//! Additive schema synchronization.
//!
//! `auto_migrate` brings the store up to the given table shapes without ever
//! removing anything: missing tables are created, missing columns are added,
//! and existing columns are left exactly as they are.

use crate::create::{CreateTable, column_definition};
use crate::introspect::table_columns;
use rowkeep_core::{Connection, FieldInfo, Result, SqlType, TableShape, quote_ident};
use serde::Serialize;
use std::collections::HashSet;

/// What `auto_migrate` changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Tables created from scratch
    pub created_tables: Vec<String>,
    /// `(table, column)` pairs added to existing tables
    pub added_columns: Vec<(String, String)>,
    /// Columns of a custom type that had to be added as nullable
    pub relaxed_columns: Vec<(String, String)>,
}

impl MigrationReport {
    /// True when the store already matched every shape.
    pub fn is_empty(&self) -> bool {
        self.created_tables.is_empty() && self.added_columns.is_empty()
    }
}

/// Synchronize the store with `shapes` inside a single transaction.
///
/// Any failure rolls back every change made by this call.
pub fn auto_migrate<C: Connection>(conn: &C, shapes: &[TableShape]) -> Result<MigrationReport> {
    conn.transaction(|conn| {
        let mut report = MigrationReport::default();
        for shape in shapes {
            migrate_shape(conn, shape, &mut report)?;
        }
        Ok(report)
    })
}

fn migrate_shape<C: Connection>(
    conn: &C,
    shape: &TableShape,
    report: &mut MigrationReport,
) -> Result<()> {
    let existing = table_columns(conn, shape.table)?;

    if existing.is_empty() {
        let sql = CreateTable::for_shape(shape).if_not_exists().build();
        tracing::trace!(sql = %sql, "create table");
        conn.execute_raw(&sql)?;
        tracing::debug!(table = shape.table, "created table");
        report.created_tables.push(shape.table.to_string());
        return Ok(());
    }

    let present: HashSet<&str> = existing.iter().map(|c| c.name.as_str()).collect();

    for field in shape.data_fields() {
        if present.contains(field.column_name) {
            continue;
        }

        let (sql, relaxed) = add_column_sql(shape.table, field);
        if relaxed {
            tracing::warn!(
                table = shape.table,
                column = field.column_name,
                "NOT NULL column of custom type without default added as nullable"
            );
            report
                .relaxed_columns
                .push((shape.table.to_string(), field.column_name.to_string()));
        }
        tracing::trace!(sql = %sql, "add column");
        conn.execute_raw(&sql)?;

        if field.unique {
            let sql = unique_index_sql(shape.table, field.column_name);
            tracing::trace!(sql = %sql, "create unique index");
            conn.execute_raw(&sql)?;
        }

        tracing::debug!(table = shape.table, column = field.column_name, "added column");
        report
            .added_columns
            .push((shape.table.to_string(), field.column_name.to_string()));
    }

    Ok(())
}

/// Render `ALTER TABLE ... ADD COLUMN` for `field`.
///
/// SQLite refuses to add a UNIQUE column or a NOT NULL column without a
/// default. UNIQUE is moved to a separate index. A NOT NULL column without a
/// default gets its type's zero value as default, so rows that already exist
/// decode as zero values. Custom types have no known zero value and are
/// added as nullable, which the second tuple element reports.
fn add_column_sql(table: &str, field: &FieldInfo) -> (String, bool) {
    let mut adjusted = field.clone().unique(false);
    let mut relaxed = false;

    if !field.nullable && field.default.is_none() {
        match zero_default(&field.sql_type) {
            Some(zero) => adjusted = adjusted.default_expr(zero),
            None => {
                adjusted = adjusted.nullable(true);
                relaxed = true;
            }
        }
    }

    (
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote_ident(table),
            column_definition(&adjusted)
        ),
        relaxed,
    )
}

/// Zero value backfilled into existing rows for a new NOT NULL column.
fn zero_default(sql_type: &SqlType) -> Option<&'static str> {
    match sql_type {
        SqlType::Boolean
        | SqlType::Integer
        | SqlType::BigInt
        | SqlType::Real
        | SqlType::Double => Some("0"),
        SqlType::Text => Some("''"),
        SqlType::Blob => Some("X''"),
        SqlType::Json => Some("'null'"),
        SqlType::Custom(_) => None,
    }
}

fn unique_index_sql(table: &str, column: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
        quote_ident(&format!("uk_{table}_{column}")),
        quote_ident(table),
        quote_ident(column)
    )
}
