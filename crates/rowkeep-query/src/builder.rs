//! Statement builders for record CRUD.
//!
//! Each builder renders `(sql, params)` from `Record` metadata and can run
//! itself against any `Connection`.

use crate::clause::{Where, placeholder};
use rowkeep_core::{Connection, Filter, Record, Result, Value, quote_ident};
use std::marker::PhantomData;

fn column_list<R: Record>() -> String {
    R::fields()
        .iter()
        .map(|f| quote_ident(f.column_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// INSERT builder.
///
/// The identity column is left out while the record is unsaved so the store
/// assigns it; a saved record keeps its identity.
#[derive(Debug)]
pub struct InsertBuilder<'a, R: Record> {
    record: &'a R,
}

impl<'a, R: Record> InsertBuilder<'a, R> {
    pub fn new(record: &'a R) -> Self {
        Self { record }
    }

    /// Build the INSERT SQL and parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        let skip_id = self.record.is_new();
        let (columns, values): (Vec<_>, Vec<_>) = self
            .record
            .to_row()
            .into_iter()
            .filter(|(name, _)| !(skip_id && *name == R::ID_COLUMN))
            .unzip();

        if columns.is_empty() {
            return (
                format!("INSERT INTO {} DEFAULT VALUES", quote_ident(R::TABLE_NAME)),
                values,
            );
        }

        let placeholders: Vec<_> = (1..=values.len()).map(placeholder).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(R::TABLE_NAME),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders.join(", ")
        );

        (sql, values)
    }

    /// Execute the INSERT and return the identity of the new row.
    pub fn execute<C: Connection>(self, conn: &C) -> Result<i64> {
        let (sql, params) = self.build();
        tracing::trace!(sql = %sql, "insert");
        conn.insert(&sql, &params)
    }
}

/// Save builder: insert-or-replace keyed on the identity.
///
/// Renders `INSERT ... ON CONFLICT(id) DO UPDATE SET col = excluded.col`, so
/// every column of a saved record is written whether or not the row still
/// exists.
#[derive(Debug)]
pub struct UpsertBuilder<'a, R: Record> {
    record: &'a R,
}

impl<'a, R: Record> UpsertBuilder<'a, R> {
    pub fn new(record: &'a R) -> Self {
        Self { record }
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        let (insert_sql, params) = InsertBuilder::new(self.record).build();
        let id = quote_ident(R::ID_COLUMN);

        let assignments: Vec<_> = R::fields()
            .iter()
            .filter(|f| f.column_name != R::ID_COLUMN)
            .map(|f| {
                let col = quote_ident(f.column_name);
                format!("{col} = excluded.{col}")
            })
            .collect();

        let sql = if assignments.is_empty() {
            format!("{insert_sql} ON CONFLICT ({id}) DO NOTHING")
        } else {
            format!(
                "{insert_sql} ON CONFLICT ({id}) DO UPDATE SET {}",
                assignments.join(", ")
            )
        };

        (sql, params)
    }

    /// Execute the upsert and return the identity of the written row.
    pub fn execute<C: Connection>(self, conn: &C) -> Result<i64> {
        let (sql, params) = self.build();
        tracing::trace!(sql = %sql, "upsert");
        let rowid = conn.insert(&sql, &params)?;
        // On the DO UPDATE path SQLite leaves last_insert_rowid untouched.
        Ok(self.record.id().unwrap_or(rowid))
    }
}

/// SELECT builder returning whole records.
#[derive(Debug)]
pub struct SelectBuilder<R: Record> {
    where_clause: Where,
    limit: Option<u64>,
    _marker: PhantomData<R>,
}

impl<R: Record> SelectBuilder<R> {
    /// Select the single row with the given identity.
    pub fn by_id(id: i64) -> Self {
        Self {
            where_clause: Where::new().eq(R::ID_COLUMN, id),
            limit: Some(1),
            _marker: PhantomData,
        }
    }

    /// Select rows matching every entry of `filter`.
    pub fn matching(filter: &Filter) -> Result<Self> {
        Ok(Self {
            where_clause: Where::from_filter::<R>(filter)?,
            limit: None,
            _marker: PhantomData,
        })
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list::<R>(),
            quote_ident(R::TABLE_NAME)
        );

        let (where_sql, params) = self.where_clause.build(0);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(&quote_ident(R::ID_COLUMN));

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }

    /// Execute and decode every row.
    pub fn all<C: Connection>(&self, conn: &C) -> Result<Vec<R>> {
        let (sql, params) = self.build();
        tracing::trace!(sql = %sql, "select");
        let rows = conn.query(&sql, &params)?;
        rows.iter().map(R::from_row).collect()
    }

    /// Execute and decode the first row, if any.
    pub fn first<C: Connection>(&self, conn: &C) -> Result<Option<R>> {
        let (sql, params) = self.build();
        tracing::trace!(sql = %sql, "select first");
        conn.query_one(&sql, &params)?
            .as_ref()
            .map(R::from_row)
            .transpose()
    }
}

/// DELETE builder keyed on the identity.
#[derive(Debug)]
pub struct DeleteBuilder<R: Record> {
    id: i64,
    _marker: PhantomData<R>,
}

impl<R: Record> DeleteBuilder<R> {
    pub fn by_id(id: i64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        let (where_sql, params) = Where::new().eq(R::ID_COLUMN, self.id).build(0);
        (
            format!(
                "DELETE FROM {} WHERE {}",
                quote_ident(R::TABLE_NAME),
                where_sql
            ),
            params,
        )
    }

    /// Execute the DELETE and return rows affected.
    pub fn execute<C: Connection>(self, conn: &C) -> Result<u64> {
        let (sql, params) = self.build();
        tracing::trace!(sql = %sql, "delete");
        conn.execute(&sql, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_macros::Record;

    #[derive(Record, Debug, Clone, PartialEq)]
    struct Person {
        id: Option<i64>,
        firstname: String,
        surname: String,
    }

    #[derive(Record, Debug)]
    struct Marker {
        id: i64,
    }

    fn michael() -> Person {
        Person {
            id: None,
            firstname: "Michael".to_string(),
            surname: "Cunningham".to_string(),
        }
    }

    #[test]
    fn test_insert_skips_unsaved_identity() {
        let person = michael();
        let (sql, params) = InsertBuilder::new(&person).build();
        assert_eq!(
            sql,
            "INSERT INTO \"people\" (\"firstname\", \"surname\") VALUES (?1, ?2)"
        );
        assert_eq!(params, vec![Value::from("Michael"), Value::from("Cunningham")]);
    }

    #[test]
    fn test_insert_keeps_saved_identity() {
        let person = Person {
            id: Some(9),
            ..michael()
        };
        let (sql, params) = InsertBuilder::new(&person).build();
        assert!(sql.starts_with("INSERT INTO \"people\" (\"id\", \"firstname\", \"surname\")"));
        assert_eq!(params[0], Value::BigInt(9));
    }

    #[test]
    fn test_insert_default_values() {
        let (sql, params) = InsertBuilder::new(&Marker { id: 0 }).build();
        assert_eq!(sql, "INSERT INTO \"markers\" DEFAULT VALUES");
        assert!(params.is_empty());
    }

    #[test]
    fn test_upsert_sets_every_data_column() {
        let person = Person {
            id: Some(3),
            ..michael()
        };
        let (sql, params) = UpsertBuilder::new(&person).build();
        assert!(sql.ends_with(
            "ON CONFLICT (\"id\") DO UPDATE SET \"firstname\" = excluded.\"firstname\", \"surname\" = excluded.\"surname\""
        ));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_upsert_without_data_columns() {
        let (sql, _) = UpsertBuilder::new(&Marker { id: 4 }).build();
        assert!(sql.ends_with("ON CONFLICT (\"id\") DO NOTHING"));
    }

    #[test]
    fn test_select_by_id() {
        let (sql, params) = SelectBuilder::<Person>::by_id(5).build();
        assert_eq!(
            sql,
            "SELECT \"id\", \"firstname\", \"surname\" FROM \"people\" WHERE \"id\" = ?1 ORDER BY \"id\" LIMIT 1"
        );
        assert_eq!(params, vec![Value::BigInt(5)]);
    }

    #[test]
    fn test_select_matching_filter() {
        let filter = Filter::new().eq("surname", "Doe").eq("firstname", "John");
        let (sql, params) = SelectBuilder::<Person>::matching(&filter).unwrap().build();
        assert!(sql.ends_with("WHERE \"firstname\" = ?1 AND \"surname\" = ?2 ORDER BY \"id\""));
        assert_eq!(params, vec![Value::from("John"), Value::from("Doe")]);
    }

    #[test]
    fn test_select_empty_filter_has_no_where() {
        let (sql, params) = SelectBuilder::<Person>::matching(&Filter::new())
            .unwrap()
            .build();
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_rejects_unknown_column() {
        let filter = Filter::new().eq("nickname", "Johnny");
        let err = SelectBuilder::<Person>::matching(&filter).unwrap_err();
        assert!(err.to_string().contains("nickname"));
        assert!(matches!(
            err,
            rowkeep_core::Error::Persistence(rowkeep_core::PersistenceError {
                kind: rowkeep_core::PersistenceErrorKind::UnknownColumn,
                ..
            })
        ));
    }

    #[test]
    fn test_delete_by_id() {
        let (sql, params) = DeleteBuilder::<Person>::by_id(1_230_123).build();
        assert_eq!(sql, "DELETE FROM \"people\" WHERE \"id\" = ?1");
        assert_eq!(params, vec![Value::BigInt(1_230_123)]);
    }
}
