//! CREATE TABLE statement builder.

use rowkeep_core::{FieldInfo, TableShape, quote_ident};

/// Builder for CREATE TABLE statements.
///
/// The identity column is always rendered as
/// `INTEGER PRIMARY KEY AUTOINCREMENT` so it aliases the SQLite rowid and
/// identities are never reused after a delete.
#[derive(Debug, Clone, Copy)]
pub struct CreateTable {
    shape: TableShape,
    if_not_exists: bool,
}

impl CreateTable {
    /// Create a builder for the given table shape.
    pub fn for_shape(shape: &TableShape) -> Self {
        Self {
            shape: *shape,
            if_not_exists: false,
        }
    }

    /// Add IF NOT EXISTS clause.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Build the CREATE TABLE SQL.
    pub fn build(&self) -> String {
        let mut sql = String::from("CREATE TABLE ");

        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }

        sql.push_str(&quote_ident(self.shape.table));
        sql.push_str(" (\n  ");

        let mut column_defs = vec![format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT",
            quote_ident(self.shape.id_column)
        )];
        column_defs.extend(self.shape.data_fields().map(column_definition));

        sql.push_str(&column_defs.join(",\n  "));
        sql.push_str("\n)");

        sql
    }
}

/// Render one non-identity column for CREATE TABLE.
pub(crate) fn column_definition(field: &FieldInfo) -> String {
    let mut def = format!(
        "{} {}",
        quote_ident(field.column_name),
        field.sql_type.sql_name()
    );

    if !field.nullable {
        def.push_str(" NOT NULL");
    }

    if field.unique {
        def.push_str(" UNIQUE");
    }

    if let Some(default) = field.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }

    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_core::SqlType;

    static FIELDS: &[FieldInfo] = &[
        FieldInfo::new("id", "id", SqlType::BigInt)
            .primary_key(true)
            .nullable(true),
        FieldInfo::new("firstname", "firstname", SqlType::Text),
        FieldInfo::new("nickname", "nickname", SqlType::Text).nullable(true),
        FieldInfo::new("email", "email", SqlType::Text).unique(true),
        FieldInfo::new("active", "active", SqlType::Boolean).default_expr("1"),
    ];

    fn shape() -> TableShape {
        TableShape::new("people", "id", FIELDS)
    }

    #[test]
    fn test_create_table_columns() {
        let sql = CreateTable::for_shape(&shape()).build();
        assert_eq!(
            sql,
            "CREATE TABLE \"people\" (\n  \
             \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \
             \"firstname\" TEXT NOT NULL,\n  \
             \"nickname\" TEXT,\n  \
             \"email\" TEXT NOT NULL UNIQUE,\n  \
             \"active\" BOOLEAN NOT NULL DEFAULT 1\n)"
        );
    }

    #[test]
    fn test_if_not_exists() {
        let sql = CreateTable::for_shape(&shape()).if_not_exists().build();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"people\" ("));
    }

    #[test]
    fn test_identity_only_table() {
        static ONLY_ID: &[FieldInfo] = &[FieldInfo::new("id", "id", SqlType::BigInt)];
        let sql = CreateTable::for_shape(&TableShape::new("markers", "id", ONLY_ID)).build();
        assert_eq!(
            sql,
            "CREATE TABLE \"markers\" (\n  \"id\" INTEGER PRIMARY KEY AUTOINCREMENT\n)"
        );
    }
}
