//! Field and column definitions.

use crate::types::SqlType;

/// Metadata about a record field/column.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Database column name (may differ from field name)
    pub column_name: &'static str,
    /// SQL type for this field
    pub sql_type: SqlType,
    /// Whether this field is nullable
    pub nullable: bool,
    /// Whether this is the identity column
    pub primary_key: bool,
    /// Whether this field has a unique constraint
    pub unique: bool,
    /// Default value expression (SQL)
    pub default: Option<&'static str>,
}

impl FieldInfo {
    /// Create a new field info with minimal required data.
    pub const fn new(name: &'static str, column_name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            column_name,
            sql_type,
            nullable: false,
            primary_key: false,
            unique: false,
            default: None,
        }
    }

    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    /// Set a default SQL expression.
    pub const fn default_expr(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    /// Set default SQL expression from optional.
    pub const fn default_opt(mut self, expr: Option<&'static str>) -> Self {
        self.default = expr;
        self
    }
}

/// Structural description of a record table, consumed by auto-migration.
#[derive(Debug, Clone, Copy)]
pub struct TableShape {
    pub table: &'static str,
    pub id_column: &'static str,
    pub fields: &'static [FieldInfo],
}

impl TableShape {
    pub const fn new(
        table: &'static str,
        id_column: &'static str,
        fields: &'static [FieldInfo],
    ) -> Self {
        Self {
            table,
            id_column,
            fields,
        }
    }

    /// Look up a field by its column name.
    pub fn field(&self, column: &str) -> Option<&'static FieldInfo> {
        self.fields.iter().find(|f| f.column_name == column)
    }

    /// Iterate over every column except the identity.
    pub fn data_fields(&self) -> impl Iterator<Item = &'static FieldInfo> {
        let id = self.id_column;
        self.fields.iter().filter(move |f| f.column_name != id)
    }
}
