//! SQL type definitions and mapping.

/// SQL column types understood by rowkeep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Real,
    Double,
    Text,
    Blob,
    Json,
    /// Verbatim type name supplied through `#[rowkeep(sql_type = "...")]`
    Custom(&'static str),
}

impl SqlType {
    /// Get the SQL type name used in DDL.
    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
            SqlType::Json => "JSON",
            SqlType::Custom(name) => name,
        }
    }

    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::Integer | SqlType::BigInt | SqlType::Real | SqlType::Double
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_names() {
        assert_eq!(SqlType::Text.sql_name(), "TEXT");
        assert_eq!(SqlType::Custom("VARCHAR(64)").sql_name(), "VARCHAR(64)");
        assert!(SqlType::BigInt.is_numeric());
        assert!(!SqlType::Blob.is_numeric());
    }
}
