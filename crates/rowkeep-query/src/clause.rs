//! WHERE clause construction.

use rowkeep_core::{Error, Filter, PersistenceErrorKind, Record, Result, Value, quote_ident};

/// Numbered placeholder for SQLite (`?1`, `?2`, ...).
pub fn placeholder(index: usize) -> String {
    format!("?{index}")
}

/// A conjunction of equality predicates.
#[derive(Debug, Clone, Default)]
pub struct Where {
    conditions: Vec<(String, Value)>,
}

impl Where {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column = value` (or `column IS NULL` for `Value::Null`).
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    /// Build from a filter, rejecting columns `R` does not have.
    pub fn from_filter<R: Record>(filter: &Filter) -> Result<Self> {
        if let Some(unknown) = filter.columns().find(|c| !R::has_column(c)) {
            return Err(Error::persistence(
                PersistenceErrorKind::UnknownColumn,
                None,
                format!("no such column in {}: {}", R::TABLE_NAME, unknown),
            ));
        }
        Ok(filter
            .iter()
            .fold(Self::new(), |w, (column, value)| w.eq(column, value.clone())))
    }

    /// Render the clause body (without the `WHERE` keyword).
    ///
    /// Placeholders are numbered after `offset` existing parameters.
    pub fn build(&self, offset: usize) -> (String, Vec<Value>) {
        let mut parts = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::new();

        for (column, value) in &self.conditions {
            if value.is_null() {
                parts.push(format!("{} IS NULL", quote_ident(column)));
            } else {
                params.push(value.clone());
                parts.push(format!(
                    "{} = {}",
                    quote_ident(column),
                    placeholder(offset + params.len())
                ));
            }
        }

        (parts.join(" AND "), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_numbers_after_offset() {
        let (sql, params) = Where::new().eq("firstname", "John").eq("surname", "Doe").build(2);
        assert_eq!(sql, "\"firstname\" = ?3 AND \"surname\" = ?4");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_null_becomes_is_null() {
        let (sql, params) = Where::new()
            .eq("nickname", Value::Null)
            .eq("firstname", "John")
            .build(0);
        assert_eq!(sql, "\"nickname\" IS NULL AND \"firstname\" = ?1");
        assert_eq!(params, vec![Value::from("John")]);
    }
}
