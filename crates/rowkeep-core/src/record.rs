//! Record trait for struct-to-table mapping.
//!
//! A `Record` is any struct with a store-assigned numeric identity plus
//! arbitrary data fields. It is normally derived with `#[derive(Record)]`
//! from `rowkeep-macros`.

use crate::Result;
use crate::field::{FieldInfo, TableShape};
use crate::row::Row;
use crate::value::Value;

/// Trait for types that can be persisted through the database facade.
///
/// # Example
///
/// ```ignore
/// use rowkeep::Record;
///
/// #[derive(Record)]
/// struct Person {
///     id: Option<i64>,
///     firstname: String,
///     surname: String,
/// }
///
/// assert_eq!(Person::TABLE_NAME, "people");
/// ```
pub trait Record: Sized + Send + Sync {
    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The identity column.
    const ID_COLUMN: &'static str = "id";

    /// Field metadata for every persisted column, identity included.
    fn fields() -> &'static [FieldInfo];

    /// Convert this instance to `(column, value)` pairs, identity included.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Construct an instance from a database row.
    fn from_row(row: &Row) -> Result<Self>;

    /// The store-assigned identity, or `None` while the record is unsaved.
    fn id(&self) -> Option<i64>;

    /// Record the identity assigned by the store after an insert.
    fn set_id(&mut self, id: i64);

    /// Whether the record has never been persisted.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Structural description of this record's table.
    fn shape() -> TableShape {
        TableShape::new(Self::TABLE_NAME, Self::ID_COLUMN, Self::fields())
    }

    /// Check whether `column` is one of this record's columns.
    fn has_column(column: &str) -> bool {
        Self::fields().iter().any(|f| f.column_name == column)
    }
}
