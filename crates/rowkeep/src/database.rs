//! The database facade.
//!
//! A [`Database`] holds nothing but a DSN and a dialector factory. Every
//! operation opens its own connection through the factory, runs, and drops
//! the connection before returning.

use rowkeep_core::{
    Connection, DatabaseConfig, Dialector, DialectorFactory, Error, Filter, Record, Result,
    TableShape,
};
use rowkeep_query::{DeleteBuilder, InsertBuilder, SelectBuilder, UpsertBuilder};
use rowkeep_schema::MigrationReport;

/// The connection type opened by factory `F`.
pub type ConnectionOf<F> = <<F as DialectorFactory>::Dialector as Dialector>::Connection;

/// Generic CRUD over any [`Record`] type.
///
/// ```ignore
/// use rowkeep::{Database, Filter, Record, SqliteDialectorFactory};
///
/// #[derive(Record)]
/// struct Person {
///     id: Option<i64>,
///     firstname: String,
///     surname: String,
/// }
///
/// let db = Database::new("people.db", SqliteDialectorFactory::default());
/// db.auto_migrate(&[Person::shape()])?;
///
/// let mut p = Person { id: None, firstname: "Michael".into(), surname: "Cunningham".into() };
/// db.create(&mut p)?;
/// let johns: Vec<Person> = db.query(&Filter::new().eq("firstname", "John"))?;
/// ```
#[derive(Debug, Clone)]
pub struct Database<F: DialectorFactory> {
    dsn: String,
    factory: F,
}

impl<F: DialectorFactory> Database<F> {
    /// Create a facade for `dsn`, opening connections through `factory`.
    pub fn new(dsn: impl Into<String>, factory: F) -> Self {
        Self {
            dsn: dsn.into(),
            factory,
        }
    }

    /// Create a facade from a loaded configuration.
    pub fn from_config(config: &DatabaseConfig, factory: F) -> Self {
        Self::new(config.dsn.clone(), factory)
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Open a new connection to the store.
    ///
    /// # Errors
    ///
    /// `Error::Connection` when the engine cannot open the store.
    pub fn connect(&self) -> Result<ConnectionOf<F>> {
        let dialector = self.factory.create(&self.dsn);
        tracing::trace!(dialector = dialector.name(), dsn = %self.dsn, "connecting");
        dialector.open()
    }

    /// Insert a new record and store the assigned identity on it.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = R::TABLE_NAME))]
    pub fn create<R: Record>(&self, record: &mut R) -> Result<()> {
        let conn = self.connect()?;
        let id = InsertBuilder::new(&*record).execute(&conn)?;
        record.set_id(id);
        tracing::debug!(id, "created");
        Ok(())
    }

    /// Insert every record in one transaction.
    ///
    /// Either all records are stored and receive identities, or none are.
    #[tracing::instrument(level = "debug", skip(self, records), fields(table = R::TABLE_NAME, count = records.len()))]
    pub fn create_many<R: Record>(&self, records: &mut [R]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let conn = self.connect()?;
        let ids = conn.transaction(|conn| {
            records
                .iter()
                .map(|record| InsertBuilder::new(record).execute(conn))
                .collect::<Result<Vec<_>>>()
        })?;

        for (record, id) in records.iter_mut().zip(ids) {
            record.set_id(id);
        }
        tracing::debug!(rows = records.len(), "created");
        Ok(())
    }

    /// Save the full state of a record.
    ///
    /// An unsaved record is inserted. A saved record overwrites the row with
    /// its identity, which is recreated if it no longer exists.
    #[tracing::instrument(level = "debug", skip(self, record), fields(table = R::TABLE_NAME, id = record.id()))]
    pub fn update<R: Record>(&self, record: &mut R) -> Result<()> {
        if record.is_new() {
            return self.create(record);
        }

        let conn = self.connect()?;
        let id = UpsertBuilder::new(&*record).execute(&conn)?;
        tracing::debug!(id, "saved");
        Ok(())
    }

    /// Load the record with identity `id`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no row has that identity.
    #[tracing::instrument(level = "debug", skip(self), fields(table = R::TABLE_NAME))]
    pub fn get<R: Record>(&self, id: i64) -> Result<R> {
        let conn = self.connect()?;
        SelectBuilder::<R>::by_id(id)
            .first(&conn)?
            .ok_or_else(|| Error::not_found(R::TABLE_NAME, Some(id)))
    }

    /// Delete the row backing `record`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when the record is unsaved or no row was deleted.
    pub fn delete<R: Record>(&self, record: &R) -> Result<()> {
        let id = record
            .id()
            .ok_or_else(|| Error::not_found(R::TABLE_NAME, None))?;
        self.delete_by_id::<R>(id)
    }

    /// Delete the row with identity `id`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when no row was deleted.
    #[tracing::instrument(level = "debug", skip(self), fields(table = R::TABLE_NAME))]
    pub fn delete_by_id<R: Record>(&self, id: i64) -> Result<()> {
        let conn = self.connect()?;
        let rows = DeleteBuilder::<R>::by_id(id).execute(&conn)?;

        match rows {
            0 => Err(Error::not_found(R::TABLE_NAME, Some(id))),
            1 => {
                tracing::debug!(rows, "deleted");
                Ok(())
            }
            _ => {
                tracing::warn!(rows, id, "delete by identity removed more than one row");
                Ok(())
            }
        }
    }

    /// Load every record whose columns equal all entries of `filter`.
    ///
    /// Results are ordered by identity. No match is an empty vector.
    ///
    /// # Errors
    ///
    /// `Error::Persistence` with kind `UnknownColumn` when `filter` names a
    /// column `R` does not have. Connection failures are returned, not
    /// swallowed.
    #[tracing::instrument(level = "debug", skip(self, filter), fields(table = R::TABLE_NAME, filter = filter.len()))]
    pub fn query<R: Record>(&self, filter: &Filter) -> Result<Vec<R>> {
        let select = SelectBuilder::<R>::matching(filter)?;
        let conn = self.connect()?;
        let records = select.all(&conn)?;
        tracing::debug!(rows = records.len(), "queried");
        Ok(records)
    }

    /// Create missing tables and columns for `shapes`.
    ///
    /// Nothing is ever dropped; see [`rowkeep_schema::auto_migrate`].
    #[tracing::instrument(level = "debug", skip(self, shapes), fields(tables = shapes.len()))]
    pub fn auto_migrate(&self, shapes: &[TableShape]) -> Result<MigrationReport> {
        let conn = self.connect()?;
        let report = rowkeep_schema::auto_migrate(&conn, shapes)?;
        tracing::debug!(
            created = report.created_tables.len(),
            added = report.added_columns.len(),
            "migrated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_core::{ConnectionError, ConnectionErrorKind, Row, Value};
    use std::cell::Cell;

    /// A store where every statement succeeds and deletes hit `deleted` rows.
    struct Scripted {
        deleted: u64,
    }

    impl Connection for Scripted {
        fn query(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }
        fn execute(&self, _sql: &str, _params: &[Value]) -> Result<u64> {
            Ok(self.deleted)
        }
        fn insert(&self, _sql: &str, _params: &[Value]) -> Result<i64> {
            Ok(1)
        }
        fn execute_raw(&self, _sql: &str) -> Result<()> {
            Ok(())
        }
    }

    struct ScriptedDialector {
        deleted: u64,
        opens: std::rc::Rc<Cell<u32>>,
    }

    impl Dialector for ScriptedDialector {
        type Connection = Scripted;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn dsn(&self) -> &str {
            "scripted"
        }

        fn open(&self) -> Result<Scripted> {
            self.opens.set(self.opens.get() + 1);
            Ok(Scripted {
                deleted: self.deleted,
            })
        }
    }

    struct ScriptedFactory {
        deleted: u64,
        opens: std::rc::Rc<Cell<u32>>,
    }

    impl ScriptedFactory {
        fn deleting(deleted: u64) -> Self {
            Self {
                deleted,
                opens: std::rc::Rc::default(),
            }
        }
    }

    impl DialectorFactory for ScriptedFactory {
        type Dialector = ScriptedDialector;

        fn create(&self, _dsn: &str) -> ScriptedDialector {
            ScriptedDialector {
                deleted: self.deleted,
                opens: std::rc::Rc::clone(&self.opens),
            }
        }
    }

    struct Closed;

    impl DialectorFactory for Closed {
        type Dialector = ClosedDialector;

        fn create(&self, dsn: &str) -> ClosedDialector {
            ClosedDialector(dsn.to_string())
        }
    }

    struct ClosedDialector(String);

    impl Dialector for ClosedDialector {
        type Connection = Scripted;

        fn name(&self) -> &'static str {
            "closed"
        }

        fn dsn(&self) -> &str {
            &self.0
        }

        fn open(&self) -> Result<Scripted> {
            Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Open,
                dsn: Some(self.0.clone()),
                message: "store is offline".to_string(),
                source: None,
            }))
        }
    }

    #[derive(rowkeep_macros::Record, Debug)]
    struct Person {
        id: Option<i64>,
        firstname: String,
    }

    fn john() -> Person {
        Person {
            id: None,
            firstname: "John".to_string(),
        }
    }

    #[test]
    fn test_delete_more_than_one_row_is_success() {
        let db = Database::new("scripted", ScriptedFactory::deleting(2));
        db.delete_by_id::<Person>(1).unwrap();
    }

    #[test]
    fn test_delete_zero_rows_is_not_found() {
        let db = Database::new("scripted", ScriptedFactory::deleting(0));
        let err = db.delete_by_id::<Person>(1_230_123).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "record not found: people with id 1230123");
    }

    #[test]
    fn test_delete_unsaved_record_is_not_found() {
        let factory = ScriptedFactory::deleting(1);
        let opens = std::rc::Rc::clone(&factory.opens);
        let db = Database::new("scripted", factory);

        assert!(db.delete(&john()).unwrap_err().is_not_found());
        assert_eq!(opens.get(), 0);
    }

    #[test]
    fn test_each_operation_opens_a_connection() {
        let factory = ScriptedFactory::deleting(1);
        let opens = std::rc::Rc::clone(&factory.opens);
        let db = Database::new("scripted", factory);

        let mut person = john();
        db.create(&mut person).unwrap();
        assert_eq!(person.id, Some(1));
        let _: Vec<Person> = db.query(&Filter::new()).unwrap();
        db.delete(&person).unwrap();
        assert_eq!(opens.get(), 3);
    }

    #[test]
    fn test_create_many_empty_is_noop() {
        let factory = ScriptedFactory::deleting(0);
        let opens = std::rc::Rc::clone(&factory.opens);
        let db = Database::new("scripted", factory);

        db.create_many::<Person>(&mut []).unwrap();
        assert_eq!(opens.get(), 0);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let db = Database::new("scripted", ScriptedFactory::deleting(0));
        let err = db.get::<Person>(5).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_connection_errors_propagate() {
        let db = Database::new("offline", Closed);

        assert!(db.create(&mut john()).unwrap_err().is_connection_error());
        assert!(db.get::<Person>(1).unwrap_err().is_connection_error());
        assert!(
            db.query::<Person>(&Filter::new())
                .unwrap_err()
                .is_connection_error()
        );
        assert!(db.auto_migrate(&[Person::shape()]).unwrap_err().is_connection_error());
    }

    #[test]
    fn test_unknown_filter_column_fails_before_connecting() {
        let db = Database::new("offline", Closed);
        let err = db
            .query::<Person>(&Filter::new().eq("nickname", "Johnny"))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
