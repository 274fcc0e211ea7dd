//! End-to-end CRUD against a SQLite file.

use rowkeep::prelude::*;
use rowkeep::{PersistenceError, PersistenceErrorKind};
use tempfile::TempDir;

#[derive(Record, Debug, Clone, PartialEq)]
struct Person {
    id: Option<i64>,
    firstname: String,
    surname: String,
}

impl Person {
    fn new(firstname: &str, surname: &str) -> Self {
        Self {
            id: None,
            firstname: firstname.to_string(),
            surname: surname.to_string(),
        }
    }
}

/// A migrated database in a directory removed when the test ends.
fn open_db() -> (TempDir, SqliteDatabase) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("people.db");
    let db = Database::new(
        path.to_string_lossy().into_owned(),
        SqliteDialectorFactory::default(),
    );
    db.auto_migrate(&[Person::shape()])
        .expect("migrate people table");
    (dir, db)
}

#[test]
fn create_then_get_returns_same_record() {
    let (_dir, db) = open_db();

    let mut michael = Person::new("Michael", "Cunningham");
    db.create(&mut michael).expect("create Michael");
    let id = michael.id.expect("identity assigned on create");

    let loaded: Person = db.get(id).expect("get Michael");
    assert_eq!(loaded, michael);
}

#[test]
fn query_by_firstname_returns_every_match() {
    let (_dir, db) = open_db();

    let mut doe = Person::new("John", "Doe");
    let mut smith = Person::new("John", "Smith");
    let mut jane = Person::new("Jane", "Doe");
    db.create(&mut doe).expect("create John Doe");
    db.create(&mut smith).expect("create John Smith");
    db.create(&mut jane).expect("create Jane Doe");

    let johns: Vec<Person> = db
        .query(&Filter::new().eq("firstname", "John"))
        .expect("query by firstname");
    assert_eq!(johns, vec![doe.clone(), smith]);

    let by_id: Vec<Person> = db
        .query(&Filter::new().eq("id", doe.id))
        .expect("query by id");
    assert_eq!(by_id, vec![doe]);
}

#[test]
fn query_combines_entries_with_and() {
    let (_dir, db) = open_db();

    let mut people = vec![
        Person::new("John", "Doe"),
        Person::new("John", "Smith"),
        Person::new("Jane", "Doe"),
    ];
    db.create_many(&mut people).expect("create people");

    let filter = Filter::new().eq("firstname", "John").eq("surname", "Doe");
    let found: Vec<Person> = db.query(&filter).expect("query");
    assert_eq!(found, vec![people[0].clone()]);
}

#[test]
fn query_accepts_json_filters() {
    let (_dir, db) = open_db();

    let mut john = Person::new("John", "Doe");
    db.create(&mut john).expect("create John");

    let filter: Filter =
        serde_json::from_str(r#"{"firstname": "John", "surname": "Doe"}"#).expect("parse filter");
    let found: Vec<Person> = db.query(&filter).expect("query");
    assert_eq!(found.len(), 1);
}

#[test]
fn query_without_matches_is_empty() {
    let (_dir, db) = open_db();

    let nobody: Vec<Person> = db
        .query(&Filter::new().eq("firstname", "Nobody"))
        .expect("query");
    assert!(nobody.is_empty());
}

#[test]
fn empty_filter_returns_all_in_identity_order() {
    let (_dir, db) = open_db();

    let mut people = vec![Person::new("B", "b"), Person::new("A", "a")];
    db.create_many(&mut people).expect("create people");

    let all: Vec<Person> = db.query(&Filter::new()).expect("query all");
    assert_eq!(all, people);
    assert!(all[0].id < all[1].id);
}

#[test]
fn query_rejects_unknown_columns() {
    let (_dir, db) = open_db();

    let err = db
        .query::<Person>(&Filter::new().eq("nickname", "Johnny"))
        .expect_err("unknown column must fail");
    assert!(matches!(
        err,
        Error::Persistence(PersistenceError {
            kind: PersistenceErrorKind::UnknownColumn,
            ..
        })
    ));
}

#[test]
fn update_then_get_reflects_changes() {
    let (_dir, db) = open_db();

    let mut john = Person::new("Michael", "Mitchell");
    db.create(&mut john).expect("create Michael");
    let id = john.id.expect("id");

    john.firstname = "John".to_string();
    john.surname = "Bloomberg".to_string();
    db.update(&mut john).expect("update to John Bloomberg");
    assert_eq!(john.id, Some(id));

    let loaded: Person = db.get(id).expect("get John");
    assert_eq!(loaded, john);

    let mitchells: Vec<Person> = db
        .query(&Filter::new().eq("surname", "Mitchell"))
        .expect("query old surname");
    assert!(mitchells.is_empty());
}

#[test]
fn update_of_unsaved_record_inserts_it() {
    let (_dir, db) = open_db();

    let mut fresh = Person::new("Ada", "Lovelace");
    db.update(&mut fresh).expect("save new record");

    let loaded: Person = db.get(fresh.id.expect("id assigned")).expect("get Ada");
    assert_eq!(loaded, fresh);
}

#[test]
fn delete_then_query_by_id_is_empty() {
    let (_dir, db) = open_db();

    let mut samuel = Person::new("Samuel L.", "Jackson");
    db.create(&mut samuel).expect("create Samuel");

    db.delete(&samuel).expect("delete Samuel");

    let remaining: Vec<Person> = db
        .query(&Filter::new().eq("id", samuel.id))
        .expect("query by id");
    assert!(remaining.is_empty());

    let err = db
        .get::<Person>(samuel.id.expect("id"))
        .expect_err("deleted record must be gone");
    assert!(err.is_not_found());
}

#[test]
fn delete_missing_identity_is_not_found() {
    let (_dir, db) = open_db();

    let err = db
        .delete_by_id::<Person>(1_230_123)
        .expect_err("nothing to delete");
    assert!(err.is_not_found());
}

#[test]
fn delete_twice_is_not_found() {
    let (_dir, db) = open_db();

    let mut john = Person::new("John", "Doe");
    db.create(&mut john).expect("create John");
    db.delete(&john).expect("first delete");

    assert!(db.delete(&john).expect_err("second delete").is_not_found());
}

#[test]
fn identities_are_not_reused_after_delete() {
    let (_dir, db) = open_db();

    let mut first = Person::new("A", "a");
    db.create(&mut first).expect("create");
    db.delete(&first).expect("delete");

    let mut second = Person::new("B", "b");
    db.create(&mut second).expect("create");
    assert!(second.id > first.id);
}

#[test]
fn database_is_stateless_between_calls() {
    let (dir, db) = open_db();

    let mut john = Person::new("John", "Doe");
    db.create(&mut john).expect("create John");

    // A second facade over the same file sees the same rows.
    let other = Database::new(
        dir.path().join("people.db").to_string_lossy().into_owned(),
        SqliteDialectorFactory::default(),
    );
    let loaded: Person = other.get(john.id.expect("id")).expect("get John");
    assert_eq!(loaded, john);
}
