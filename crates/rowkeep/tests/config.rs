//! Building a database from configuration.

use rowkeep::prelude::*;

#[derive(Record, Debug, PartialEq)]
struct Note {
    id: i64,
    body: String,
}

#[test]
fn sqlite_database_from_json_config() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let dsn = dir.path().join("notes.db").to_string_lossy().into_owned();
    let json = serde_json::json!({ "dsn": dsn, "busy_timeout_ms": 250 }).to_string();

    let config = DatabaseConfig::from_json(&json).expect("parse config");
    let db = SqliteDatabase::sqlite(&config);
    assert_eq!(db.dsn(), dsn);
    assert_eq!(db.factory().busy_timeout_ms, 250);

    db.auto_migrate(&[Note::shape()]).expect("migrate");
    let mut note = Note {
        id: 0,
        body: "hello".to_string(),
    };
    db.create(&mut note).expect("create note");
    assert_eq!(db.get::<Note>(note.id).expect("get note"), note);
}

#[test]
fn invalid_config_is_a_config_error() {
    let err = DatabaseConfig::from_json("{\"busy_timeout_ms\": -1}").expect_err("invalid");
    assert!(matches!(err, Error::Config(_)));
}
