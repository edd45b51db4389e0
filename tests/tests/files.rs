//! File-backed databases, open flags and configuration


use std::time::Duration;

use anyhow::Result;
use rowbind::{default_flags, Database, DatabaseConfig, Error, OpenFlags, Target};
use tempfile::TempDir;

fn create_people(path: &std::path::Path) -> Result<()> {
    let db = Database::open_default(path)?;
    db.exec("CREATE TABLE people(first_name TEXT, last_name TEXT, age INTEGER)", ())?;
    db.exec("INSERT INTO people VALUES (?, ?, ?)", ("John", "Doe", 20))?;
    Ok(())
}

#[test]
fn test_data_persists_across_handles() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("people.db");
    create_people(&path)?;

    let db = Database::open(&path, default_flags())?;
    assert_eq!(db.select::<String, _>("SELECT first_name FROM people", ())?, "John");
    Ok(())
}

#[test]
fn test_read_only_handle_rejects_writes() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("people.db");
    create_people(&path)?;

    let db = Database::open(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    assert_eq!(db.flags(), OpenFlags::SQLITE_OPEN_READ_ONLY);
    assert_eq!(db.select::<i64, _>("SELECT COUNT(*) FROM people", ())?, 1);

    match db.exec("INSERT INTO people VALUES (?, ?, ?)", ("Jane", "Doe", 30)) {
        Err(Error::Engine { code, .. }) => assert_eq!(code & 0xff, rusqlite::ffi::SQLITE_READONLY),
        other => panic!("expected read-only error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_open_without_create_fails_for_missing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missing.db");

    let err = Database::open(&path, OpenFlags::SQLITE_OPEN_READ_WRITE).unwrap_err();
    assert!(matches!(err, Error::Open { .. }), "unexpected error: {err:?}");
    assert!(err.to_string().contains("missing.db"));
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_config_is_kept_on_the_handle() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("strict.db");
    let config = DatabaseConfig::file(&path).strict().busy_timeout(Duration::from_millis(250));

    let db = Database::open_with(config)?;
    assert_eq!(db.config().target, Target::File(path.clone()));
    assert!(db.config().strict_names && db.config().strict_types);
    assert_eq!(db.config().busy_timeout, Some(Duration::from_millis(250)));
    assert!(path.exists());
    Ok(())
}

#[test]
fn test_strict_types_reject_lossy_reads() -> Result<()> {
    let dir = TempDir::new()?;
    let db = Database::open_with(DatabaseConfig::file(dir.path().join("types.db")).strict_types(true))?;
    db.exec("CREATE TABLE t(name TEXT, age INTEGER)", ())?;
    db.exec("INSERT INTO t VALUES (?, ?)", ("John", 20))?;

    let err = db.select::<i64, _>("SELECT name FROM t", ()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { column: 0, .. }), "unexpected error: {err:?}");
    assert!(err.is_conversion());

    // NULL still decodes through Option
    assert_eq!(db.select::<Option<i64>, _>("SELECT NULL", ())?, None);
    assert_eq!(db.select::<(String, i64), _>("SELECT name, age FROM t", ())?, ("John".to_owned(), 20));
    Ok(())
}
