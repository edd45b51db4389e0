//! End-to-end scenarios against a `people(first_name, last_name, age)` table


use anyhow::Result;
use common::*;
use rowbind::{Error, Null};

#[test]
fn test_sum_of_ages() -> Result<()> {
    let db = seeded_people_db()?;
    assert_eq!(db.select::<i64, _>("SELECT SUM(age) FROM people", ())?, 50);
    Ok(())
}

#[test]
fn test_select_tuple_with_argument() -> Result<()> {
    let db = seeded_people_db()?;
    let row: (String, String, i64) = db.select("SELECT * FROM people WHERE age < ?", 25)?;
    assert_eq!(row, ("John".to_owned(), "Doe".to_owned(), 20));
    Ok(())
}

#[test]
fn test_select_records_in_insertion_order() -> Result<()> {
    let db = seeded_people_db()?;
    let people: Vec<Person> = db.select_all("SELECT * FROM people", ())?;
    assert_eq!(people, [Person::new("John", "Doe", 20), Person::new("Jane", "Doe", 30)]);
    Ok(())
}

#[test]
fn test_insert_record_through_named_parameters() -> Result<()> {
    let db = people_db()?;
    let jane = Person::new("Jane", "Doe", 30);
    // column order in the SQL differs from field order
    db.exec("INSERT INTO people (age, last_name, first_name) VALUES (:age, :last_name, :first_name)", &jane)?;

    let stored: Person = db.select("SELECT first_name, last_name, age FROM people WHERE first_name = ?", "Jane")?;
    assert_eq!(stored, jane);
    Ok(())
}

#[test]
fn test_insert_tuple_and_pair_arguments() -> Result<()> {
    let db = people_db()?;
    db.exec("INSERT INTO people (first_name, last_name, age) VALUES (?, ?, ?)", (("Other", "Doe", 10),))?;
    db.exec("INSERT INTO people (first_name, last_name, age) VALUES (?, ?, ?)", (("Solo", Null), 15))?;

    let rows: Vec<(String, Option<String>, i64)> = db.select_all("SELECT * FROM people ORDER BY age", ())?;
    assert_eq!(rows, [("Other".to_owned(), Some("Doe".to_owned()), 10), ("Solo".to_owned(), None, 15)]);
    Ok(())
}

#[test]
fn test_select_pairs_into_existing_vec() -> Result<()> {
    let db = seeded_people_db()?;
    let mut names = vec![("stale".to_owned(), "entry".to_owned())];
    db.select_all_into(&mut names, "SELECT first_name, last_name FROM people", ())?;
    assert_eq!(names, [("John".to_owned(), "Doe".to_owned()), ("Jane".to_owned(), "Doe".to_owned())]);
    Ok(())
}

#[test]
fn test_empty_select_into_vec_clears_it() -> Result<()> {
    let db = seeded_people_db()?;
    let mut people = vec![Person::new("Stale", "Entry", 99)];
    db.select_all_into(&mut people, "SELECT * FROM people WHERE age > ?", 100)?;
    assert!(people.is_empty());
    Ok(())
}

#[test]
fn test_single_select_on_empty_result_is_no_row() -> Result<()> {
    let db = seeded_people_db()?;
    let mut person = Person::new("Unchanged", "Person", 1);
    let err = db.select_into(&mut person, "SELECT * FROM people WHERE age > ?", 100).unwrap_err();
    assert!(matches!(err, Error::NoRow));
    assert_eq!(person, Person::new("Unchanged", "Person", 1));
    Ok(())
}

#[test]
fn test_callback_over_rows() -> Result<()> {
    let db = seeded_people_db()?;
    let mut total_age = 0;
    db.query("SELECT age FROM people", ())?.exec_with(|age: i64| total_age += age)?;
    assert_eq!(total_age, 50);

    let mut labels = Vec::new();
    db.query("SELECT first_name, age FROM people WHERE last_name = ?", "Doe")?
        .exec_with(|(name, age): (String, i64)| labels.push(format!("{name} is {age}")))?;
    assert_eq!(labels, ["John is 20", "Jane is 30"]);
    Ok(())
}

#[test]
fn test_nullable_columns() -> Result<()> {
    let db = seeded_people_db()?;
    db.exec("INSERT INTO people (first_name, last_name, age) VALUES (?, ?, ?)", ("Other", None::<String>, 15))?;

    let rows: Vec<(String, Option<String>)> = db.select_all("SELECT first_name, last_name FROM people", ())?;
    let without_last_name: Vec<&str> = rows.iter().filter(|(_, last)| last.is_none()).map(|(first, _)| first.as_str()).collect();
    assert_eq!(without_last_name, ["Other"]);

    db.exec("DELETE FROM people WHERE last_name IS NULL", ())?;
    assert_eq!(db.select::<i64, _>("SELECT COUNT(*) FROM people", ())?, 2);
    Ok(())
}

#[test]
fn test_manual_step_loop() -> Result<()> {
    let db = seeded_people_db()?;
    let mut stmt = db.query("SELECT first_name FROM people", ())?;
    let mut names = Vec::new();
    while stmt.step()? {
        names.push(stmt.get::<String>(0)?);
    }
    assert_eq!(names, ["John", "Jane"]);
    Ok(())
}

#[test]
fn test_statement_to_keeps_statement_usable() -> Result<()> {
    let db = seeded_people_db()?;
    let mut first = String::new();
    let mut second = String::new();

    let mut stmt = db.query("SELECT first_name FROM people ORDER BY age", ())?;
    stmt.to(&mut first)?.to(&mut second)?;
    assert_eq!((first.as_str(), second.as_str()), ("John", "Jane"));
    assert!(matches!(stmt.fetch::<String>(), Err(Error::NoRow)));
    Ok(())
}

#[test]
fn test_reuse_statement_after_reset() -> Result<()> {
    let db = people_db()?;
    let mut insert = db.prepare("INSERT INTO people (first_name, last_name, age) VALUES (?, ?, ?)")?;
    for person in [Person::new("A", "One", 1), Person::new("B", "Two", 2), Person::new("C", "Three", 3)] {
        insert.bind(&(&person.first_name, &person.last_name, person.age))?.exec()?;
        insert.reset()?;
    }
    drop(insert);

    assert_eq!(db.select::<i64, _>("SELECT SUM(age) FROM people", ())?, 6);
    Ok(())
}

#[test]
fn test_rows_iterator() -> Result<()> {
    let db = seeded_people_db()?;
    let mut stmt = db.query("SELECT * FROM people WHERE last_name = ?", "Doe")?;
    let ages = stmt.rows::<Person>().map(|person| person.map(|p| p.age)).collect::<rowbind::Result<Vec<_>>>()?;
    assert_eq!(ages, [20, 30]);
    Ok(())
}

#[test]
fn test_constraint_failure_propagates() -> Result<()> {
    let db = rowbind::Database::memory()?;
    db.exec("CREATE TABLE people(first_name TEXT NOT NULL UNIQUE)", ())?;
    db.exec("INSERT INTO people VALUES (?)", "John")?;

    let err = db.exec("INSERT INTO people VALUES (?)", "John").unwrap_err();
    match err {
        Error::Engine { message, .. } => assert!(message.contains("UNIQUE"), "unexpected message: {message}"),
        other => panic!("expected engine error, got {other:?}"),
    }
    Ok(())
}
