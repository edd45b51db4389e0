//! Typed parameter binding and row decoding for SQLite
//!
//! `rowbind` sits directly on top of the SQLite statement API and moves values
//! across it without per-query conversion code:
//!
//! - **Encoding**: any [`Encode`] value can be bound to a statement parameter,
//!   either at an explicit index, by name, or sequentially through the
//!   statement's parameter cursor.
//! - **Decoding**: any [`Decode`] type can be read out of the current row,
//!   starting at a column index and spanning [`Decode::WIDTH`] columns.
//!
//! Scalars, `Option<T>`, tuples up to twelve elements and user records (by hand
//! or with `#[derive(Record)]` behind the `derive` feature) all speak the same
//! two traits, so they compose freely.
//!
//! # Example
//!
//! ```rust
//! use rowbind::Database;
//!
//! # fn main() -> rowbind::Result<()> {
//! let db = Database::memory()?;
//! db.exec("CREATE TABLE people(first_name TEXT, last_name TEXT, age INTEGER)", ())?;
//!
//! // one argument per parameter
//! db.exec("INSERT INTO people VALUES (?, ?, ?)", ("John", "Doe", 20))?;
//! // a tuple argument expands into one bind per element
//! db.exec("INSERT INTO people VALUES (?, ?, ?)", (("Jane", "Doe"), 30))?;
//!
//! let total: i64 = db.select("SELECT SUM(age) FROM people", ())?;
//! assert_eq!(total, 50);
//!
//! let young: (String, String, i64) = db.select("SELECT * FROM people WHERE age < ?", 25)?;
//! assert_eq!(young, ("John".to_owned(), "Doe".to_owned(), 20));
//!
//! let names: Vec<(String, Option<String>)> = db.select_all("SELECT first_name, last_name FROM people", ())?;
//! assert_eq!(names.len(), 2);
//! # Ok(())
//! # }
//! ```

mod config;
mod convert;
mod cursor;
mod database;
mod error;
mod rows;
mod statement;
mod value;

pub use config::{default_flags, DatabaseConfig, Target};
pub use convert::{Convertible, Decode, Encode};
pub use cursor::ParamCursor;
pub use database::Database;
pub use error::{Error, Result};
pub use rows::Rows;
pub use statement::Statement;
pub use value::{ColumnType, Null, Value};

pub use rusqlite::OpenFlags;

#[cfg(feature = "derive")]
pub use rowbind_derive::Record;
