//! Error types for statement binding and row decoding

use std::ffi::{c_int, CStr, NulError};

use rusqlite::ffi;
use thiserror::Error;

use crate::value::ColumnType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error {code}: {message}")]
    Engine { code: c_int, message: String },

    #[error("Query returned no rows")]
    NoRow,

    #[error("Statement is not positioned on a row")]
    NoCurrentRow,

    #[error("Column {column} out of range (row has {count} columns)")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("Cannot decode column {column} as {expected}: stored type is {found}")]
    TypeMismatch { column: usize, expected: &'static str, found: ColumnType },

    #[error("Integer {value} out of range for {target}")]
    IntegerOutOfRange { value: i128, target: &'static str },

    #[error("Column {column} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        column: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("No parameter named '{0}'")]
    UnknownParameter(String),

    #[error("String contains an interior NUL byte: {0}")]
    Nul(#[from] NulError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Builds an engine error for `code`, using SQLite's generic text for the code
    pub fn from_code(code: c_int) -> Self {
        // sqlite3_errstr returns a pointer to a static string
        let message = unsafe { CStr::from_ptr(ffi::sqlite3_errstr(code)) }.to_string_lossy().into_owned();
        Error::Engine { code, message }
    }

    /// True for failures converting between a column and a Rust value
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. } | Error::IntegerOutOfRange { .. } | Error::InvalidUtf8 { .. })
    }

    /// The SQLite result code, when the error came from the engine
    pub fn code(&self) -> Option<c_int> {
        match self {
            Error::Engine { code, .. } => Some(*code),
            Error::Open { source: rusqlite::Error::SqliteFailure(err, _), .. } | Error::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                Some(err.extended_code)
            }
            _ => None,
        }
    }
}
