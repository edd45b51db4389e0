//! SQLite storage classes and an owned dynamic value

use std::ffi::c_int;
use std::fmt;

use rusqlite::ffi;

/// Storage class of a column in the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    pub(crate) fn from_raw(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Float,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }

    /// The SQLite name of the storage class
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Blob => "BLOB",
            ColumnType::Null => "NULL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// The NULL marker. Binding it stores NULL. Decoding it accepts any column,
/// or only a NULL column under strict types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Null;

/// An owned SQLite value of any storage class
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::Null,
            Value::Integer(_) => ColumnType::Integer,
            Value::Real(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::Text,
            Value::Blob(_) => ColumnType::Blob,
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self { Value::Integer(value) }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self { Value::Real(value) }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self { Value::Integer(value as i64) }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::Text(value) }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::Text(value.to_owned()) }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self { Value::Blob(value) }
}

impl From<Null> for Value {
    fn from(_: Null) -> Self { Value::Null }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
