//! Database handle: owns the connection and prepares statements

use std::ffi::{c_int, CStr};
use std::path::Path;

use rusqlite::{ffi, Connection, OpenFlags};
use tracing::debug;

use crate::config::{DatabaseConfig, Target};
use crate::convert::{Decode, Encode};
use crate::error::{Error, Result};
use crate::statement::Statement;

/// An open SQLite connection
///
/// The connection is closed when the handle is dropped. Statements borrow the
/// handle, so none can outlive it.
pub struct Database {
    conn: Connection,
    config: DatabaseConfig,
}

impl Database {
    /// Open a database file with explicit open flags
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        Self::open_with(DatabaseConfig::file(path.as_ref()).flags(flags))
    }

    /// Open a database file read-write, creating it if needed
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> { Self::open_with(DatabaseConfig::file(path.as_ref())) }

    /// Open a private in-memory database
    pub fn memory() -> Result<Self> { Self::open_with(DatabaseConfig::memory()) }

    pub fn open_with(config: DatabaseConfig) -> Result<Self> {
        let conn = match &config.target {
            Target::File(path) => Connection::open_with_flags(path, config.flags),
            Target::Memory => Connection::open_in_memory_with_flags(config.flags),
        }
        .map_err(|source| Error::Open { path: config.target.to_string(), source })?;

        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)?;
        }

        debug!(db = %config.target, flags = ?config.flags, "Opened database");
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &DatabaseConfig { &self.config }

    pub fn flags(&self) -> OpenFlags { self.config.flags }

    /// Prepare `sql` without binding anything
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> { Statement::prepare(self, sql) }

    /// Prepare `sql` and bind `args` sequentially from the first parameter
    ///
    /// A tuple binds one parameter per element; `()` binds nothing.
    pub fn query<A: Encode>(&self, sql: &str, args: A) -> Result<Statement<'_>> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind(&args)?;
        Ok(stmt)
    }

    /// Run `sql` to completion, discarding any rows
    pub fn exec<A: Encode>(&self, sql: &str, args: A) -> Result<()> { self.query(sql, args)?.exec() }

    /// Decode the first row into `out`; fails with [`Error::NoRow`] when there is none
    pub fn select_into<T: Decode, A: Encode>(&self, out: &mut T, sql: &str, args: A) -> Result<()> {
        self.query(sql, args)?.to(out)?;
        Ok(())
    }

    /// Decode the first row; fails with [`Error::NoRow`] when there is none
    pub fn select<T: Decode, A: Encode>(&self, sql: &str, args: A) -> Result<T> { self.query(sql, args)?.fetch() }

    /// Replace the contents of `out` with one decoded element per row
    pub fn select_all_into<T: Decode, A: Encode>(&self, out: &mut Vec<T>, sql: &str, args: A) -> Result<()> {
        self.query(sql, args)?.to_vec(out)?;
        Ok(())
    }

    pub fn select_all<T: Decode, A: Encode>(&self, sql: &str, args: A) -> Result<Vec<T>> { self.query(sql, args)?.fetch_all() }

    /// Run a script of one or more statements without parameters
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        debug!(sql, "Executing batch");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn last_insert_rowid(&self) -> i64 { self.conn.last_insert_rowid() }

    /// Rows modified by the most recent INSERT, UPDATE or DELETE
    pub fn changes(&self) -> u64 { self.conn.changes() }

    pub(crate) fn handle(&self) -> *mut ffi::sqlite3 {
        // The pointer stays owned by `conn` and is only used while `self` is borrowed
        unsafe { self.conn.handle() }
    }

    /// Turn a non-success result code into an engine error carrying the connection's message
    pub(crate) fn check(&self, code: c_int) -> Result<()> {
        match code {
            ffi::SQLITE_OK | ffi::SQLITE_ROW | ffi::SQLITE_DONE => Ok(()),
            code => Err(self.engine_error(code)),
        }
    }

    pub(crate) fn engine_error(&self, code: c_int) -> Error {
        let message = unsafe { ffi::sqlite3_errmsg(self.handle()) };
        if message.is_null() {
            return Error::from_code(code);
        }
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        Error::Engine { code, message }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("target", &self.config.target).field("flags", &self.config.flags).finish()
    }
}
