//! Prepared statement handle

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::fmt;
use std::ptr::{self, NonNull};

use rusqlite::ffi;
use tracing::{debug, trace, warn};

use crate::convert::{Decode, Encode};
use crate::cursor::ParamCursor;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::rows::Rows;
use crate::value::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepState {
    /// Freshly prepared or reset
    Ready,
    Row,
    Done,
}

/// One prepared statement
///
/// Parameters are bound sequentially through a [`ParamCursor`], at an explicit
/// 1-based index, or by name. Columns are read from the current row by 0-based
/// index. The underlying statement is finalized on drop.
pub struct Statement<'db> {
    db: &'db Database,
    raw: NonNull<ffi::sqlite3_stmt>,
    cursor: ParamCursor,
    state: StepState,
    strict_names: bool,
    strict_types: bool,
}

impl<'db> Statement<'db> {
    pub(crate) fn prepare(db: &'db Database, sql: &str) -> Result<Self> {
        let len = c_int::try_from(sql.len()).map_err(|_| Error::from_code(ffi::SQLITE_TOOBIG))?;
        let mut raw = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe { ffi::sqlite3_prepare_v2(db.handle(), sql.as_ptr().cast::<c_char>(), len, &mut raw, &mut tail) };
        db.check(rc)?;

        // Blank input or a lone comment compiles to no statement at all
        let raw = NonNull::new(raw).ok_or_else(|| Error::Engine { code: ffi::SQLITE_MISUSE, message: "no SQL statement to prepare".to_owned() })?;

        if !tail.is_null() {
            let consumed = tail as usize - sql.as_ptr() as usize;
            if let Some(rest) = sql.get(consumed..).map(str::trim).filter(|rest| !rest.is_empty()) {
                warn!(ignored = rest, "Only the first SQL statement is prepared");
            }
        }

        debug!(sql, "Prepared statement");
        let config = db.config();
        Ok(Self {
            db,
            raw,
            cursor: ParamCursor::new(),
            state: StepState::Ready,
            strict_names: config.strict_names,
            strict_types: config.strict_types,
        })
    }

    #[inline]
    fn ptr(&self) -> *mut ffi::sqlite3_stmt { self.raw.as_ptr() }

    // -- binding --

    /// Bind `value` at the cursor, advancing it by the number of parameters bound
    pub fn bind<T: Encode + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        value.encode_arguments(self)?;
        Ok(self)
    }

    /// Bind `value` at a 1-based parameter index without moving the cursor
    pub fn bind_at<T: Encode + ?Sized>(&mut self, param: usize, value: &T) -> Result<&mut Self> {
        value.encode(self, param)?;
        Ok(self)
    }

    /// Bind `value` to a named parameter such as `:age`
    ///
    /// On a match the cursor continues after the resolved index. A name the
    /// statement does not contain is skipped, unless the database was opened
    /// with strict names.
    pub fn bind_named<T: Encode + ?Sized>(&mut self, name: &str, value: &T) -> Result<&mut Self> {
        match self.parameter_index(name)? {
            Some(param) => {
                value.encode(self, param)?;
                self.cursor.jump_past(param);
            }
            None if self.strict_names => return Err(Error::UnknownParameter(name.to_owned())),
            None => trace!(name, "Skipping unknown named parameter"),
        }
        Ok(self)
    }

    /// The index the next sequential bind will use
    pub fn bind_index(&self) -> usize { self.cursor.position() }

    /// Take the cursor's current index and move it forward by one
    pub fn advance_cursor(&mut self) -> usize { self.cursor.advance() }

    /// Move the cursor back one position, never below the first parameter
    pub fn decrement_next(&mut self) { self.cursor.rewind() }

    pub fn parameter_count(&self) -> usize { unsafe { ffi::sqlite3_bind_parameter_count(self.ptr()) as usize } }

    /// Resolve a parameter name (including its `:`, `@` or `$` prefix) to its index
    pub fn parameter_index(&self, name: &str) -> Result<Option<usize>> {
        let name = CString::new(name)?;
        let index = unsafe { ffi::sqlite3_bind_parameter_index(self.ptr(), name.as_ptr()) };
        Ok((index > 0).then_some(index as usize))
    }

    pub fn parameter_name(&self, param: usize) -> Option<String> {
        let param = c_int::try_from(param).ok()?;
        let name = unsafe { ffi::sqlite3_bind_parameter_name(self.ptr(), param) };
        unsafe { owned_str(name) }
    }

    // Raw binds. These go straight to SQLite; prefer `bind`, `bind_at` or `bind_named`.

    pub fn bind_int(&mut self, param: usize, value: i64) -> Result<()> {
        trace!(param, value, "bind int");
        let rc = unsafe { ffi::sqlite3_bind_int64(self.ptr(), param_index(param)?, value) };
        self.db.check(rc)
    }

    pub fn bind_double(&mut self, param: usize, value: f64) -> Result<()> {
        trace!(param, value, "bind double");
        let rc = unsafe { ffi::sqlite3_bind_double(self.ptr(), param_index(param)?, value) };
        self.db.check(rc)
    }

    pub fn bind_text(&mut self, param: usize, value: &str) -> Result<()> {
        trace!(param, value, "bind text");
        let len = c_int::try_from(value.len()).map_err(|_| Error::from_code(ffi::SQLITE_TOOBIG))?;
        let rc = unsafe {
            ffi::sqlite3_bind_text(self.ptr(), param_index(param)?, value.as_ptr().cast::<c_char>(), len, ffi::SQLITE_TRANSIENT())
        };
        self.db.check(rc)
    }

    pub fn bind_blob(&mut self, param: usize, value: &[u8]) -> Result<()> {
        trace!(param, len = value.len(), "bind blob");
        let len = c_int::try_from(value.len()).map_err(|_| Error::from_code(ffi::SQLITE_TOOBIG))?;
        let index = param_index(param)?;
        let rc = if len == 0 {
            unsafe { ffi::sqlite3_bind_zeroblob(self.ptr(), index, 0) }
        } else {
            unsafe { ffi::sqlite3_bind_blob(self.ptr(), index, value.as_ptr().cast::<c_void>(), len, ffi::SQLITE_TRANSIENT()) }
        };
        self.db.check(rc)
    }

    pub fn bind_null(&mut self, param: usize) -> Result<()> {
        trace!(param, "bind null");
        let rc = unsafe { ffi::sqlite3_bind_null(self.ptr(), param_index(param)?) };
        self.db.check(rc)
    }

    // -- stepping --

    /// Advance to the next row. Returns `false` once the statement is done.
    pub fn step(&mut self) -> Result<bool> {
        let rc = unsafe { ffi::sqlite3_step(self.ptr()) };
        match rc {
            ffi::SQLITE_ROW => {
                self.state = StepState::Row;
                Ok(true)
            }
            ffi::SQLITE_DONE => {
                trace!("Statement done");
                self.state = StepState::Done;
                Ok(false)
            }
            code => {
                self.state = StepState::Done;
                Err(self.db.engine_error(code))
            }
        }
    }

    pub fn has_row(&self) -> bool { self.state == StepState::Row }

    /// Rewind the statement, clear every binding and move the cursor back to the first parameter
    pub fn reset(&mut self) -> Result<&mut Self> {
        // sqlite3_reset repeats the error of a failed step, but resets either way
        let reset = unsafe { ffi::sqlite3_reset(self.ptr()) };
        let cleared = unsafe { ffi::sqlite3_clear_bindings(self.ptr()) };
        self.state = StepState::Ready;
        self.cursor.reset();
        self.db.check(reset)?;
        self.db.check(cleared)?;
        trace!("Statement reset");
        Ok(self)
    }

    /// Run to completion, discarding rows
    pub fn exec(&mut self) -> Result<()> {
        while self.step()? {}
        Ok(())
    }

    /// Run to completion, decoding each row from column 0 and handing it to `callback`
    ///
    /// The row type is the callback's argument type: a scalar for one column,
    /// a tuple for several.
    pub fn exec_with<A, F>(&mut self, mut callback: F) -> Result<()>
    where
        A: Decode,
        F: FnMut(A),
    {
        while self.step()? {
            callback(self.get(0)?);
        }
        Ok(())
    }

    /// Step once and decode the row into `out`
    pub fn to<T: Decode>(&mut self, out: &mut T) -> Result<&mut Self> {
        *out = self.fetch()?;
        Ok(self)
    }

    /// Step once and decode the row; [`Error::NoRow`] if there is none
    pub fn fetch<T: Decode>(&mut self) -> Result<T> {
        if !self.step()? {
            return Err(Error::NoRow);
        }
        self.get(0)
    }

    /// Clear `out`, then push one decoded element per remaining row
    pub fn to_vec<T: Decode>(&mut self, out: &mut Vec<T>) -> Result<&mut Self> {
        out.clear();
        while self.step()? {
            out.push(self.get(0)?);
        }
        Ok(self)
    }

    pub fn fetch_all<T: Decode>(&mut self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        self.to_vec(&mut out)?;
        Ok(out)
    }

    /// Iterate the remaining rows, decoding each from column 0
    pub fn rows<T: Decode>(&mut self) -> Rows<'_, 'db, T> { Rows::new(self) }

    // -- reading --

    /// Decode a value from the current row starting at `column`, without stepping
    pub fn get<T: Decode>(&self, column: usize) -> Result<T> { T::decode(self, column) }

    pub fn column_count(&self) -> usize { unsafe { ffi::sqlite3_column_count(self.ptr()) as usize } }

    pub fn column_name(&self, column: usize) -> Option<String> {
        if column >= self.column_count() {
            return None;
        }
        let name = unsafe { ffi::sqlite3_column_name(self.ptr(), column as c_int) };
        unsafe { owned_str(name) }
    }

    /// Storage class of `column` in the current row
    pub fn column_type(&self, column: usize) -> Result<ColumnType> {
        let index = self.row_column(column)?;
        Ok(ColumnType::from_raw(unsafe { ffi::sqlite3_column_type(self.ptr(), index) }))
    }

    // Raw column reads with SQLite's coercions. `Decode` implementations build on these.

    pub fn column_int(&self, column: usize) -> Result<i64> {
        let index = self.row_column(column)?;
        Ok(unsafe { ffi::sqlite3_column_int64(self.ptr(), index) })
    }

    pub fn column_double(&self, column: usize) -> Result<f64> {
        let index = self.row_column(column)?;
        Ok(unsafe { ffi::sqlite3_column_double(self.ptr(), index) })
    }

    /// The column as UTF-8 text. NULL reads as an empty string.
    pub fn column_text(&self, column: usize) -> Result<String> {
        let bytes = self.column_bytes(column, ColumnRead::Text)?;
        String::from_utf8(bytes).map_err(|err| Error::InvalidUtf8 { column, source: err.utf8_error() })
    }

    /// The column as bytes, copied out of the row. NULL reads as empty.
    pub fn column_blob(&self, column: usize) -> Result<Vec<u8>> { self.column_bytes(column, ColumnRead::Blob) }

    fn column_bytes(&self, column: usize, read: ColumnRead) -> Result<Vec<u8>> {
        let index = self.row_column(column)?;
        // Fetch the data pointer first, then its length, and copy before anything else touches the row
        unsafe {
            let data = match read {
                ColumnRead::Text => ffi::sqlite3_column_text(self.ptr(), index).cast::<u8>(),
                ColumnRead::Blob => ffi::sqlite3_column_blob(self.ptr(), index).cast::<u8>(),
            };
            let len = ffi::sqlite3_column_bytes(self.ptr(), index);
            if data.is_null() || len <= 0 {
                return Ok(Vec::new());
            }
            Ok(std::slice::from_raw_parts(data, len as usize).to_vec())
        }
    }

    /// Validate `column` against the current row
    fn row_column(&self, column: usize) -> Result<c_int> {
        if self.state != StepState::Row {
            return Err(Error::NoCurrentRow);
        }
        let count = self.column_count();
        if column >= count {
            return Err(Error::ColumnOutOfRange { column, count });
        }
        Ok(column as c_int)
    }

    /// Under strict types, fail unless `column` holds one of `accepted`
    pub fn expect_type(&self, column: usize, expected: &'static str, accepted: &[ColumnType]) -> Result<()> {
        if !self.strict_types {
            return Ok(());
        }
        let found = self.column_type(column)?;
        if accepted.contains(&found) {
            Ok(())
        } else {
            Err(Error::TypeMismatch { column, expected, found })
        }
    }

    // -- introspection --

    pub fn readonly(&self) -> bool { unsafe { ffi::sqlite3_stmt_readonly(self.ptr()) != 0 } }

    /// The SQL text the statement was prepared from
    pub fn sql(&self) -> String { unsafe { owned_str(ffi::sqlite3_sql(self.ptr())) }.unwrap_or_default() }

    /// The SQL text with current bindings substituted in
    pub fn expanded_sql(&self) -> Option<String> {
        unsafe {
            let expanded = ffi::sqlite3_expanded_sql(self.ptr());
            let sql = owned_str(expanded);
            ffi::sqlite3_free(expanded.cast::<c_void>());
            sql
        }
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        // Finalize reports the last step's error again; it was surfaced already
        unsafe { ffi::sqlite3_finalize(self.ptr()) };
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement").field("sql", &self.sql()).field("cursor", &self.cursor).field("state", &self.state).finish()
    }
}

#[derive(Clone, Copy)]
enum ColumnRead {
    Text,
    Blob,
}

fn param_index(param: usize) -> Result<c_int> { c_int::try_from(param).map_err(|_| Error::from_code(ffi::SQLITE_RANGE)) }

/// Copy a NUL-terminated string owned by SQLite
unsafe fn owned_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}
