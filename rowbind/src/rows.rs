use std::marker::PhantomData;

use crate::convert::Decode;
use crate::error::Result;
use crate::statement::Statement;

/// Iterator over the remaining rows of a statement, decoding each from column 0
///
/// Stops after the first error.
pub struct Rows<'stmt, 'db, T> {
    stmt: &'stmt mut Statement<'db>,
    done: bool,
    _row: PhantomData<fn() -> T>,
}

impl<'stmt, 'db, T> Rows<'stmt, 'db, T> {
    pub(crate) fn new(stmt: &'stmt mut Statement<'db>) -> Self { Self { stmt, done: false, _row: PhantomData } }
}

impl<T: Decode> Iterator for Rows<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let row = match self.stmt.step() {
            Ok(true) => self.stmt.get(0),
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(err) => Err(err),
        };
        if row.is_err() {
            self.done = true;
        }
        Some(row)
    }
}
