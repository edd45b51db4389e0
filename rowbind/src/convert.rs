//! The conversion protocol between Rust values and statement parameters/columns
//!
//! [`Decode`] reads a value out of the current row starting at a column and
//! spanning [`Decode::WIDTH`] columns. [`Encode`] writes a value into a
//! statement, either at an explicit parameter index ([`Encode::encode`]) or as
//! call arguments at the statement's cursor ([`Encode::encode_arguments`]).
//!
//! The two entry points of `Encode` differ for composites: a tuple encoded at
//! an index fills [`Encode::PARAMS`] consecutive parameters from that index,
//! while a tuple encoded as arguments binds each element as its own sequential
//! argument.
//!
//! Records implement both traits in terms of their fields:
//!
//! ```rust
//! use rowbind::{Decode, Encode, Result, Statement};
//!
//! struct Person {
//!     first_name: String,
//!     age: i64,
//! }
//!
//! impl Decode for Person {
//!     const WIDTH: usize = 2;
//!
//!     fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
//!         Ok(Person { first_name: stmt.get(column)?, age: stmt.get(column + 1)? })
//!     }
//! }
//!
//! impl Encode for Person {
//!     const PARAMS: usize = 2;
//!
//!     fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> {
//!         stmt.bind_at(param, &self.first_name)?.bind_at(param + 1, &self.age)?;
//!         Ok(())
//!     }
//!
//!     fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> {
//!         stmt.bind_named(":first_name", &self.first_name)?.bind_named(":age", &self.age)?;
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::value::{ColumnType, Null, Value};

/// A type that can be read from a row
pub trait Decode: Sized {
    /// Number of consecutive columns the type occupies
    const WIDTH: usize = 1;

    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self>;
}

/// A type that can be bound to statement parameters
pub trait Encode {
    /// Number of consecutive parameters [`Encode::encode`] fills
    const PARAMS: usize = 1;

    /// Bind at parameter `param`; composites fill `param` up to `param + PARAMS - 1`
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()>;

    /// Bind as call arguments starting at the statement's cursor
    fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> {
        let param = stmt.advance_cursor();
        self.encode(stmt, param)
    }
}

/// Types that convert in both directions
pub trait Convertible: Encode + Decode {}

impl<T: Encode + Decode> Convertible for T {}

const INTEGER: &[ColumnType] = &[ColumnType::Integer];
const NUMERIC: &[ColumnType] = &[ColumnType::Integer, ColumnType::Float];
const TEXT: &[ColumnType] = &[ColumnType::Text];
const BLOB: &[ColumnType] = &[ColumnType::Blob];

// -- integers --

macro_rules! integer_conversions {
    ($($ty:ty),+ $(,)?) => {$(
        impl Decode for $ty {
            fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
                stmt.expect_type(column, stringify!($ty), INTEGER)?;
                let value = stmt.column_int(column)?;
                <$ty>::try_from(value).map_err(|_| Error::IntegerOutOfRange { value: value as i128, target: stringify!($ty) })
            }
        }

        impl Encode for $ty {
            fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> {
                let value = i64::try_from(*self).map_err(|_| Error::IntegerOutOfRange { value: *self as i128, target: "i64" })?;
                stmt.bind_int(param, value)
            }
        }
    )+};
}

integer_conversions!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Decode for bool {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "bool", INTEGER)?;
        Ok(stmt.column_int(column)? != 0)
    }
}

impl Encode for bool {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_int(param, *self as i64) }
}

// -- floating point --

impl Decode for f64 {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "f64", NUMERIC)?;
        stmt.column_double(column)
    }
}

impl Encode for f64 {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_double(param, *self) }
}

impl Decode for f32 {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "f32", NUMERIC)?;
        Ok(stmt.column_double(column)? as f32)
    }
}

impl Encode for f32 {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_double(param, f64::from(*self)) }
}

// -- text and blobs --

impl Decode for String {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "text", TEXT)?;
        stmt.column_text(column)
    }
}

impl Encode for str {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_text(param, self) }
}

impl Encode for String {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_text(param, self) }
}

impl Decode for Vec<u8> {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "blob", BLOB)?;
        stmt.column_blob(column)
    }
}

impl Encode for [u8] {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_blob(param, self) }
}

impl Encode for Vec<u8> {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_blob(param, self) }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_blob(param, self) }
}

// -- null and dynamic values --

impl Decode for Null {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        stmt.expect_type(column, "null", &[ColumnType::Null])?;
        // still validates the row and column index
        stmt.column_type(column)?;
        Ok(Null)
    }
}

impl Encode for Null {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { stmt.bind_null(param) }
}

impl Decode for Value {
    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        Ok(match stmt.column_type(column)? {
            ColumnType::Null => Value::Null,
            ColumnType::Integer => Value::Integer(stmt.column_int(column)?),
            ColumnType::Float => Value::Real(stmt.column_double(column)?),
            ColumnType::Text => Value::Text(stmt.column_text(column)?),
            ColumnType::Blob => Value::Blob(stmt.column_blob(column)?),
        })
    }
}

impl Encode for Value {
    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> {
        match self {
            Value::Null => stmt.bind_null(param),
            Value::Integer(i) => stmt.bind_int(param, *i),
            Value::Real(f) => stmt.bind_double(param, *f),
            Value::Text(s) => stmt.bind_text(param, s),
            Value::Blob(b) => stmt.bind_blob(param, b),
        }
    }
}

// -- combinators --

/// NULL in the first column decodes as `None`
impl<T: Decode> Decode for Option<T> {
    const WIDTH: usize = T::WIDTH;

    fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
        if stmt.column_type(column)? == ColumnType::Null {
            return Ok(None);
        }
        T::decode(stmt, column).map(Some)
    }
}

/// `None` binds NULL to every parameter `T` would fill
impl<T: Encode> Encode for Option<T> {
    const PARAMS: usize = T::PARAMS;

    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> {
        match self {
            Some(value) => value.encode(stmt, param),
            None => (param..param + T::PARAMS).try_for_each(|param| stmt.bind_null(param)),
        }
    }

    fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode_arguments(stmt),
            None => (0..T::PARAMS).try_for_each(|_| Null.encode_arguments(stmt)),
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    const PARAMS: usize = T::PARAMS;

    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { (**self).encode(stmt, param) }

    fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> { (**self).encode_arguments(stmt) }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    const PARAMS: usize = T::PARAMS;

    fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> { (**self).encode(stmt, param) }

    fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> { (**self).encode_arguments(stmt) }
}

/// No columns, no parameters
impl Decode for () {
    const WIDTH: usize = 0;

    fn decode(_stmt: &Statement<'_>, _column: usize) -> Result<Self> { Ok(()) }
}

impl Encode for () {
    const PARAMS: usize = 0;

    fn encode(&self, _stmt: &mut Statement<'_>, _param: usize) -> Result<()> { Ok(()) }

    fn encode_arguments(&self, _stmt: &mut Statement<'_>) -> Result<()> { Ok(()) }
}

macro_rules! tuple_conversions {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty: Decode),+> Decode for ($($ty,)+) {
            const WIDTH: usize = 0 $(+ <$ty as Decode>::WIDTH)+;

            #[allow(unused_assignments)]
            fn decode(stmt: &Statement<'_>, column: usize) -> Result<Self> {
                let mut column = column;
                $(
                    let $var = <$ty as Decode>::decode(stmt, column)?;
                    column += <$ty as Decode>::WIDTH;
                )+
                Ok(($($var,)+))
            }
        }

        impl<$($ty: Encode),+> Encode for ($($ty,)+) {
            const PARAMS: usize = 0 $(+ <$ty as Encode>::PARAMS)+;

            #[allow(unused_assignments)]
            fn encode(&self, stmt: &mut Statement<'_>, param: usize) -> Result<()> {
                let ($($var,)+) = self;
                let mut param = param;
                $(
                    $var.encode(stmt, param)?;
                    param += <$ty as Encode>::PARAMS;
                )+
                Ok(())
            }

            fn encode_arguments(&self, stmt: &mut Statement<'_>) -> Result<()> {
                let ($($var,)+) = self;
                $($var.encode_arguments(stmt)?;)+
                Ok(())
            }
        }
    };
}

tuple_conversions!(A a);
tuple_conversions!(A a, B b);
tuple_conversions!(A a, B b, C c);
tuple_conversions!(A a, B b, C c, D d);
tuple_conversions!(A a, B b, C c, D d, E e);
tuple_conversions!(A a, B b, C c, D d, E e, F f);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g, H h);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g, H h, I i);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g, H h, I i, J j);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g, H h, I i, J j, K k);
tuple_conversions!(A a, B b, C c, D d, E e, F f, G g, H h, I i, J j, K k, L l);
