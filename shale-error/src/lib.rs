#![deny(missing_docs)]

//! This crate defines the error & result types for Shale.
//! It also contains a variety of useful macros for error handling.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{env, fmt};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("SHALE_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Shale.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum ShaleError {
    /// A required schema path had no value in the record being shredded.
    #[error("Missing required field: {0}\nBacktrace:\n{1}")]
    MissingRequiredField(ErrString, Backtrace),
    /// A value's shape or type does not match the schema node it was matched against.
    #[error("Type mismatch: {0}\nBacktrace:\n{1}")]
    TypeMismatch(ErrString, Backtrace),
    /// A schema registration referenced a parent path that does not exist.
    #[error("Unknown column path: {0}\nBacktrace:\n{1}")]
    UnknownColumnPath(ErrString, Backtrace),
    /// A lookup or projection referenced a column that does not exist.
    #[error("Column not found: {0}\nBacktrace:\n{1}")]
    ColumnNotFound(ErrString, Backtrace),
    /// A schema registration tried to add a path that already exists.
    #[error("Duplicate column path: {0}\nBacktrace:\n{1}")]
    DuplicateColumnPath(ErrString, Backtrace),
    /// A schema registration would produce an ill-formed schema tree.
    #[error("Invalid schema: {0}\nBacktrace:\n{1}")]
    InvalidSchema(ErrString, Backtrace),
    /// A record contained a field that the schema does not know about.
    #[error("Unknown field: {0}\nBacktrace:\n{1}")]
    UnknownField(ErrString, Backtrace),
    /// The level streams of the selected columns disagree with each other.
    #[error("Column desync: {0}\nBacktrace:\n{1}")]
    ColumnDesync(ErrString, Backtrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// An assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<ShaleError>),
    /// A wrapper for errors from the Arrow library.
    #[error(transparent)]
    ArrowError(#[from] arrow_schema::ArrowError),
    /// A wrapper for errors from the serde_json library.
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JSONError(#[from] serde_json::Error),
}

impl ShaleError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        ShaleError::Context(msg.into(), Box::new(self))
    }

    /// Strips any [`ShaleError::Context`] wrappers and returns the underlying error.
    pub fn root_cause(&self) -> &ShaleError {
        match self {
            ShaleError::Context(_, inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl Debug for ShaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return ShaleErrors as their error type.
pub type ShaleResult<T> = Result<T, ShaleError>;

/// A trait for unwrapping a ShaleResult.
pub trait ShaleUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn shale_unwrap(self) -> Self::Output;
}

impl<T, E> ShaleUnwrap for Result<T, E>
where
    E: Into<ShaleError>,
{
    type Output = T;

    #[inline(always)]
    fn shale_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| shale_panic!(err))
    }
}

/// A trait for expect-ing a ShaleResult or an Option.
pub trait ShaleExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn shale_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> ShaleExpect for Result<T, E>
where
    E: Into<ShaleError>,
{
    type Output = T;

    #[inline(always)]
    fn shale_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| shale_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> ShaleExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn shale_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = ShaleError::AssertionFailed(msg.to_string().into(), Backtrace::capture());
            shale_panic!(err)
        })
    }
}

/// A convenient macro for creating a ShaleError.
#[macro_export]
macro_rules! shale_err {
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::ShaleError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::ShaleError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::shale_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a ShaleError.
#[macro_export]
macro_rules! shale_bail {
    ($($tt:tt)+) => {
        return Err($crate::shale_err!($($tt)+))
    };
}

/// A convenient macro for panicking with a ShaleError in the presence of a programmer error
/// (e.g., an invariant has been violated).
#[macro_export]
macro_rules! shale_panic {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::shale_panic!($crate::shale_err!($variant: $fmt, $($arg),*))
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::shale_panic!($crate::shale_err!($fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::ShaleError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($err:expr) => {{
        let err: $crate::ShaleError = $err;
        panic!("{}", err)
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::ShaleError) -> crate::ShaleError {
        error
    }
}
