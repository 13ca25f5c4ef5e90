//! Scalars and the generic nested record shape.
//!
//! A [`ScalarValue`] is one atomic value stored in a leaf column. A [`Value`] is the recursive
//! shape records are made of: absent, a scalar, a sequence, or a nested [`Record`]. Producers
//! hand records to the shredder through the [`ToRecord`] capability.

pub use bytes::Bytes;
pub use native::*;
pub use record::*;
pub use scalar::*;

#[cfg(feature = "json")]
mod json;
mod native;
mod record;
mod scalar;

#[cfg(feature = "json")]
pub use json::*;

#[doc(hidden)]
pub mod __private {
    pub use shale_dtype::PhysicalType;
}
