#![deny(missing_docs)]

//! The schema tree for Shale
//!
//! This crate contains the logical description of nested records: how often each node may occur
//! ([`Repetition`]), which scalar type a leaf column stores ([`PhysicalType`]), how nodes are
//! addressed ([`FieldPath`]), and the [`Schema`] tree itself, which derives the maximum
//! definition and repetition levels of every node once, at registration time.

pub use field::*;
pub use ptype::*;
pub use repetition::*;
pub use schema::*;

#[cfg(feature = "arrow")]
pub mod arrow;
mod field;
mod ptype;
mod repetition;
mod schema;
