//! Physical types of leaf columns

use std::fmt::{Display, Formatter};

/// The scalar type stored by a leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhysicalType {
    /// A boolean
    Bool,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 32-bit float
    F32,
    /// A 64-bit float
    F64,
    /// Arbitrary bytes
    Binary,
    /// UTF-8 encoded text
    Utf8,
}

impl PhysicalType {
    /// Returns the number of bytes a single value occupies, or `None` for variable-length types.
    pub const fn byte_width(&self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::I32 | Self::F32 => Some(4),
            Self::I64 | Self::F64 => Some(8),
            Self::Binary | Self::Utf8 => None,
        }
    }

    /// Returns true if every value of this type occupies the same number of bytes.
    pub const fn is_fixed_width(&self) -> bool {
        self.byte_width().is_some()
    }

    /// Returns true for the integer and floating point types.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F32 | Self::F64)
    }
}

impl Display for PhysicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Binary => write!(f, "binary"),
            Self::Utf8 => write!(f, "utf8"),
        }
    }
}
