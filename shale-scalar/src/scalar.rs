use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Write};
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use paste::paste;
use shale_dtype::PhysicalType;

use crate::NativeType;

/// One atomic value of a leaf column.
///
/// Equality, hashing and ordering are total: floats compare by [`f64::total_cmp`], so two values
/// are equal iff they have the same type and bit pattern. Values of different physical types
/// order by their type.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Binary(Bytes),
    Utf8(String),
}

macro_rules! as_native {
    ($T:ident) => {
        paste! {
            #[doc = "Access the value as `" $T "`, returning `None` if it cannot be coerced losslessly"]
            pub fn [<as_ $T>](&self) -> Option<$T> {
                <$T as NativeType>::coerce(self)
            }
        }
    };
}

impl ScalarValue {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Self::Bool(_) => PhysicalType::Bool,
            Self::I32(_) => PhysicalType::I32,
            Self::I64(_) => PhysicalType::I64,
            Self::F32(_) => PhysicalType::F32,
            Self::F64(_) => PhysicalType::F64,
            Self::Binary(_) => PhysicalType::Binary,
            Self::Utf8(_) => PhysicalType::Utf8,
        }
    }

    pub fn is_instance_of(&self, physical_type: PhysicalType) -> bool {
        self.physical_type() == physical_type
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    as_native!(bool);
    as_native!(i32);
    as_native!(i64);
    as_native!(f32);
    as_native!(f64);
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(l), Self::Bool(r)) => l.cmp(r),
            (Self::I32(l), Self::I32(r)) => l.cmp(r),
            (Self::I64(l), Self::I64(r)) => l.cmp(r),
            (Self::F32(l), Self::F32(r)) => l.total_cmp(r),
            (Self::F64(l), Self::F64(r)) => l.total_cmp(r),
            (Self::Binary(l), Self::Binary(r)) => l.cmp(r),
            (Self::Utf8(l), Self::Utf8(r)) => l.cmp(r),
            (l, r) => l.physical_type().cmp(&r.physical_type()),
        }
    }
}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.physical_type().hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Binary(v) => v.hash(state),
            Self::Utf8(v) => v.hash(state),
        }
    }
}

fn to_hex(slice: &[u8]) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    for byte in slice {
        write!(output, "{:02x}", byte)?;
    }
    Ok(output)
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}i32"),
            Self::I64(v) => write!(f, "{v}i64"),
            Self::F32(v) => write!(f, "{v}f32"),
            Self::F64(v) => write!(f, "{v}f64"),
            Self::Binary(v) => write!(f, "0x{}", to_hex(v)?),
            Self::Utf8(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from_native {
    ($T:ty, $variant:ident) => {
        impl From<$T> for ScalarValue {
            fn from(value: $T) -> Self {
                ScalarValue::$variant(value)
            }
        }
    };
}

impl_from_native!(bool, Bool);
impl_from_native!(i32, I32);
impl_from_native!(i64, I64);
impl_from_native!(f32, F32);
impl_from_native!(f64, F64);
impl_from_native!(Bytes, Binary);
impl_from_native!(String, Utf8);

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(value: Vec<u8>) -> Self {
        ScalarValue::Binary(Bytes::from(value))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(ScalarValue::F64(f64::NAN), ScalarValue::F64(f64::NAN));
        assert_ne!(ScalarValue::F64(0.0), ScalarValue::F64(-0.0));
        assert!(ScalarValue::F32(-1.5) < ScalarValue::F32(2.0));

        let distinct = [0.0, -0.0, 0.0, f64::NAN, f64::NAN]
            .into_iter()
            .map(ScalarValue::F64)
            .collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn different_types_never_equal() {
        assert_ne!(ScalarValue::I32(1), ScalarValue::I64(1));
        assert!(ScalarValue::Bool(true) < ScalarValue::I32(0));
    }

    #[test]
    fn coercing_accessors() {
        assert_eq!(ScalarValue::I64(7).as_i32(), Some(7));
        assert_eq!(ScalarValue::I64(i64::MAX).as_i32(), None);
        assert_eq!(ScalarValue::F64(3.0).as_i64(), Some(3));
        assert_eq!(ScalarValue::F64(3.5).as_i64(), None);
        assert_eq!(ScalarValue::from("x").as_i64(), None);
    }

    #[test]
    fn display() {
        assert_eq!(ScalarValue::from(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(ScalarValue::from("en-us").to_string(), "\"en-us\"");
        assert_eq!(ScalarValue::I32(10).to_string(), "10i32");
    }
}
