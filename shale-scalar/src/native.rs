use std::cmp::Ordering;
use std::fmt::Debug;

use bytes::Bytes;
use num_traits::{Float, NumCast, ToPrimitive};
use shale_dtype::PhysicalType;

use crate::ScalarValue;

/// A Rust type that can be stored in a leaf column.
///
/// This is the static counterpart of [`PhysicalType`]: typed column stores, statistics and typed
/// buffers are generic over it, so the only runtime type switch is the per-value coercion.
pub trait NativeType: Clone + Debug + Send + Sync + Sized + 'static {
    /// The physical type of columns storing this type
    const PHYSICAL: PhysicalType;

    /// Converts a scalar into this type, returning `None` if that would lose information.
    fn coerce(value: &ScalarValue) -> Option<Self>;

    /// Wraps the value into a [`ScalarValue`] of [`Self::PHYSICAL`] type.
    fn into_scalar(self) -> ScalarValue;

    /// An estimate of the number of bytes the value occupies once encoded.
    fn size_of(&self) -> usize;

    /// The serialized form used for min/max statistics: little-endian bytes for fixed-width types,
    /// the raw bytes otherwise.
    fn to_stat_bytes(&self) -> Vec<u8>;

    /// A total order over values of this type.
    fn total_compare(&self, other: &Self) -> Ordering;

    /// Whether the value is a float NaN, which never takes part in min/max statistics.
    fn is_nan(&self) -> bool {
        false
    }
}

/// Integral floats only, so a float never silently truncates into an integer column.
fn integral<F: Float>(value: F) -> Option<F> {
    (value.fract() == F::zero()).then_some(value)
}

/// Casts `value`, keeping the result only if casting it back yields `value` again.
fn lossless<S, T>(value: S) -> Option<T>
where
    S: NumCast + PartialEq + Copy,
    T: NumCast + ToPrimitive + Copy,
{
    let cast = <T as NumCast>::from(value)?;
    (<S as NumCast>::from(cast)? == value).then_some(cast)
}

macro_rules! native_int {
    ($T:ty, $variant:ident) => {
        impl NativeType for $T {
            const PHYSICAL: PhysicalType = PhysicalType::$variant;

            fn coerce(value: &ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::I32(v) => <$T as NumCast>::from(*v),
                    ScalarValue::I64(v) => <$T as NumCast>::from(*v),
                    ScalarValue::F32(v) => integral(*v).and_then(<$T as NumCast>::from),
                    ScalarValue::F64(v) => integral(*v).and_then(<$T as NumCast>::from),
                    _ => None,
                }
            }

            fn into_scalar(self) -> ScalarValue {
                ScalarValue::$variant(self)
            }

            fn size_of(&self) -> usize {
                size_of::<$T>()
            }

            fn to_stat_bytes(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn total_compare(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    };
}

macro_rules! native_float {
    ($T:ty, $variant:ident) => {
        impl NativeType for $T {
            const PHYSICAL: PhysicalType = PhysicalType::$variant;

            fn coerce(value: &ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::I32(v) => lossless(*v),
                    ScalarValue::I64(v) => lossless(*v),
                    ScalarValue::F32(v) if f32::is_nan(*v) => Some(<$T>::NAN),
                    ScalarValue::F64(v) if f64::is_nan(*v) => Some(<$T>::NAN),
                    ScalarValue::F32(v) => lossless(*v),
                    ScalarValue::F64(v) => lossless(*v),
                    _ => None,
                }
            }

            fn into_scalar(self) -> ScalarValue {
                ScalarValue::$variant(self)
            }

            fn size_of(&self) -> usize {
                size_of::<$T>()
            }

            fn to_stat_bytes(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn total_compare(&self, other: &Self) -> Ordering {
                self.total_cmp(other)
            }

            fn is_nan(&self) -> bool {
                <$T>::is_nan(*self)
            }
        }
    };
}

native_int!(i32, I32);
native_int!(i64, I64);
native_float!(f32, F32);
native_float!(f64, F64);

impl NativeType for bool {
    const PHYSICAL: PhysicalType = PhysicalType::Bool;

    fn coerce(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }

    fn size_of(&self) -> usize {
        1
    }

    fn to_stat_bytes(&self) -> Vec<u8> {
        vec![<u8 as From<bool>>::from(*self)]
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl NativeType for Bytes {
    const PHYSICAL: PhysicalType = PhysicalType::Binary;

    fn coerce(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Binary(v) => Some(v.clone()),
            ScalarValue::Utf8(v) => Some(Bytes::from(v.clone().into_bytes())),
            _ => None,
        }
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Binary(self)
    }

    fn size_of(&self) -> usize {
        self.len()
    }

    fn to_stat_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl NativeType for String {
    const PHYSICAL: PhysicalType = PhysicalType::Utf8;

    fn coerce(value: &ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Utf8(v) => Some(v.clone()),
            ScalarValue::Binary(v) => String::from_utf8(v.to_vec()).ok(),
            _ => None,
        }
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Utf8(self)
    }

    fn size_of(&self) -> usize {
        self.len()
    }

    fn to_stat_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn total_compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Dispatch on a [`PhysicalType`], binding the corresponding [`NativeType`] to a type parameter.
///
/// ```
/// use shale_dtype::PhysicalType;
/// use shale_scalar::{NativeType, match_each_native_type};
///
/// let width = match_each_native_type!(PhysicalType::I64, |$T| {
///     <$T as NativeType>::PHYSICAL.byte_width()
/// });
/// assert_eq!(width, Some(8));
/// ```
#[macro_export]
macro_rules! match_each_native_type {
    ($self:expr, | $_:tt $T:ident | $($body:tt)*) => ({
        macro_rules! __with__ {( $_ $T:ty ) => ( $($body)* )}
        use $crate::__private::PhysicalType;
        match $self {
            PhysicalType::Bool => __with__! { bool },
            PhysicalType::I32 => __with__! { i32 },
            PhysicalType::I64 => __with__! { i64 },
            PhysicalType::F32 => __with__! { f32 },
            PhysicalType::F64 => __with__! { f64 },
            PhysicalType::Binary => __with__! { $crate::Bytes },
            PhysicalType::Utf8 => __with__! { String },
        }
    })
}
