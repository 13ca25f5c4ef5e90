use std::cmp::Ordering;
use std::fmt::Debug;

use shale_dtype::PhysicalType;
use shale_error::{ShaleResult, shale_err};
use shale_scalar::{NativeType, ScalarValue, Value, match_each_native_type};

/// The type handler bound to a leaf column.
///
/// It converts incoming scalars into the column's physical type, expands repeated leaf values and
/// tracks the running minimum and maximum of committed values.
pub trait ColumnStore: Debug + Send + Sync {
    /// The physical type every stored value has
    fn physical_type(&self) -> PhysicalType;

    /// Converts `value` into the column's physical type, failing with `TypeMismatch` if that is
    /// not possible without loss.
    fn coerce(&self, value: &ScalarValue) -> ShaleResult<ScalarValue>;

    /// Expands the value of a repeated leaf into one coerced atomic value per element.
    fn get_values(&self, value: &Value) -> ShaleResult<Vec<ScalarValue>> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Scalar(s) => self.coerce(s),
                    other => Err(shale_err!(
                        TypeMismatch: "Elements of a repeated {} column must be scalars, got {}",
                        self.physical_type(),
                        other.shape()
                    )),
                })
                .collect(),
            other => Err(shale_err!(
                TypeMismatch: "Expected a list of {} values, got {}",
                self.physical_type(),
                other.shape()
            )),
        }
    }

    /// An estimate of the encoded size of `value` in bytes
    fn size_of(&self, value: &ScalarValue) -> usize;

    /// Folds a committed value into the running statistics. NaN is never a minimum or maximum.
    fn observe(&mut self, value: &ScalarValue);

    fn min(&self) -> Option<ScalarValue>;

    fn max(&self) -> Option<ScalarValue>;

    /// The serialized minimum, `None` if no value has been observed
    fn min_value(&self) -> Option<Vec<u8>>;

    /// The serialized maximum, `None` if no value has been observed
    fn max_value(&self) -> Option<Vec<u8>>;

    /// Forgets the running statistics.
    fn reset(&mut self);
}

/// The built-in [`ColumnStore`] for a [`NativeType`].
#[derive(Debug, Clone)]
pub struct TypedStore<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: NativeType> Default for TypedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeType> TypedStore<T> {
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Appends `value` to a typed buffer, converting it on the way.
    pub fn append(&self, buffer: &mut Vec<T>, value: &ScalarValue) -> ShaleResult<()> {
        buffer.push(self.coerce_native(value)?);
        Ok(())
    }

    fn coerce_native(&self, value: &ScalarValue) -> ShaleResult<T> {
        T::coerce(value).ok_or_else(|| {
            shale_err!(
                TypeMismatch: "Cannot store {value} in a {} column",
                T::PHYSICAL
            )
        })
    }
}

impl<T: NativeType> ColumnStore for TypedStore<T> {
    fn physical_type(&self) -> PhysicalType {
        T::PHYSICAL
    }

    fn coerce(&self, value: &ScalarValue) -> ShaleResult<ScalarValue> {
        if value.is_instance_of(T::PHYSICAL) {
            return Ok(value.clone());
        }
        self.coerce_native(value).map(T::into_scalar)
    }

    fn size_of(&self, value: &ScalarValue) -> usize {
        T::coerce(value).map_or(0, |v| v.size_of())
    }

    fn observe(&mut self, value: &ScalarValue) {
        let Some(value) = T::coerce(value) else {
            log::warn!("Ignoring {value} in statistics of a {} column", T::PHYSICAL);
            return;
        };
        if NativeType::is_nan(&value) {
            return;
        }
        if self
            .min
            .as_ref()
            .is_none_or(|min| value.total_compare(min) == Ordering::Less)
        {
            self.min = Some(value.clone());
        }
        if self
            .max
            .as_ref()
            .is_none_or(|max| value.total_compare(max) == Ordering::Greater)
        {
            self.max = Some(value);
        }
    }

    fn min(&self) -> Option<ScalarValue> {
        self.min.clone().map(T::into_scalar)
    }

    fn max(&self) -> Option<ScalarValue> {
        self.max.clone().map(T::into_scalar)
    }

    fn min_value(&self) -> Option<Vec<u8>> {
        self.min.as_ref().map(T::to_stat_bytes)
    }

    fn max_value(&self) -> Option<Vec<u8>> {
        self.max.as_ref().map(T::to_stat_bytes)
    }

    fn reset(&mut self) {
        self.min = None;
        self.max = None;
    }
}

/// Returns the built-in store for columns of `physical_type`.
pub fn store_for(physical_type: PhysicalType) -> Box<dyn ColumnStore> {
    match_each_native_type!(physical_type, |$T| {
        Box::new(TypedStore::<$T>::new())
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use shale_error::ShaleError;
    use shale_scalar::Bytes;

    use super::*;

    #[rstest]
    #[case(PhysicalType::I32, ScalarValue::I64(5), ScalarValue::I32(5))]
    #[case(PhysicalType::F64, ScalarValue::I32(2), ScalarValue::F64(2.0))]
    #[case(PhysicalType::Binary, ScalarValue::from("ab"), ScalarValue::Binary(Bytes::from_static(b"ab")))]
    #[case(PhysicalType::Utf8, ScalarValue::from("ab"), ScalarValue::from("ab"))]
    fn coerces_into_column_type(
        #[case] physical_type: PhysicalType,
        #[case] input: ScalarValue,
        #[case] expected: ScalarValue,
    ) {
        let store = store_for(physical_type);
        assert_eq!(store.physical_type(), physical_type);
        assert_eq!(store.coerce(&input).unwrap(), expected);
    }

    #[test]
    fn rejects_lossy_values() {
        let store = store_for(PhysicalType::I64);
        assert!(matches!(
            store.coerce(&ScalarValue::from("10")).unwrap_err(),
            ShaleError::TypeMismatch(..)
        ));
        assert!(matches!(
            store.coerce(&ScalarValue::F64(1.5)).unwrap_err(),
            ShaleError::TypeMismatch(..)
        ));
    }

    #[test]
    fn repeated_values() {
        let store = store_for(PhysicalType::I64);
        let values = store
            .get_values(&Value::from(vec![1i32, 2, 3]))
            .unwrap();
        assert_eq!(
            values,
            vec![ScalarValue::I64(1), ScalarValue::I64(2), ScalarValue::I64(3)]
        );

        assert!(matches!(
            store.get_values(&Value::from(4i64)).unwrap_err(),
            ShaleError::TypeMismatch(..)
        ));
    }

    #[test]
    fn running_min_max() {
        let mut store = TypedStore::<i32>::new();
        assert_eq!(store.min_value(), None);
        for v in [7, -3, 12, 0] {
            store.observe(&ScalarValue::I32(v));
        }
        assert_eq!(store.min(), Some(ScalarValue::I32(-3)));
        assert_eq!(store.max(), Some(ScalarValue::I32(12)));
        assert_eq!(store.min_value(), Some((-3i32).to_le_bytes().to_vec()));
        assert_eq!(store.max_value(), Some(12i32.to_le_bytes().to_vec()));

        store.reset();
        assert_eq!(store.max(), None);
    }

    #[test]
    fn nan_is_left_out_of_min_max() {
        let mut store = TypedStore::<f64>::new();
        store.observe(&ScalarValue::F64(f64::NAN));
        assert_eq!(store.min_value(), None);

        for v in [1.0, f64::NAN, 3.0, -f64::NAN] {
            store.observe(&ScalarValue::F64(v));
        }
        assert_eq!(store.min(), Some(ScalarValue::F64(1.0)));
        assert_eq!(store.max(), Some(ScalarValue::F64(3.0)));
        assert_eq!(store.max_value(), Some(3.0f64.to_le_bytes().to_vec()));
    }

    #[test]
    fn typed_append() {
        let store = TypedStore::<f32>::new();
        let mut buffer = Vec::new();
        store.append(&mut buffer, &ScalarValue::I32(3)).unwrap();
        store.append(&mut buffer, &ScalarValue::F64(0.5)).unwrap();
        assert_eq!(buffer, vec![3.0f32, 0.5]);
    }

    #[test]
    fn string_sizes() {
        let store = store_for(PhysicalType::Utf8);
        assert_eq!(store.size_of(&ScalarValue::from("hello")), 5);
        assert_eq!(store_for(PhysicalType::I64).size_of(&ScalarValue::I64(1)), 8);
    }
}
