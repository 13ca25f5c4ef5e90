//! Export of column values to Arrow arrays, the input format of physical encoders.

use std::sync::Arc;

use arrow_array::{
    ArrayRef, BinaryArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use shale_dtype::PhysicalType;
use shale_error::ShaleResult;
use shale_scalar::Bytes;

use crate::column::ColumnChunk;

impl ColumnChunk {
    /// Builds a non-nullable Arrow array of the present values, in triple order.
    ///
    /// The levels are not part of the array; absent values are skipped.
    pub fn to_arrow(&self) -> ShaleResult<ArrayRef> {
        Ok(match self.physical_type() {
            PhysicalType::Bool => Arc::new(BooleanArray::from(self.typed_values::<bool>()?)),
            PhysicalType::I32 => Arc::new(Int32Array::from(self.typed_values::<i32>()?)),
            PhysicalType::I64 => Arc::new(Int64Array::from(self.typed_values::<i64>()?)),
            PhysicalType::F32 => Arc::new(Float32Array::from(self.typed_values::<f32>()?)),
            PhysicalType::F64 => Arc::new(Float64Array::from(self.typed_values::<f64>()?)),
            PhysicalType::Binary => Arc::new(BinaryArray::from_iter_values(
                self.typed_values::<Bytes>()?,
            )),
            PhysicalType::Utf8 => Arc::new(StringArray::from(self.typed_values::<String>()?)),
        })
    }
}
