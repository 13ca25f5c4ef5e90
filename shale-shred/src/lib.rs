//! Dremel-style shredding and assembly of nested records.
//!
//! Records of arbitrarily nested optional, required and repeated groups are shredded into one
//! [`ColumnChunk`] per leaf column. Every atomic value is stored together with a definition
//! level, the number of optional or repeated nodes on its path that are present, and a
//! repetition level, the depth of the repeated node that started a new element. Leaves beneath
//! an absent node still receive one absent entry, so the nesting can be rebuilt from any subset
//! of the columns.
//!
//! ```
//! use shale_dtype::{PhysicalType, Repetition};
//! use shale_scalar::Record;
//! use shale_shred::{Projection, RowStore};
//!
//! let mut store = RowStore::new();
//! store.add_column("DocId", PhysicalType::I64, Repetition::Required).unwrap();
//! store.add_group("Links", Repetition::Optional).unwrap();
//! store.add_column("Links.Forward", PhysicalType::I64, Repetition::Repeated).unwrap();
//!
//! let record = Record::new()
//!     .with("DocId", 10i64)
//!     .with("Links", Record::new().with("Forward", vec![20i64, 40, 60]));
//! store.shred(&record).unwrap();
//!
//! let forward = store.find_column("Links.Forward").unwrap();
//! assert_eq!(forward.definition_levels(), &[2, 2, 2]);
//! assert_eq!(forward.repetition_levels(), &[0, 1, 1]);
//!
//! let mut reader = store.reader(&Projection::all()).unwrap();
//! assert_eq!(reader.next_record().unwrap(), Some(record));
//! assert_eq!(reader.next_record().unwrap(), None);
//! ```

pub use assemble::*;
pub use column::*;
pub use levels::*;
pub use options::*;
pub use projection::*;
pub use row_store::*;
pub use writer::*;

#[cfg(feature = "arrow")]
mod arrow;
mod assemble;
mod column;
mod levels;
mod options;
mod projection;
mod row_store;
mod shred;
mod writer;
