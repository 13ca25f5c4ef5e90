//! Per-leaf column state: the dictionary-encoded values, levels and statistics of one column.

mod dictionary;
mod store;

pub use dictionary::*;
use shale_dtype::{FieldPath, PhysicalType, Repetition, SchemaNode};
use shale_error::{ShaleResult, shale_bail};
use shale_scalar::{NativeType, ScalarValue};
pub use store::*;

use crate::levels::{ColumnLevels, Triple};

/// The accumulated triples of one leaf column within the current row group.
///
/// Values, definition levels and repetition levels always have equal lengths, and a value is
/// present exactly where the definition level equals [`ColumnChunk::max_definition_level`].
#[derive(Debug)]
pub struct ColumnChunk {
    path: FieldPath,
    repetition: Repetition,
    max_definition_level: u16,
    max_repetition_level: u16,
    store: Box<dyn ColumnStore>,
    dictionary: Dictionary,
    definition_levels: Vec<u16>,
    repetition_levels: Vec<u16>,
    num_rows: usize,
    null_count: usize,
    estimated_size: usize,
}

impl ColumnChunk {
    pub(crate) fn new(leaf: &SchemaNode, store: Box<dyn ColumnStore>) -> Self {
        Self {
            path: leaf.path().clone(),
            repetition: leaf.repetition(),
            max_definition_level: leaf.max_definition_level(),
            max_repetition_level: leaf.max_repetition_level(),
            store,
            dictionary: Dictionary::new(),
            definition_levels: Vec::new(),
            repetition_levels: Vec::new(),
            num_rows: 0,
            null_count: 0,
            estimated_size: 0,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.store.physical_type()
    }

    pub fn max_definition_level(&self) -> u16 {
        self.max_definition_level
    }

    pub fn max_repetition_level(&self) -> u16 {
        self.max_repetition_level
    }

    pub(crate) fn store(&self) -> &dyn ColumnStore {
        self.store.as_ref()
    }

    /// The number of triples
    pub fn len(&self) -> usize {
        self.definition_levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definition_levels.is_empty()
    }

    /// The number of records the column holds
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// The number of absent values
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// A running estimate of the encoded size of the values and levels
    pub fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    pub fn definition_levels(&self) -> &[u16] {
        &self.definition_levels
    }

    pub fn repetition_levels(&self) -> &[u16] {
        &self.repetition_levels
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The logical value sequence, one entry per triple with absent values in place.
    pub fn assemble(&self) -> Vec<Option<ScalarValue>> {
        self.dictionary.assemble()
    }

    pub fn min(&self) -> Option<ScalarValue> {
        self.store.min()
    }

    pub fn max(&self) -> Option<ScalarValue> {
        self.store.max()
    }

    /// The serialized minimum of the present values, see [`NativeType::to_stat_bytes`]
    pub fn min_value(&self) -> Option<Vec<u8>> {
        self.store.min_value()
    }

    /// The serialized maximum of the present values, see [`NativeType::to_stat_bytes`]
    pub fn max_value(&self) -> Option<Vec<u8>> {
        self.store.max_value()
    }

    /// Collects the present values into a contiguous typed buffer.
    pub fn typed_values<T: NativeType>(&self) -> ShaleResult<Vec<T>> {
        if T::PHYSICAL != self.physical_type() {
            shale_bail!(
                TypeMismatch: "Cannot read {} column {} as {}",
                self.physical_type(),
                self.path,
                T::PHYSICAL
            );
        }
        let store = TypedStore::<T>::new();
        let mut buffer = Vec::with_capacity(self.len() - self.null_count);
        for value in self.dictionary.assemble().iter().flatten() {
            store.append(&mut buffer, value)?;
        }
        Ok(buffer)
    }

    /// Copies the triples out as level streams.
    pub fn to_levels(&self) -> ColumnLevels {
        self.dictionary
            .assemble()
            .into_iter()
            .zip(&self.definition_levels)
            .zip(&self.repetition_levels)
            .map(|((value, d), r)| Triple::new(value, *d, *r))
            .collect()
    }

    /// Appends a triple that has already been coerced and checked against the levels.
    pub(crate) fn commit(&mut self, triple: Triple) {
        if triple.repetition_level == 0 {
            self.num_rows += 1;
        }
        self.estimated_size += 2 * size_of::<u16>();
        match &triple.value {
            Some(value) => {
                self.estimated_size += self.store.size_of(value);
                self.store.observe(value);
            }
            None => self.null_count += 1,
        }
        self.definition_levels.push(triple.definition_level);
        self.repetition_levels.push(triple.repetition_level);
        self.dictionary.push(triple.value);
    }

    /// Clears values, levels, dictionary and statistics.
    pub fn reset(&mut self) {
        self.store.reset();
        self.dictionary.reset();
        self.definition_levels.clear();
        self.repetition_levels.clear();
        self.num_rows = 0;
        self.null_count = 0;
        self.estimated_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use shale_dtype::Schema;
    use shale_error::ShaleError;

    use super::*;

    fn country() -> ColumnChunk {
        let mut schema = Schema::new();
        schema
            .add_column(&FieldPath::from_name("Country"), PhysicalType::Utf8, Repetition::Optional)
            .unwrap();
        let leaf = schema.find_column(&FieldPath::from_name("Country")).unwrap();
        ColumnChunk::new(leaf, store_for(PhysicalType::Utf8))
    }

    #[test]
    fn commit_tracks_stats() {
        let mut chunk = country();
        chunk.commit(Triple::new(Some("us".into()), 1, 0));
        chunk.commit(Triple::absent(0, 0));
        chunk.commit(Triple::new(Some("gb".into()), 1, 0));

        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.num_rows(), 3);
        assert_eq!(chunk.null_count(), 1);
        assert_eq!(chunk.min(), Some(ScalarValue::from("gb")));
        assert_eq!(chunk.max_value(), Some(b"us".to_vec()));
        assert_eq!(
            chunk.assemble(),
            vec![Some(ScalarValue::from("us")), None, Some(ScalarValue::from("gb"))]
        );
        assert_eq!(chunk.definition_levels(), &[1, 0, 1]);
        assert_eq!(chunk.to_levels().len(), 3);
    }

    #[test]
    fn typed_values_skip_absent() {
        let mut chunk = country();
        chunk.commit(Triple::absent(0, 0));
        chunk.commit(Triple::new(Some("fr".into()), 1, 0));
        assert_eq!(chunk.typed_values::<String>().unwrap(), vec!["fr".to_string()]);
        assert!(matches!(
            chunk.typed_values::<i64>().unwrap_err(),
            ShaleError::TypeMismatch(..)
        ));
    }

    #[test]
    fn reset_clears_everything() {
        let mut chunk = country();
        chunk.commit(Triple::new(Some("us".into()), 1, 0));
        chunk.reset();
        assert!(chunk.is_empty());
        assert_eq!(chunk.num_rows(), 0);
        assert_eq!(chunk.min_value(), None);
        assert_eq!(chunk.estimated_size(), 0);
        assert!(chunk.dictionary().values().is_empty());
    }
}
