//! Decoded per-column level streams, the exchange format with page framing.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use shale_dtype::{FieldPath, SchemaNode};
use shale_error::{ShaleResult, shale_bail, shale_err};
use shale_scalar::ScalarValue;

/// One emitted `(value, definition level, repetition level)` entry of a leaf column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    /// The atomic value, `None` if the leaf or one of its ancestors is absent
    pub value: Option<ScalarValue>,
    /// How many optional or repeated nodes on the path are present
    pub definition_level: u16,
    /// The depth of the repeated node that started a new element, 0 for a new record
    pub repetition_level: u16,
}

impl Triple {
    pub fn new(value: Option<ScalarValue>, definition_level: u16, repetition_level: u16) -> Self {
        Self {
            value,
            definition_level,
            repetition_level,
        }
    }

    pub fn absent(definition_level: u16, repetition_level: u16) -> Self {
        Self::new(None, definition_level, repetition_level)
    }
}

/// The parallel value, definition level and repetition level sequences of one leaf column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLevels {
    values: Vec<Option<ScalarValue>>,
    definition_levels: Vec<u16>,
    repetition_levels: Vec<u16>,
}

impl ColumnLevels {
    /// Creates level streams, checking that the three sequences line up.
    pub fn try_new(
        values: Vec<Option<ScalarValue>>,
        definition_levels: Vec<u16>,
        repetition_levels: Vec<u16>,
    ) -> ShaleResult<Self> {
        if values.len() != definition_levels.len() || values.len() != repetition_levels.len() {
            shale_bail!(
                ColumnDesync: "{} values, {} definition levels and {} repetition levels",
                values.len(),
                definition_levels.len(),
                repetition_levels.len()
            );
        }
        if let Some(first) = repetition_levels.first().filter(|r| **r != 0) {
            shale_bail!(ColumnDesync: "Level streams must start a record, got repetition level {first}");
        }
        Ok(Self {
            values,
            definition_levels,
            repetition_levels,
        })
    }

    pub fn values(&self) -> &[Option<ScalarValue>] {
        &self.values
    }

    pub fn definition_levels(&self) -> &[u16] {
        &self.definition_levels
    }

    pub fn repetition_levels(&self) -> &[u16] {
        &self.repetition_levels
    }

    /// The number of triples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The number of records: triples with repetition level 0
    pub fn num_rows(&self) -> usize {
        self.repetition_levels.iter().filter(|r| **r == 0).count()
    }

    /// Checks that no level exceeds the maxima of `leaf` and that values are present exactly at
    /// the maximum definition level.
    pub fn validate(&self, leaf: &SchemaNode) -> ShaleResult<()> {
        for (idx, triple) in self.iter().enumerate() {
            if triple.definition_level > leaf.max_definition_level()
                || triple.repetition_level > leaf.max_repetition_level()
            {
                shale_bail!(
                    ColumnDesync: "{}: levels ({}, {}) at {idx} exceed maxima ({}, {})",
                    leaf.path(),
                    triple.definition_level,
                    triple.repetition_level,
                    leaf.max_definition_level(),
                    leaf.max_repetition_level()
                );
            }
            if triple.value.is_some() != (triple.definition_level == leaf.max_definition_level()) {
                shale_bail!(
                    ColumnDesync: "{}: value presence at {idx} disagrees with definition level {}",
                    leaf.path(),
                    triple.definition_level
                );
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = Triple> + '_ {
        self.values
            .iter()
            .zip(&self.definition_levels)
            .zip(&self.repetition_levels)
            .map(|((v, d), r)| Triple::new(v.clone(), *d, *r))
    }

    pub(crate) fn push(&mut self, triple: Triple) {
        self.values.push(triple.value);
        self.definition_levels.push(triple.definition_level);
        self.repetition_levels.push(triple.repetition_level);
    }

    pub fn into_parts(self) -> (Vec<Option<ScalarValue>>, Vec<u16>, Vec<u16>) {
        (self.values, self.definition_levels, self.repetition_levels)
    }
}

impl FromIterator<Triple> for ColumnLevels {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut levels = ColumnLevels::default();
        iter.into_iter().for_each(|t| levels.push(t));
        levels
    }
}

/// A supplier of decoded level streams for leaf columns, the input of a
/// [`RecordReader`](crate::RecordReader).
pub trait ColumnSource {
    /// Returns the level streams of the leaf column `leaf`.
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels>;
}

impl<S: BuildHasher> ColumnSource for HashMap<FieldPath, ColumnLevels, S> {
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels> {
        self.get(leaf.path())
            .cloned()
            .ok_or_else(|| shale_err!(ColumnNotFound: "No levels supplied for {}", leaf.path()))
    }
}

impl ColumnSource for BTreeMap<FieldPath, ColumnLevels> {
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels> {
        self.get(leaf.path())
            .cloned()
            .ok_or_else(|| shale_err!(ColumnNotFound: "No levels supplied for {}", leaf.path()))
    }
}

impl<T: ColumnSource + ?Sized> ColumnSource for &T {
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels> {
        (**self).column_levels(leaf)
    }
}

#[cfg(test)]
mod tests {
    use shale_dtype::{PhysicalType, Repetition, Schema};
    use shale_error::ShaleError;

    use super::*;

    fn forward() -> Schema {
        let mut schema = Schema::new();
        schema
            .add_group(&FieldPath::from_name("Links"), Repetition::Optional)
            .unwrap();
        schema
            .add_column(
                &FieldPath::parse("Links.Forward").unwrap(),
                PhysicalType::I64,
                Repetition::Repeated,
            )
            .unwrap();
        schema
    }

    #[test]
    fn mismatched_lengths() {
        let err = ColumnLevels::try_new(vec![None], vec![0, 0], vec![0]).unwrap_err();
        assert!(matches!(err, ShaleError::ColumnDesync(..)));
    }

    #[test]
    fn must_start_at_record_boundary() {
        let err = ColumnLevels::try_new(vec![None], vec![0], vec![1]).unwrap_err();
        assert!(matches!(err, ShaleError::ColumnDesync(..)));
    }

    #[test]
    fn rows_and_validation() {
        let schema = forward();
        let leaf = schema.find_column(&FieldPath::parse("Links.Forward").unwrap()).unwrap();

        let levels = ColumnLevels::try_new(
            vec![Some(20i64.into()), Some(40i64.into()), None],
            vec![2, 2, 1],
            vec![0, 1, 0],
        )
        .unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels.num_rows(), 2);
        levels.validate(leaf).unwrap();

        let bad = ColumnLevels::try_new(vec![None], vec![2], vec![0]).unwrap();
        assert!(matches!(bad.validate(leaf).unwrap_err(), ShaleError::ColumnDesync(..)));
    }

    #[test]
    fn map_source() {
        let schema = forward();
        let leaf = schema.find_column(&FieldPath::parse("Links.Forward").unwrap()).unwrap();
        let mut source: HashMap<FieldPath, ColumnLevels> = HashMap::new();
        assert!(matches!(
            source.column_levels(leaf).unwrap_err(),
            ShaleError::ColumnNotFound(..)
        ));
        source.insert(leaf.path().clone(), ColumnLevels::default());
        assert!(source.column_levels(leaf).unwrap().is_empty());
    }
}
