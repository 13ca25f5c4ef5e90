use shale_dtype::{FieldPath, PhysicalType, Repetition, Schema, SchemaNode};
use shale_error::{ShaleResult, shale_bail, shale_err};
use shale_scalar::ToRecord;

use crate::assemble::RecordReader;
use crate::column::{ColumnChunk, ColumnStore, store_for};
use crate::levels::{ColumnLevels, ColumnSource};
use crate::options::ShredOptions;
use crate::projection::Projection;
use crate::shred::Shredder;

/// The in-memory column buffers of one row group, keyed by the schema they were declared in.
///
/// Columns and groups are declared up front with [`RowStore::add_group`] and
/// [`RowStore::add_column`]; records are then shredded into the columns with
/// [`RowStore::shred`] and read back through [`RowStore::reader`].
#[derive(Debug, Default)]
pub struct RowStore {
    schema: Schema,
    /// Indexed by column index
    columns: Vec<ColumnChunk>,
    options: ShredOptions,
    num_rows: usize,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one column per leaf of `schema`, using the built-in stores.
    pub fn try_from_schema(schema: Schema) -> ShaleResult<Self> {
        let mut leaves = schema.leaves();
        leaves.sort_by_key(|leaf| leaf.column());
        let columns = leaves
            .into_iter()
            .map(|leaf| {
                let physical_type = leaf
                    .physical_type()
                    .ok_or_else(|| shale_err!(InvalidSchema: "{} is not a leaf", leaf.path()))?;
                Ok(ColumnChunk::new(leaf, store_for(physical_type)))
            })
            .collect::<ShaleResult<Vec<_>>>()?;
        Ok(Self {
            schema,
            columns,
            options: ShredOptions::default(),
            num_rows: 0,
        })
    }

    pub fn with_options(mut self, options: ShredOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ShredOptions {
        &self.options
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declares a group at the dot-joined `path`.
    pub fn add_group(&mut self, path: &str, repetition: Repetition) -> ShaleResult<()> {
        self.ensure_empty(path)?;
        self.schema.add_group(&FieldPath::parse(path)?, repetition)
    }

    /// Declares a leaf column at the dot-joined `path` with the built-in store for
    /// `physical_type`.
    pub fn add_column(
        &mut self,
        path: &str,
        physical_type: PhysicalType,
        repetition: Repetition,
    ) -> ShaleResult<()> {
        self.add_column_with_store(path, store_for(physical_type), repetition)
    }

    /// Declares a leaf column at the dot-joined `path` backed by a custom [`ColumnStore`].
    pub fn add_column_with_store(
        &mut self,
        path: &str,
        store: Box<dyn ColumnStore>,
        repetition: Repetition,
    ) -> ShaleResult<()> {
        self.ensure_empty(path)?;
        let path = FieldPath::parse(path)?;
        let column = self
            .schema
            .add_column(&path, store.physical_type(), repetition)?;
        let leaf = self.schema.find_column(&path)?;
        debug_assert_eq!(column, self.columns.len());
        self.columns.push(ColumnChunk::new(leaf, store));
        Ok(())
    }

    fn ensure_empty(&self, path: &str) -> ShaleResult<()> {
        if self.num_rows > 0 {
            shale_bail!(
                "Cannot declare {path} in a store already holding {} rows",
                self.num_rows
            );
        }
        Ok(())
    }

    /// Looks up a leaf column by its dot-joined path.
    pub fn find_column(&self, path: &str) -> ShaleResult<&ColumnChunk> {
        let leaf = self.schema.find_column(&FieldPath::parse(path)?)?;
        self.chunk(leaf)
    }

    fn chunk(&self, leaf: &SchemaNode) -> ShaleResult<&ColumnChunk> {
        leaf.column()
            .and_then(|column| self.columns.get(column))
            .filter(|chunk| chunk.path() == leaf.path())
            .ok_or_else(|| shale_err!(ColumnNotFound: "{}", leaf.path()))
    }

    /// The leaf columns in schema order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnChunk> + '_ {
        self.schema
            .leaves()
            .into_iter()
            .filter_map(move |leaf| self.chunk(leaf).ok())
    }

    /// The number of records shredded since the last reset
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// The estimated encoded size of all columns
    pub fn estimated_size(&self) -> usize {
        self.columns.iter().map(ColumnChunk::estimated_size).sum()
    }

    /// Shreds one record into the columns.
    ///
    /// The whole record is staged before anything is appended, so on error no column changes.
    pub fn shred<R: ToRecord + ?Sized>(&mut self, record: &R) -> ShaleResult<()> {
        let record = record.to_record()?;
        let staged = Shredder::new(&self.columns, &self.options)
            .shred(self.schema.root(), &record)
            .map_err(|e| e.with_context(format!("Shredding record {}", self.num_rows)))?;

        for (column, triples) in self.columns.iter_mut().zip(staged) {
            for triple in triples {
                column.commit(triple);
            }
        }
        log::trace!("Shredded record {}: {record}", self.num_rows);
        self.num_rows += 1;
        Ok(())
    }

    /// Alias of [`RowStore::shred`].
    pub fn add<R: ToRecord + ?Sized>(&mut self, record: &R) -> ShaleResult<()> {
        self.shred(record)
    }

    /// Reads back records from the selected columns.
    pub fn reader(&self, projection: &Projection) -> ShaleResult<RecordReader> {
        RecordReader::try_new(&self.schema, projection, self)
    }

    /// Clears all values, levels, dictionaries and statistics, keeping the schema.
    pub fn reset(&mut self) {
        log::debug!(
            "Resetting {} columns holding {} rows",
            self.columns.len(),
            self.num_rows
        );
        self.columns.iter_mut().for_each(ColumnChunk::reset);
        self.num_rows = 0;
    }
}

impl ColumnSource for RowStore {
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels> {
        self.chunk(leaf).map(ColumnChunk::to_levels)
    }
}

#[cfg(test)]
mod tests {
    use shale_error::ShaleError;
    use shale_scalar::{Record, ScalarValue};

    use super::*;

    fn links() -> RowStore {
        let mut store = RowStore::new();
        store
            .add_column("DocId", PhysicalType::I64, Repetition::Required)
            .unwrap();
        store.add_group("Links", Repetition::Optional).unwrap();
        store
            .add_column("Links.Backward", PhysicalType::I64, Repetition::Repeated)
            .unwrap();
        store
            .add_column("Links.Forward", PhysicalType::I64, Repetition::Repeated)
            .unwrap();
        store
    }

    #[test]
    fn registration_errors() {
        let mut store = links();
        assert!(matches!(
            store
                .add_column("Name.Url", PhysicalType::Utf8, Repetition::Optional)
                .unwrap_err(),
            ShaleError::UnknownColumnPath(..)
        ));
        assert!(matches!(
            store
                .add_column("Links.Forward", PhysicalType::I64, Repetition::Repeated)
                .unwrap_err(),
            ShaleError::DuplicateColumnPath(..)
        ));
        assert!(matches!(
            store.find_column("Links").unwrap_err(),
            ShaleError::ColumnNotFound(..)
        ));
        assert_eq!(store.columns().count(), 3);
    }

    #[test]
    fn schema_is_frozen_once_data_arrives() {
        let mut store = links();
        store.shred(&Record::new().with("DocId", 1i64)).unwrap();
        let err = store.add_group("Name", Repetition::Repeated).unwrap_err();
        assert!(matches!(err, ShaleError::InvalidArgument(..)));

        store.reset();
        store.add_group("Name", Repetition::Repeated).unwrap();
    }

    #[test]
    fn failed_record_is_not_committed() {
        let mut store = links();
        store
            .shred(&Record::new().with("DocId", 1i64).with("Links", Record::new().with("Forward", vec![1i64])))
            .unwrap();
        let err = store
            .shred(&Record::new().with("DocId", 2i64).with("Links", Record::new().with("Forward", vec!["x"])))
            .unwrap_err();
        assert!(matches!(err.root_cause(), ShaleError::TypeMismatch(..)));

        assert_eq!(store.num_rows(), 1);
        for column in store.columns() {
            assert_eq!(column.len(), 1);
        }
        assert_eq!(store.find_column("DocId").unwrap().max(), Some(ScalarValue::I64(1)));
    }

    #[test]
    fn row_store_is_a_column_source() {
        let mut store = links();
        let record = Record::new()
            .with("DocId", 10i64)
            .with("Links", Record::new().with("Forward", vec![20i64, 40, 60]));
        store.shred(&record).unwrap();
        assert!(store.estimated_size() > 0);

        let read = store
            .reader(&Projection::all())
            .unwrap()
            .collect::<ShaleResult<Vec<_>>>()
            .unwrap();
        assert_eq!(read, vec![record]);
    }
}
