//! Batching shredded records into row groups.

use itertools::Itertools;
use shale_dtype::{FieldPath, Schema, SchemaNode};
use shale_error::{ShaleResult, shale_err};
use shale_scalar::ToRecord;

use crate::column::ColumnChunk;
use crate::levels::{ColumnLevels, ColumnSource};
use crate::options::WriterOptions;
use crate::row_store::RowStore;

/// One flushed leaf column: its level streams and the statistics gathered while shredding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroupColumn {
    pub path: FieldPath,
    pub levels: ColumnLevels,
    pub null_count: usize,
    pub min_value: Option<Vec<u8>>,
    pub max_value: Option<Vec<u8>>,
}

impl From<&ColumnChunk> for RowGroupColumn {
    fn from(chunk: &ColumnChunk) -> Self {
        Self {
            path: chunk.path().clone(),
            levels: chunk.to_levels(),
            null_count: chunk.null_count(),
            min_value: chunk.min_value(),
            max_value: chunk.max_value(),
        }
    }
}

/// The finalized columns of a batch of records, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    num_rows: usize,
    columns: Vec<RowGroupColumn>,
}

impl RowGroup {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn columns(&self) -> &[RowGroupColumn] {
        &self.columns
    }

    pub fn column(&self, path: &FieldPath) -> Option<&RowGroupColumn> {
        self.columns.iter().find(|c| &c.path == path)
    }
}

impl ColumnSource for RowGroup {
    fn column_levels(&self, leaf: &SchemaNode) -> ShaleResult<ColumnLevels> {
        self.column(leaf.path())
            .map(|c| c.levels.clone())
            .ok_or_else(|| shale_err!(ColumnNotFound: "{} is not in the row group", leaf.path()))
    }
}

/// Receives flushed row groups, typically to frame them into pages of a file.
pub trait RowGroupSink {
    fn write_row_group(&mut self, row_group: RowGroup) -> ShaleResult<()>;
}

impl RowGroupSink for Vec<RowGroup> {
    fn write_row_group(&mut self, row_group: RowGroup) -> ShaleResult<()> {
        self.push(row_group);
        Ok(())
    }
}

impl<S: RowGroupSink + ?Sized> RowGroupSink for &mut S {
    fn write_row_group(&mut self, row_group: RowGroup) -> ShaleResult<()> {
        (**self).write_row_group(row_group)
    }
}

/// Shreds records into a [`RowStore`] and hands it to a [`RowGroupSink`] whenever a row group
/// fills up.
pub struct RecordWriter<S> {
    store: RowStore,
    options: WriterOptions,
    sink: S,
    row_groups_written: usize,
}

impl<S: RowGroupSink> RecordWriter<S> {
    pub fn try_new(schema: Schema, options: WriterOptions, sink: S) -> ShaleResult<Self> {
        let store = RowStore::try_from_schema(schema)?.with_options(options.shred.clone());
        Ok(Self {
            store,
            options,
            sink,
            row_groups_written: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.store.schema()
    }

    /// The records shredded but not yet flushed
    pub fn buffered_rows(&self) -> usize {
        self.store.num_rows()
    }

    pub fn row_groups_written(&self) -> usize {
        self.row_groups_written
    }

    /// Shreds `record`, flushing the row group if it reached its limits.
    pub fn write<R: ToRecord + ?Sized>(&mut self, record: &R) -> ShaleResult<()> {
        self.store.shred(record)?;
        if self
            .options
            .should_flush(self.store.num_rows(), self.store.estimated_size())
        {
            self.flush()?;
        }
        Ok(())
    }

    /// Hands the buffered records to the sink as one row group and resets the store.
    ///
    /// Does nothing if no record is buffered.
    pub fn flush(&mut self) -> ShaleResult<()> {
        if self.store.num_rows() == 0 {
            return Ok(());
        }
        let row_group = RowGroup {
            num_rows: self.store.num_rows(),
            columns: self.store.columns().map(RowGroupColumn::from).collect(),
        };
        log::debug!(
            "Flushing row group {} with {} rows, ~{} bytes, columns [{}]",
            self.row_groups_written,
            row_group.num_rows,
            self.store.estimated_size(),
            row_group.columns.iter().map(|c| &c.path).join(", ")
        );
        self.sink.write_row_group(row_group)?;
        self.row_groups_written += 1;
        self.store.reset();
        Ok(())
    }

    /// Flushes the trailing row group and returns the sink.
    pub fn finish(mut self) -> ShaleResult<S> {
        self.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use shale_dtype::{PhysicalType, Repetition};
    use shale_scalar::Record;

    use super::*;
    use crate::{Projection, RecordReader};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .add_column(&FieldPath::from_name("Id"), PhysicalType::I32, Repetition::Required)
            .unwrap();
        schema
            .add_column(&FieldPath::from_name("Tags"), PhysicalType::Utf8, Repetition::Repeated)
            .unwrap();
        schema
    }

    fn record(id: i32) -> Record {
        Record::new()
            .with("Id", id)
            .with("Tags", (0..id).map(|t| format!("t{t}")).collect::<Vec<_>>())
    }

    #[test]
    fn flushes_by_row_count() {
        let options = WriterOptions::default().with_max_row_group_rows(2);
        let mut writer = RecordWriter::try_new(schema(), options, Vec::<RowGroup>::new()).unwrap();
        for id in 0..5 {
            writer.write(&record(id)).unwrap();
        }
        assert_eq!(writer.row_groups_written(), 2);
        assert_eq!(writer.buffered_rows(), 1);

        let row_groups = writer.finish().unwrap();
        assert_eq!(
            row_groups.iter().map(RowGroup::num_rows).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        let id = row_groups[1].column(&FieldPath::from_name("Id")).unwrap();
        assert_eq!(id.min_value, Some(2i32.to_le_bytes().to_vec()));
        assert_eq!(id.max_value, Some(3i32.to_le_bytes().to_vec()));
        assert_eq!(id.levels.repetition_levels(), &[0, 0]);
    }

    #[test]
    fn row_groups_read_back() {
        let schema = schema();
        let options = WriterOptions::default().with_max_row_group_rows(3);
        let row_groups = {
            let mut writer = RecordWriter::try_new(schema.clone(), options, Vec::<RowGroup>::new()).unwrap();
            for id in 1..=4 {
                writer.write(&record(id)).unwrap();
            }
            writer.finish().unwrap()
        };

        let read = row_groups
            .iter()
            .flat_map(|rg| RecordReader::try_new(&schema, &Projection::all(), rg).unwrap())
            .collect::<ShaleResult<Vec<_>>>()
            .unwrap();
        assert_eq!(read, (1..=4).map(record).collect::<Vec<_>>());
    }

    #[test]
    fn empty_flush_is_a_noop() {
        let mut sink: Vec<RowGroup> = Vec::new();
        let mut writer = RecordWriter::try_new(schema(), WriterOptions::default(), &mut sink).unwrap();
        writer.flush().unwrap();
        writer.finish().unwrap();
        assert!(sink.is_empty());
    }
}
