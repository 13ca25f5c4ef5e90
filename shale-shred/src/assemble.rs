//! Assembly: reconstructing nested records from the level streams of selected columns.
//!
//! Every call to [`RecordReader::next_record`] takes, from each selected column, the triples up
//! to the next repetition level 0, and rebuilds one record from them by walking the schema
//! top-down. At every node the first selected column beneath it, in schema order, decides
//! whether the node is present and, for repeated nodes, where its elements begin.

use std::ops::Range;

use itertools::Itertools;
use shale_dtype::{FieldPath, Repetition, Schema, SchemaNode};
use shale_error::{ShaleResult, shale_bail, shale_err};
use shale_scalar::{Record, Value};

use crate::levels::{ColumnSource, Triple};
use crate::projection::Projection;

/// The level stream of one selected column with its read cursor.
#[derive(Debug)]
struct SelectedColumn {
    path: FieldPath,
    triples: Vec<Triple>,
    pos: usize,
}

impl SelectedColumn {
    fn is_exhausted(&self) -> bool {
        self.pos >= self.triples.len()
    }

    /// Advances past the triples of the next record, returning their range.
    fn next_record(&mut self) -> ShaleResult<Range<usize>> {
        let start = self.pos;
        let first = self.triples.get(start).ok_or_else(|| {
            shale_err!(ColumnDesync: "{} is exhausted while other columns still hold records", self.path)
        })?;
        if first.repetition_level != 0 {
            shale_bail!(
                ColumnDesync: "{} does not start a record at triple {start}, repetition level is {}",
                self.path,
                first.repetition_level
            );
        }
        let end = self.triples[start + 1..]
            .iter()
            .position(|t| t.repetition_level == 0)
            .map_or(self.triples.len(), |offset| start + 1 + offset);
        self.pos = end;
        Ok(start..end)
    }
}

/// The triples of one selected column belonging to a single instance of a schema node.
#[derive(Clone, Copy)]
struct Slice<'a> {
    path: &'a FieldPath,
    triples: &'a [Triple],
}

impl<'a> Slice<'a> {
    fn first(&self) -> ShaleResult<&'a Triple> {
        self.triples
            .first()
            .ok_or_else(|| shale_err!(ColumnDesync: "{} ran out of triples mid-record", self.path))
    }

    /// Splits the slice into the elements of a repeated node with repetition level
    /// `max_repetition_level`.
    fn elements(&self, max_repetition_level: u16) -> Vec<Slice<'a>> {
        let mut elements = Vec::new();
        let mut start = 0;
        for (idx, triple) in self.triples.iter().enumerate().skip(1) {
            if triple.repetition_level <= max_repetition_level {
                elements.push(self.sub(start..idx));
                start = idx;
            }
        }
        elements.push(self.sub(start..self.triples.len()));
        elements
    }

    fn sub(&self, range: Range<usize>) -> Slice<'a> {
        Slice {
            path: self.path,
            triples: &self.triples[range],
        }
    }
}

/// Reconstructs records, one per call, from the selected columns of a [`ColumnSource`].
#[derive(Debug)]
pub struct RecordReader {
    schema: Schema,
    columns: Vec<SelectedColumn>,
    records_read: usize,
}

impl RecordReader {
    /// Resolves `projection` against `schema` and fetches the selected level streams.
    ///
    /// Fails with `ColumnNotFound` before reading anything if a selected path does not resolve.
    pub fn try_new<S: ColumnSource>(
        schema: &Schema,
        projection: &Projection,
        source: S,
    ) -> ShaleResult<Self> {
        let leaves = projection.resolve(schema)?;
        let columns = leaves
            .iter()
            .map(|leaf| {
                let levels = source.column_levels(leaf)?;
                levels.validate(leaf)?;
                Ok(SelectedColumn {
                    path: leaf.path().clone(),
                    triples: levels.iter().collect(),
                    pos: 0,
                })
            })
            .collect::<ShaleResult<Vec<_>>>()?;
        log::debug!(
            "Reading records from columns [{}]",
            columns.iter().map(|c| &c.path).join(", ")
        );
        Ok(Self {
            schema: schema.clone(),
            columns,
            records_read: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The paths of the selected leaf columns, in schema order
    pub fn selected_columns(&self) -> impl Iterator<Item = &FieldPath> {
        self.columns.iter().map(|c| &c.path)
    }

    /// The number of records returned so far
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Reconstructs the next record, or returns `None` once every selected column is exhausted.
    pub fn next_record(&mut self) -> ShaleResult<Option<Record>> {
        let Some(driving) = self.columns.first() else {
            return Ok(None);
        };
        if driving.is_exhausted() {
            if let Some(column) = self.columns.iter().find(|c| !c.is_exhausted()) {
                shale_bail!(
                    ColumnDesync: "{} still holds triples after {} records while {} is exhausted",
                    column.path,
                    self.records_read,
                    driving.path
                );
            }
            return Ok(None);
        }

        let ranges = self
            .columns
            .iter_mut()
            .map(SelectedColumn::next_record)
            .collect::<ShaleResult<Vec<_>>>()
            .map_err(|e| e.with_context(format!("record {}", self.records_read)))?;
        let slices = self
            .columns
            .iter()
            .zip(ranges)
            .map(|(column, range)| Slice {
                path: &column.path,
                triples: &column.triples[range],
            })
            .collect::<Vec<_>>();

        let record = assemble_group(self.schema.root(), &slices)
            .map_err(|e| e.with_context(format!("record {}", self.records_read)))?;
        log::trace!("Assembled record {}: {record}", self.records_read);
        self.records_read += 1;
        Ok(Some(record))
    }
}

impl Iterator for RecordReader {
    type Item = ShaleResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Rebuilds one instance of a group from the slices of the selected columns beneath it.
fn assemble_group(node: &SchemaNode, slices: &[Slice<'_>]) -> ShaleResult<Record> {
    let mut record = Record::new();
    let mut rest = slices;
    for child in node.children() {
        let count = rest
            .iter()
            .take_while(|s| s.path.starts_with(child.path()))
            .count();
        let (selected, remaining) = rest.split_at(count);
        rest = remaining;
        if selected.is_empty() {
            continue;
        }
        if let Some(value) = assemble_field(child, selected)? {
            record.insert(child.name(), value);
        }
    }
    if let Some(stray) = rest.first() {
        shale_bail!(ColumnDesync: "{} is not a column beneath {}", stray.path, node.path());
    }
    Ok(record)
}

/// Rebuilds the value of `node` within one instance of its parent, `None` if it is absent.
fn assemble_field(node: &SchemaNode, slices: &[Slice<'_>]) -> ShaleResult<Option<Value>> {
    let Some(driving) = slices.first() else {
        return Ok(None);
    };
    if driving.first()?.definition_level < node.max_definition_level() {
        for slice in slices {
            if slice.triples.len() != 1 {
                shale_bail!(
                    ColumnDesync: "{} is absent but {} holds {} triples for it",
                    node.path(),
                    slice.path,
                    slice.triples.len()
                );
            }
        }
        return Ok(None);
    }

    match node.repetition() {
        Repetition::Required | Repetition::Optional => assemble_instance(node, slices).map(Some),
        Repetition::Repeated => {
            let per_column = slices
                .iter()
                .map(|s| s.elements(node.max_repetition_level()))
                .collect::<Vec<_>>();
            let num_elements = per_column[0].len();
            if let Some((idx, other)) = per_column
                .iter()
                .enumerate()
                .find(|(_, e)| e.len() != num_elements)
            {
                shale_bail!(
                    ColumnDesync: "{} has {num_elements} elements of {} but {} has {}",
                    driving.path,
                    node.path(),
                    slices[idx].path,
                    other.len()
                );
            }
            (0..num_elements)
                .map(|element| {
                    let element_slices = per_column.iter().map(|e| e[element]).collect::<Vec<_>>();
                    assemble_instance(node, &element_slices)
                })
                .collect::<ShaleResult<Vec<_>>>()
                .map(|elements| Some(Value::List(elements)))
        }
    }
}

/// Rebuilds a single present instance of `node`.
fn assemble_instance(node: &SchemaNode, slices: &[Slice<'_>]) -> ShaleResult<Value> {
    if !node.is_leaf() {
        return assemble_group(node, slices).map(Value::Group);
    }
    let [slice] = slices else {
        shale_bail!(ColumnDesync: "{} received {} column slices", node.path(), slices.len());
    };
    let [triple] = slice.triples else {
        shale_bail!(
            ColumnDesync: "{} holds {} triples for a single value",
            node.path(),
            slice.triples.len()
        );
    };
    triple
        .value
        .clone()
        .map(Value::Scalar)
        .ok_or_else(|| shale_err!(ColumnDesync: "{} is defined but holds no value", node.path()))
}
