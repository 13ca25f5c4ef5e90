//! Shredding: one nested record into per-column triples.
//!
//! The schema and the record are walked together. The walk carries the definition level (how many
//! optional or repeated nodes on the path are present) and the repetition level the next emitted
//! triple inherits. An absent optional node, or an absent or empty repeated node, emits one absent
//! triple for every leaf beneath it at the level reached so far.
//!
//! Triples are staged per column and only committed by the caller once the whole record has been
//! walked, so a failing record leaves every column untouched.

use shale_dtype::{NodeKind, Repetition, SchemaNode};
use shale_error::{ShaleResult, shale_bail, shale_err};
use shale_scalar::{Record, Value};

use crate::column::ColumnChunk;
use crate::levels::Triple;
use crate::options::{ShredOptions, UnknownFieldPolicy};

pub(crate) struct Shredder<'a> {
    columns: &'a [ColumnChunk],
    options: &'a ShredOptions,
    staged: Vec<Vec<Triple>>,
}

impl<'a> Shredder<'a> {
    /// `columns` is indexed by column index.
    pub(crate) fn new(columns: &'a [ColumnChunk], options: &'a ShredOptions) -> Self {
        Self {
            columns,
            options,
            staged: vec![Vec::new(); columns.len()],
        }
    }

    /// Walks `record` from the schema root, returning the staged triples per column index.
    pub(crate) fn shred(mut self, root: &SchemaNode, record: &Record) -> ShaleResult<Vec<Vec<Triple>>> {
        self.shred_group(root, record, 0, 0)?;
        Ok(self.staged)
    }

    fn shred_group(
        &mut self,
        node: &SchemaNode,
        record: &Record,
        definition_level: u16,
        repetition_level: u16,
    ) -> ShaleResult<()> {
        let unknown = match self.options.unknown_fields {
            UnknownFieldPolicy::Ignore => None,
            UnknownFieldPolicy::Error => record.keys().find(|k| node.child(k).is_none()),
        };
        if let Some(unknown) = unknown {
            shale_bail!(UnknownField: "{}", node.path().child(unknown));
        }

        for child in node.children() {
            let value = record.get(child.name()).filter(|v| !v.is_null());
            self.shred_field(child, value, definition_level, repetition_level)?;
        }
        Ok(())
    }

    fn shred_field(
        &mut self,
        node: &SchemaNode,
        value: Option<&Value>,
        definition_level: u16,
        repetition_level: u16,
    ) -> ShaleResult<()> {
        match (node.repetition(), value) {
            (Repetition::Required, None) => {
                shale_bail!(MissingRequiredField: "{}", node.path())
            }
            (Repetition::Required, Some(value)) => {
                self.shred_present(node, value, definition_level, repetition_level)
            }
            (Repetition::Optional | Repetition::Repeated, None) => {
                self.emit_absent(node, definition_level, repetition_level);
                Ok(())
            }
            (Repetition::Optional, Some(value)) => {
                self.shred_present(node, value, definition_level + 1, repetition_level)
            }
            (Repetition::Repeated, Some(value)) => {
                self.shred_repeated(node, value, definition_level, repetition_level)
            }
        }
    }

    fn shred_repeated(
        &mut self,
        node: &SchemaNode,
        value: &Value,
        definition_level: u16,
        repetition_level: u16,
    ) -> ShaleResult<()> {
        let element_level = |idx: usize| {
            if idx == 0 {
                repetition_level
            } else {
                node.max_repetition_level()
            }
        };

        if let NodeKind::Leaf { column, .. } = node.kind() {
            let values = self
                .column(node, *column)?
                .store()
                .get_values(value)
                .map_err(|e| e.with_context(node.path().to_string()))?;
            if values.is_empty() {
                self.emit_absent(node, definition_level, repetition_level);
            }
            for (idx, value) in values.into_iter().enumerate() {
                self.stage(
                    *column,
                    Triple::new(Some(value), definition_level + 1, element_level(idx)),
                );
            }
            return Ok(());
        }

        let Value::List(elements) = value else {
            shale_bail!(
                TypeMismatch: "{} is repeated and expects a list, got {}",
                node.path(),
                value.shape()
            );
        };
        if elements.is_empty() {
            self.emit_absent(node, definition_level, repetition_level);
        }
        for (idx, element) in elements.iter().enumerate() {
            self.shred_present(node, element, definition_level + 1, element_level(idx))?;
        }
        Ok(())
    }

    /// Descends into a node known to be present with `value`, its own definition level included.
    fn shred_present(
        &mut self,
        node: &SchemaNode,
        value: &Value,
        definition_level: u16,
        repetition_level: u16,
    ) -> ShaleResult<()> {
        match (node.kind(), value) {
            (NodeKind::Leaf { column, .. }, Value::Scalar(scalar)) => {
                let coerced = self
                    .column(node, *column)?
                    .store()
                    .coerce(scalar)
                    .map_err(|e| e.with_context(node.path().to_string()))?;
                self.stage(
                    *column,
                    Triple::new(Some(coerced), definition_level, repetition_level),
                );
                Ok(())
            }
            (NodeKind::Group(_), Value::Group(record)) => {
                self.shred_group(node, record, definition_level, repetition_level)
            }
            (NodeKind::Leaf { .. }, other) => Err(shale_err!(
                TypeMismatch: "{} is a {} column, got {}",
                node.path(),
                node.physical_type().map_or_else(String::new, |p| p.to_string()),
                other.shape()
            )),
            (NodeKind::Group(_), other) => Err(shale_err!(
                TypeMismatch: "{} is a group, got {}",
                node.path(),
                other.shape()
            )),
        }
    }

    /// One absent triple for every leaf beneath `node`.
    fn emit_absent(&mut self, node: &SchemaNode, definition_level: u16, repetition_level: u16) {
        for leaf in node.leaves() {
            if let Some(column) = leaf.column() {
                self.stage(column, Triple::absent(definition_level, repetition_level));
            }
        }
    }

    fn column(&self, node: &SchemaNode, column: usize) -> ShaleResult<&'a ColumnChunk> {
        self.columns
            .get(column)
            .ok_or_else(|| shale_err!(ColumnNotFound: "{} (column #{column})", node.path()))
    }

    fn stage(&mut self, column: usize, triple: Triple) {
        if let Some(staged) = self.staged.get_mut(column) {
            staged.push(triple);
        }
    }
}
