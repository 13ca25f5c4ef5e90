//! Convert a [`Schema`] into an equivalent Arrow schema.
//!
//! Optional nodes become nullable fields, repeated nodes become non-nullable `List` fields whose
//! items are non-nullable, and groups become `Struct`s.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Fields, Schema as ArrowSchema};

use crate::{NodeKind, PhysicalType, Repetition, Schema, SchemaNode};

impl From<PhysicalType> for DataType {
    fn from(value: PhysicalType) -> Self {
        match value {
            PhysicalType::Bool => DataType::Boolean,
            PhysicalType::I32 => DataType::Int32,
            PhysicalType::I64 => DataType::Int64,
            PhysicalType::F32 => DataType::Float32,
            PhysicalType::F64 => DataType::Float64,
            PhysicalType::Binary => DataType::Binary,
            PhysicalType::Utf8 => DataType::Utf8,
        }
    }
}

impl Schema {
    /// Returns the Arrow schema describing the same nesting as this schema.
    pub fn to_arrow(&self) -> ArrowSchema {
        ArrowSchema::new(
            self.root()
                .children()
                .iter()
                .map(SchemaNode::to_arrow_field)
                .collect::<Fields>(),
        )
    }
}

impl SchemaNode {
    /// Returns the Arrow field for this node and its subtree.
    pub fn to_arrow_field(&self) -> Field {
        let data_type = match self.kind() {
            NodeKind::Leaf { physical_type, .. } => DataType::from(*physical_type),
            NodeKind::Group(children) => DataType::Struct(
                children
                    .iter()
                    .map(SchemaNode::to_arrow_field)
                    .collect::<Fields>(),
            ),
        };
        match self.repetition() {
            Repetition::Required => Field::new(self.name(), data_type, false),
            Repetition::Optional => Field::new(self.name(), data_type, true),
            Repetition::Repeated => Field::new(
                self.name(),
                DataType::List(Arc::new(Field::new("item", data_type, false))),
                false,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldPath;

    #[test]
    fn nested_document_to_arrow() {
        let mut schema = Schema::new();
        schema
            .add_column(&FieldPath::from_name("DocId"), PhysicalType::I64, Repetition::Required)
            .unwrap();
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

        let arrow = schema.to_arrow();
        assert_eq!(arrow.fields().len(), 2);
        assert_eq!(arrow.field(0), &Field::new("DocId", DataType::Int64, false));

        let links = arrow.field(1);
        assert!(links.is_nullable());
        let DataType::Struct(fields) = links.data_type() else {
            panic!("Links must be a struct, got {}", links.data_type());
        };
        assert_eq!(
            fields[0].as_ref(),
            &Field::new(
                "Forward",
                DataType::List(Arc::new(Field::new("item", DataType::Int64, false))),
                false
            )
        );
    }
}
