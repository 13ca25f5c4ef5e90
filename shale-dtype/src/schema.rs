//! The nested schema tree.
//!
//! A [`Schema`] is a tree of [`SchemaNode`]s rooted at an unnamed, required group. Groups hold
//! ordered children; leaves describe one physical column each. The maximum definition and
//! repetition levels of every node are computed when the node is added and never change.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use shale_error::{ShaleResult, shale_bail, shale_err};

use crate::{FieldName, FieldPath, PhysicalType, Repetition};

/// What a [`SchemaNode`] holds: either nested children or a typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// An internal node with children in declaration order
    Group(Vec<SchemaNode>),
    /// A leaf column
    Leaf {
        /// The scalar type of the values stored in the column
        physical_type: PhysicalType,
        /// The index of the column, assigned in registration order
        column: usize,
    },
}

/// One node of the schema tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaNode {
    name: FieldName,
    path: FieldPath,
    repetition: Repetition,
    kind: NodeKind,
    max_definition_level: u16,
    max_repetition_level: u16,
}

impl SchemaNode {
    fn root() -> Self {
        Self {
            name: FieldName::from(""),
            path: FieldPath::root(),
            repetition: Repetition::Required,
            kind: NodeKind::Group(Vec::new()),
            max_definition_level: 0,
            max_repetition_level: 0,
        }
    }

    fn child_of(parent: &SchemaNode, name: FieldName, repetition: Repetition, kind: NodeKind) -> Self {
        Self {
            path: parent.path.child(name.clone()),
            name,
            repetition,
            kind,
            max_definition_level: parent.max_definition_level
                + u16::from(repetition.contributes_definition()),
            max_repetition_level: parent.max_repetition_level
                + u16::from(repetition.contributes_repetition()),
        }
    }

    /// The local name of the node, unique among its siblings
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full path of the node from the root
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// How often the node may occur within its parent
    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// What the node holds
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The number of optional or repeated nodes on the path from the root to this node, inclusive
    pub fn max_definition_level(&self) -> u16 {
        self.max_definition_level
    }

    /// The number of repeated nodes on the path from the root to this node, inclusive
    pub fn max_repetition_level(&self) -> u16 {
        self.max_repetition_level
    }

    /// Returns true if the node is a leaf column
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// The physical type of a leaf, `None` for groups
    pub fn physical_type(&self) -> Option<PhysicalType> {
        match self.kind {
            NodeKind::Leaf { physical_type, .. } => Some(physical_type),
            NodeKind::Group(_) => None,
        }
    }

    /// The column index of a leaf, `None` for groups
    pub fn column(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { column, .. } => Some(column),
            NodeKind::Group(_) => None,
        }
    }

    /// The children of a group in declaration order; empty for leaves
    pub fn children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Group(children) => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children().iter().find(|c| c.name.as_ref() == name)
    }

    /// All leaves of the subtree rooted at this node, in schema (depth-first) order
    pub fn leaves(&self) -> Vec<&SchemaNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a SchemaNode>) {
        match &self.kind {
            NodeKind::Leaf { .. } => leaves.push(self),
            NodeKind::Group(children) => children.iter().for_each(|c| c.collect_leaves(leaves)),
        }
    }
}

impl Display for SchemaNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::Leaf { physical_type, .. } => {
                write!(f, "{} {} {}", self.repetition, physical_type, self.name)
            }
            NodeKind::Group(children) => write!(
                f,
                "{} group {} {{{}}}",
                self.repetition,
                self.name,
                children.iter().join("; ")
            ),
        }
    }
}

/// A nested schema: the root group plus every node registered beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schema {
    root: SchemaNode,
    num_columns: usize,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self {
            root: SchemaNode::root(),
            num_columns: 0,
        }
    }

    /// The root group of the schema
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The number of leaf columns
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Add an internal group node at `path`.
    ///
    /// Fails if a parent segment is missing, if the parent is a leaf, or if `path` already exists.
    pub fn add_group(&mut self, path: &FieldPath, repetition: Repetition) -> ShaleResult<()> {
        self.insert(path, repetition, NodeKind::Group(Vec::new()))?;
        log::debug!("Added {repetition} group {path}");
        Ok(())
    }

    /// Add a leaf column at `path`, returning its column index.
    ///
    /// Fails under the same conditions as [`Schema::add_group`].
    pub fn add_column(
        &mut self,
        path: &FieldPath,
        physical_type: PhysicalType,
        repetition: Repetition,
    ) -> ShaleResult<usize> {
        let column = self.num_columns;
        self.insert(
            path,
            repetition,
            NodeKind::Leaf {
                physical_type,
                column,
            },
        )?;
        self.num_columns += 1;
        log::debug!("Added {repetition} {physical_type} column {path} as #{column}");
        Ok(column)
    }

    fn insert(&mut self, path: &FieldPath, repetition: Repetition, kind: NodeKind) -> ShaleResult<()> {
        let Some((name, parents)) = path.segments().split_last() else {
            shale_bail!(InvalidSchema: "Cannot add a node at the root path");
        };

        let mut parent = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let NodeKind::Group(children) = &mut parent.kind else {
                shale_bail!(
                    InvalidSchema: "{} is a column and cannot have children, adding {path}",
                    parent.path
                );
            };
            parent = children
                .iter_mut()
                .find(|c| c.name == *segment)
                .ok_or_else(|| {
                    shale_err!(
                        UnknownColumnPath: "Parent {} of {path} does not exist",
                        FieldPath::from(parents[..=depth].to_vec())
                    )
                })?;
        }

        let node = SchemaNode::child_of(parent, name.clone(), repetition, kind);
        let NodeKind::Group(children) = &mut parent.kind else {
            shale_bail!(
                InvalidSchema: "{} is a column and cannot have children, adding {path}",
                parent.path
            );
        };
        if children.iter().any(|c| c.name == *name) {
            shale_bail!(DuplicateColumnPath: "{path} already exists");
        }
        children.push(node);
        Ok(())
    }

    /// Find any node by path; the root path returns the root group
    pub fn find(&self, path: &FieldPath) -> Option<&SchemaNode> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Find a leaf column by path
    pub fn find_column(&self, path: &FieldPath) -> ShaleResult<&SchemaNode> {
        match self.find(path) {
            Some(node) if node.is_leaf() => Ok(node),
            Some(_) => Err(shale_err!(ColumnNotFound: "{path} is a group, not a column")),
            None => Err(shale_err!(ColumnNotFound: "{path}")),
        }
    }

    /// All leaf columns in schema (depth-first) order
    pub fn leaves(&self) -> Vec<&SchemaNode> {
        self.root.leaves()
    }

    /// The leaf columns beneath the node at `path` in schema order; a leaf path yields itself
    pub fn leaves_under(&self, path: &FieldPath) -> ShaleResult<Vec<&SchemaNode>> {
        self.find(path)
            .map(SchemaNode::leaves)
            .ok_or_else(|| shale_err!(ColumnNotFound: "{path}"))
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "message {{{}}}", self.root.children().iter().join("; "))
    }
}
