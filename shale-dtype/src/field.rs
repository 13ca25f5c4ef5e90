//! Paths addressing nodes of a (possibly nested) schema tree
//!
//! A `FieldPath` is a sequence of field names, written as a dot-joined string such as
//! `Name.Language.Code`. The empty path addresses the root of the schema.

use core::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use shale_error::{ShaleError, ShaleResult, shale_bail};

/// A name for a field in a group
pub type FieldName = Arc<str>;

/// A path through a (possibly nested) schema, composed of a sequence of field names
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPath(Vec<FieldName>);

impl FieldPath {
    /// The path of the root group itself
    pub fn root() -> Self {
        Self(vec![])
    }

    /// Constructs a path to a direct child of the root
    pub fn from_name<F: Into<FieldName>>(name: F) -> Self {
        Self(vec![name.into()])
    }

    /// Parses a dot-joined path, rejecting empty segments.
    ///
    /// The empty string parses to the root path.
    pub fn parse(path: &str) -> ShaleResult<Self> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                shale_bail!("Field path {path:?} contains an empty segment");
            }
            segments.push(FieldName::from(segment));
        }
        Ok(Self(segments))
    }

    /// Returns the sequence of names that make up this path
    pub fn segments(&self) -> &[FieldName] {
        &self.0
    }

    /// Returns the number of segments in this path
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this path addresses the root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this path has no segments, which is the root path
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// The last segment of the path, or `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(AsRef::as_ref)
    }

    /// The path of the enclosing group, or `None` for the root
    pub fn parent(&self) -> Option<FieldPath> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Pushes a new name to the end of this path
    pub fn push<F: Into<FieldName>>(&mut self, name: F) {
        self.0.push(name.into());
    }

    /// Returns a new path addressing the child `name` of this path
    pub fn child<F: Into<FieldName>>(&self, name: F) -> FieldPath {
        let mut path = self.clone();
        path.push(name);
        path
    }

    /// Returns true if `prefix` is an ancestor-or-self of this path
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl FromStr for FieldPath {
    type Err = ShaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = ShaleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromIterator<FieldName> for FieldPath {
    fn from_iter<T: IntoIterator<Item = FieldName>>(iter: T) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl From<Vec<FieldName>> for FieldPath {
    fn from(value: Vec<FieldName>) -> Self {
        FieldPath(value)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.iter().format("."), f)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_field_path() {
        let mut path = FieldPath::from_name("Name");
        path.push("Language");
        path.push("Code");
        assert_eq!(path.to_string(), "Name.Language.Code");
        assert_eq!(path.name(), Some("Code"));
        assert_eq!(path.len(), 3);

        let parsed = FieldPath::parse("Name.Language.Code").unwrap();
        assert_eq!(parsed, path);
        assert_eq!(
            parsed.parent().unwrap(),
            FieldPath::parse("Name.Language").unwrap()
        );
        assert!(parsed.starts_with(&FieldPath::from_name("Name")));
        assert!(!parsed.starts_with(&FieldPath::from_name("Links")));
    }

    #[test]
    fn root_path() {
        let root = FieldPath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root.child("DocId"), FieldPath::from_name("DocId"));
    }

    #[rstest]
    #[case(".a")]
    #[case("a.")]
    #[case("a..b")]
    fn rejects_empty_segments(#[case] path: &str) {
        assert!(FieldPath::parse(path).is_err());
    }
}
