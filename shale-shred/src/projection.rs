use hashbrown::HashSet;
use itertools::Itertools;
use shale_dtype::{FieldPath, Schema, SchemaNode};
use shale_error::{ShaleResult, shale_bail};

/// The set of leaf columns a reader reconstructs records from.
///
/// A selected path may name a leaf column or a group, which stands for every leaf beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every leaf column of the schema
    #[default]
    All,
    /// The leaves at or beneath the listed paths
    Paths(Vec<FieldPath>),
}

impl Projection {
    pub fn all() -> Self {
        Self::All
    }

    pub fn new<I: IntoIterator<Item = FieldPath>>(paths: I) -> Self {
        Self::Paths(paths.into_iter().collect())
    }

    /// Parses dot-joined paths.
    pub fn parse<I, S>(paths: I) -> ShaleResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|p| FieldPath::parse(p.as_ref()))
            .collect::<ShaleResult<Vec<_>>>()
            .map(Self::Paths)
    }

    /// Resolves the selection against `schema`, returning the selected leaves in schema order.
    ///
    /// Paths selected more than once, directly or through a group, are returned once. Fails with
    /// `ColumnNotFound` if a path does not exist, or if nothing is selected.
    pub fn resolve<'a>(&self, schema: &'a Schema) -> ShaleResult<Vec<&'a SchemaNode>> {
        let leaves = match self {
            Projection::All => schema.leaves(),
            Projection::Paths(paths) => {
                let mut selected = HashSet::new();
                for path in paths {
                    selected.extend(
                        schema
                            .leaves_under(path)?
                            .into_iter()
                            .filter_map(SchemaNode::column),
                    );
                }
                schema
                    .leaves()
                    .into_iter()
                    .filter(|leaf| leaf.column().is_some_and(|c| selected.contains(&c)))
                    .collect()
            }
        };
        if leaves.is_empty() {
            shale_bail!(ColumnNotFound: "{self} selects no columns of {schema}");
        }
        Ok(leaves)
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Projection::All => write!(f, "*"),
            Projection::Paths(paths) => write!(f, "[{}]", paths.iter().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use shale_dtype::{PhysicalType, Repetition};
    use shale_error::ShaleError;

    use super::*;

    fn document() -> Schema {
        let mut schema = Schema::new();
        for (p, ptype, repetition) in [
            ("DocId", Some(PhysicalType::I64), Repetition::Required),
            ("Name", None, Repetition::Repeated),
            ("Name.Language", None, Repetition::Repeated),
            ("Name.Language.Code", Some(PhysicalType::Utf8), Repetition::Required),
            ("Name.Language.Country", Some(PhysicalType::Utf8), Repetition::Optional),
            ("Name.Url", Some(PhysicalType::Utf8), Repetition::Optional),
        ] {
            let path = FieldPath::parse(p).unwrap();
            match ptype {
                Some(ptype) => {
                    schema.add_column(&path, ptype, repetition).unwrap();
                }
                None => schema.add_group(&path, repetition).unwrap(),
            }
        }
        schema
    }

    fn selected(projection: &Projection, schema: &Schema) -> Vec<String> {
        projection
            .resolve(schema)
            .unwrap()
            .iter()
            .map(|n| n.path().to_string())
            .collect()
    }

    #[rstest]
    #[case(Projection::all(), vec!["DocId", "Name.Language.Code", "Name.Language.Country", "Name.Url"])]
    #[case(Projection::parse(["Name.Url"]).unwrap(), vec!["Name.Url"])]
    #[case(
        Projection::parse(["Name.Url", "Name.Language", "Name.Language.Code"]).unwrap(),
        vec!["Name.Language.Code", "Name.Language.Country", "Name.Url"]
    )]
    #[case(Projection::parse([""]).unwrap(), vec!["DocId", "Name.Language.Code", "Name.Language.Country", "Name.Url"])]
    fn resolves_in_schema_order(#[case] projection: Projection, #[case] expected: Vec<&str>) {
        assert_eq!(selected(&projection, &document()), expected);
    }

    #[test]
    fn unknown_path_fails() {
        let err = Projection::parse(["Name.Uri"])
            .unwrap()
            .resolve(&document())
            .unwrap_err();
        assert!(matches!(err, ShaleError::ColumnNotFound(..)));
    }

    #[test]
    fn empty_selection_fails() {
        let err = Projection::new([]).resolve(&document()).unwrap_err();
        assert!(matches!(err, ShaleError::ColumnNotFound(..)));
    }
}
