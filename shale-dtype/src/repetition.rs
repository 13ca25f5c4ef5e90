use std::fmt::{Display, Formatter};

/// How many times a schema node may occur within one instance of its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Repetition {
    /// Exactly once
    #[default]
    Required,
    /// Zero or one times
    Optional,
    /// Zero or more times
    Repeated,
}

impl Repetition {
    /// Whether a node with this repetition adds one to the definition level of its subtree.
    #[inline]
    pub fn contributes_definition(&self) -> bool {
        !matches!(self, Repetition::Required)
    }

    /// Whether a node with this repetition adds one to the repetition level of its subtree.
    #[inline]
    pub fn contributes_repetition(&self) -> bool {
        matches!(self, Repetition::Repeated)
    }
}

impl Display for Repetition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Optional => write!(f, "optional"),
            Self::Repeated => write!(f, "repeated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Repetition::Required, false, false)]
    #[case(Repetition::Optional, true, false)]
    #[case(Repetition::Repeated, true, true)]
    fn level_contributions(
        #[case] repetition: Repetition,
        #[case] definition: bool,
        #[case] repeated: bool,
    ) {
        assert_eq!(repetition.contributes_definition(), definition);
        assert_eq!(repetition.contributes_repetition(), repeated);
    }
}
