//! Compiled query representation.

/// One step of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Apply the selectors to the children of each input node.
    Child(Vec<Selector>),
    /// Apply the selectors to each input node and all of its descendants.
    Descendant(Vec<Selector>),
}

impl Segment {
    /// The selectors of this segment, in union order.
    pub fn selectors(&self) -> &[Selector] {
        match self {
            Self::Child(selectors) | Self::Descendant(selectors) => selectors,
        }
    }
}

/// Picks zero or more children of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Object member by name.
    Name(String),
    /// Every member of an object or element of an array.
    Wildcard,
    /// Array element; negative indices count from the end.
    Index(i64),
    /// Array slice `start:end:step`.
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
}
