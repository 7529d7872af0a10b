//! JSONPath query engine (RFC 9535 subset)
//!
//! Supports:
//! - `$`: Root node
//! - `$.defs.Point` / `$['defs']['Point']`: Child access
//! - `$.features[0]` / `$.features[-1]`: Array index, negative from end
//! - `$.features[0:4:2]`: Array slice
//! - `$.features[*]` / `$.defs.*`: Wildcard
//! - `$['a','b']`: Union of selectors
//! - `$..geometry`: Descendant segment
//!
//! Filter expressions (`[?...]`) are rejected at parse time.
//!
//! Every match carries a [`NormalizedPath`], the concrete location of the
//! node, which renders as an RFC 9535 normalized path and converts to a
//! JSON Pointer.

pub mod ast;
pub mod evaluator;
pub mod normalized;
pub mod parser;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PathError;

pub use ast::{Segment, Selector};
pub use evaluator::evaluate;
pub use normalized::{NormalizedPath, PathElement};

/// A compiled path query, reusable across documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Compile a query string.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] with the byte offset of the first problem.
    pub fn parse(query: &str) -> Result<Self, PathError> {
        let segments = parser::parse(query)?;
        Ok(Self {
            source: query.to_string(),
            segments,
        })
    }

    /// The root query `$`.
    pub fn root() -> Self {
        Self {
            source: "$".to_string(),
            segments: Vec::new(),
        }
    }

    /// The query text this path was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled segments, in evaluation order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this query selects only the root node.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Evaluate against a document tree and return every match in order.
    pub fn find<'a>(&self, root: &'a Value) -> Vec<Match<'a>> {
        evaluate(&self.segments, root)
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A single node selected by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    /// The selected node.
    pub value: &'a Value,
    /// Where the node sits in the document.
    pub path: NormalizedPath,
}
