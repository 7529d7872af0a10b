//! # Error Types
//!
//! All errors in this crate describe a misconfigured check: a file that
//! cannot be read, a path query that does not parse, or a query that does
//! not select exactly one node. None of them describe bad example data;
//! schema violations are reported as data by `exval-schema`.

use thiserror::Error;

/// Top-level error type for exval-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A document could not be read or parsed.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// Path of the document that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A path query failed to parse.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A path query did not select exactly one node.
    #[error(transparent)]
    Fragment(#[from] FragmentError),
}

/// A JSONPath query that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSON path '{query}' at offset {offset}: {reason}")]
pub struct PathError {
    /// The query text as given.
    pub query: String,
    /// Byte offset into `query` where parsing stopped.
    pub offset: usize,
    /// What the parser expected or rejected.
    pub reason: String,
}

/// Unique-match resolution failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    /// The query matched zero nodes or more than one node.
    #[error(
        "found {count} matches to JSON path '{query}' within {document} when expecting exactly 1 match"
    )]
    Ambiguous {
        /// Name of the document the query was evaluated against.
        document: String,
        /// The query text.
        query: String,
        /// Number of nodes the query actually selected.
        count: usize,
    },
}
