//! # Error Types
//!
//! Every [`SchemaError`] means the check itself is misconfigured: the schema
//! file is unreadable, a query is ambiguous, the fragment is not a valid
//! schema, or its references cannot be resolved. Instance violations are
//! never errors; they are returned as [`crate::ValidationError`] values.

use exval_core::{CoreError, FragmentError, PathError};
use thiserror::Error;

/// Errors returned by scoped validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Document loading, path parsing, or fragment resolution failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The fragment declares a `$schema` this engine does not know.
    #[error("unknown JSON Schema dialect '{uri}' for fragment '{query}' of {document}")]
    UnknownDialect {
        /// The declared `$schema` value.
        uri: String,
        /// Query that selected the fragment.
        query: String,
        /// Schema document name.
        document: String,
    },

    /// The fragment failed validation against its dialect's meta-schema.
    #[error("fragment '{query}' of {document} is not a valid schema: {reason}")]
    InvalidSchema {
        /// Query that selected the fragment.
        query: String,
        /// Schema document name.
        document: String,
        /// First meta-schema violation.
        reason: String,
    },

    /// The validator could not be built, e.g. an unresolvable `$ref`.
    #[error("failed to compile schema {location}: {reason}")]
    Compile {
        /// Absolute URI of the schema being compiled.
        location: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl From<PathError> for SchemaError {
    fn from(e: PathError) -> Self {
        Self::Core(CoreError::Path(e))
    }
}

impl From<FragmentError> for SchemaError {
    fn from(e: FragmentError) -> Self {
        Self::Core(CoreError::Fragment(e))
    }
}
