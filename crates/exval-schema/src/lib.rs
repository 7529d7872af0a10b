//! # exval-schema: Path-Scoped Schema Validation
//!
//! Validates a fragment of a JSON document against a fragment of a JSON
//! Schema document, both selected by JSONPath queries from `exval-core`.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] and [`validate_file`] run one check end to end:
//!
//! 1. Resolve the schema fragment (exactly one match).
//! 2. Detect its dialect from `$schema` on the fragment, then on the
//!    document root, defaulting to Draft 2020-12.
//! 3. Check the fragment against that dialect's meta-schema.
//! 4. Compile it in place, so `$ref`s resolve against the schema document.
//! 5. Validate the instance fragment and flatten composite failures
//!    (`anyOf`, `oneOf`) into their leaf failures.
//!
//! ## Crate Policy
//!
//! - Depends only on `exval-core` internally.
//! - Instance violations are data ([`ValidationError`]); only
//!   misconfiguration is a [`SchemaError`].
//! - Only `file://` references are fetched. No network access.

pub mod dialect;
mod engine;
pub mod error;
pub mod tree;
pub mod validate;

pub use dialect::{Detected, Dialect};
pub use error::SchemaError;
pub use tree::{flatten, ErrorNode, ValidationError};
pub use validate::{validate, validate_file};
