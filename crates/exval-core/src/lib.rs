//! # exval-core: Documents, Path Queries, Fragments
//!
//! This crate is the leaf of the exval workspace. It defines the three things
//! every check needs before a schema engine gets involved:
//!
//! 1. **[`Document`]**: an immutable, already-parsed JSON tree together with
//!    the origin URI it was loaded from. The origin is what schema references
//!    are resolved against later.
//!
//! 2. **[`JsonPath`]**: a compiled JSONPath query (RFC 9535 subset). Every
//!    match carries its [`NormalizedPath`], so callers always know exactly
//!    *where* a node came from.
//!
//! 3. **[`fragment::resolve`]**: unique-match resolution. A query that selects
//!    zero nodes or more than one node is a configuration error, never a
//!    silent "first match".
//!
//! ## Crate Policy
//!
//! - No dependencies on other `exval-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Documents are never mutated after construction.

pub mod document;
pub mod error;
pub mod fragment;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use document::Document;
pub use error::{CoreError, FragmentError, PathError};
pub use fragment::{resolve, resolve_optional, ResolvedFragment};
pub use path::{JsonPath, Match, NormalizedPath, PathElement};
