//! # Fragment Resolution
//!
//! Selects exactly one node of a [`Document`] with a [`JsonPath`]. One schema
//! file may hold several named definitions and one example file may hold
//! several nested features; a check picks one of each by query.
//!
//! Zero or several matches is a configuration error. Silently taking the
//! first match would let a mistyped query validate the wrong fragment.

use serde_json::Value;

use crate::document::Document;
use crate::error::FragmentError;
use crate::path::{JsonPath, NormalizedPath};

/// A node selected from a document, with its concrete location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFragment<'a> {
    /// The selected subtree.
    pub value: &'a Value,
    /// Where the subtree was found.
    pub path: NormalizedPath,
}

impl<'a> ResolvedFragment<'a> {
    /// The whole document at path `$`.
    pub fn whole(document: &'a Document) -> Self {
        Self {
            value: document.value(),
            path: NormalizedPath::root(),
        }
    }
}

/// Resolve `query` against `document`, requiring exactly one match.
///
/// # Errors
///
/// Returns [`FragmentError::Ambiguous`] with the actual match count when the
/// query selects zero nodes or more than one.
pub fn resolve<'a>(
    document: &'a Document,
    query: &JsonPath,
) -> Result<ResolvedFragment<'a>, FragmentError> {
    let mut matches = query.find(document.value());
    let count = matches.len();
    let found = match matches.pop() {
        Some(found) if count == 1 => found,
        _ => {
            return Err(FragmentError::Ambiguous {
                document: document.name().to_string(),
                query: query.as_str().to_string(),
                count,
            })
        }
    };

    tracing::debug!(
        document = document.name(),
        query = query.as_str(),
        path = %found.path,
        "resolved fragment"
    );
    Ok(ResolvedFragment {
        value: found.value,
        path: found.path,
    })
}

/// Like [`resolve`], but `None` selects the whole document.
pub fn resolve_optional<'a>(
    document: &'a Document,
    query: Option<&JsonPath>,
) -> Result<ResolvedFragment<'a>, FragmentError> {
    match query {
        Some(query) => resolve(document, query),
        None => Ok(ResolvedFragment::whole(document)),
    }
}
