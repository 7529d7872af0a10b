//! # Dialect Detection
//!
//! A fragment is validated under the draft it declares with `$schema`. Most
//! fragments are nested definitions without their own `$schema`, so the
//! schema document's root declaration applies next, and Draft 2020-12 when
//! neither declares one.

use jsonschema::Draft;
use serde_json::Value;

pub const DRAFT202012: &str = "https://json-schema.org/draft/2020-12/schema";
pub const DRAFT201909: &str = "https://json-schema.org/draft/2019-09/schema";
pub const DRAFT7: &str = "http://json-schema.org/draft-07/schema#";
pub const DRAFT6: &str = "http://json-schema.org/draft-06/schema#";
pub const DRAFT4: &str = "http://json-schema.org/draft-04/schema#";

/// A JSON Schema draft supported by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    #[default]
    Draft202012,
}

impl Dialect {
    /// Canonical `$schema` URI of this draft's meta-schema.
    pub fn meta_schema_uri(self) -> &'static str {
        match self {
            Self::Draft4 => DRAFT4,
            Self::Draft6 => DRAFT6,
            Self::Draft7 => DRAFT7,
            Self::Draft201909 => DRAFT201909,
            Self::Draft202012 => DRAFT202012,
        }
    }

    /// The engine's draft selector.
    pub fn draft(self) -> Draft {
        match self {
            Self::Draft4 => Draft::Draft4,
            Self::Draft6 => Draft::Draft6,
            Self::Draft7 => Draft::Draft7,
            Self::Draft201909 => Draft::Draft201909,
            Self::Draft202012 => Draft::Draft202012,
        }
    }

    /// Map a `$schema` value to a draft. Scheme (`http`/`https`) and a
    /// trailing empty fragment are ignored.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let trimmed = uri.trim();
        let trimmed = trimmed.strip_suffix('#').unwrap_or(trimmed);
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))?;
        match rest {
            "json-schema.org/draft/2020-12/schema" => Some(Self::Draft202012),
            "json-schema.org/draft/2019-09/schema" => Some(Self::Draft201909),
            "json-schema.org/draft-07/schema" => Some(Self::Draft7),
            "json-schema.org/draft-06/schema" => Some(Self::Draft6),
            "json-schema.org/draft-04/schema" => Some(Self::Draft4),
            _ => None,
        }
    }
}

/// Outcome of looking for a `$schema` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detected {
    /// A recognized draft, declared or defaulted.
    Known(Dialect),
    /// A declared `$schema` that maps to no supported draft.
    Unknown(String),
}

/// Detect the dialect of `fragment`, falling back to `document_root`.
pub fn detect(fragment: &Value, document_root: &Value) -> Detected {
    let declared = declared_schema(fragment).or_else(|| declared_schema(document_root));
    match declared {
        None => Detected::Known(Dialect::default()),
        Some(uri) => match Dialect::from_uri(uri) {
            Some(dialect) => Detected::Known(dialect),
            None => Detected::Unknown(uri.to_string()),
        },
    }
}

fn declared_schema(schema: &Value) -> Option<&str> {
    schema.get("$schema").and_then(Value::as_str)
}
