//! # Scoped Validation
//!
//! Validates a fragment of an instance document against a fragment of a
//! schema document. Both fragments are selected by JSONPath queries that
//! must match exactly one value.

use std::path::Path;

use exval_core::{resolve, resolve_optional, Document, JsonPath};

use crate::dialect::{detect, Detected};
use crate::engine::{check_schema, FragmentEngine};
use crate::error::SchemaError;
use crate::tree::{flatten, ValidationError};

/// Validate the instance fragment selected by `instance_query` (the whole
/// instance when `None`) against the schema fragment selected by
/// `schema_query`.
///
/// Returns every leaf failure in engine order; an empty list means the
/// instance is valid. Misconfiguration (ambiguous queries, an unknown
/// dialect, a malformed fragment, unresolvable references) is an `Err`.
pub fn validate(
    schema_document: &Document,
    schema_query: &JsonPath,
    instance: &Document,
    instance_query: Option<&JsonPath>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let schema = resolve(schema_document, schema_query)?;

    let dialect = match detect(schema.value, schema_document.value()) {
        Detected::Known(dialect) => dialect,
        Detected::Unknown(uri) => {
            return Err(SchemaError::UnknownDialect {
                uri,
                query: schema_query.to_string(),
                document: schema_document.name().to_string(),
            })
        }
    };

    check_schema(schema.value, dialect).map_err(|reason| SchemaError::InvalidSchema {
        query: schema_query.to_string(),
        document: schema_document.name().to_string(),
        reason,
    })?;

    let engine = FragmentEngine::new(schema_document, dialect);
    let location = engine.location(&schema.path.to_json_pointer());
    let validator = engine.compile(&location)?;

    let target = resolve_optional(instance, instance_query)?;
    let trees = engine.errors(&validator, &location, target.value, &target.path, 0)?;
    let errors = flatten(&trees);

    tracing::debug!(
        schema = schema_document.name(),
        fragment = %schema.path,
        instance = instance.name(),
        errors = errors.len(),
        "validated fragment"
    );
    Ok(errors)
}

/// Load the schema document at `schema_file` and run [`validate`].
///
/// The schema is read on every call so that edits between calls are seen.
pub fn validate_file(
    schema_file: &Path,
    schema_query: &str,
    instance: &Document,
    instance_query: Option<&str>,
) -> Result<Vec<ValidationError>, SchemaError> {
    let schema_query = JsonPath::parse(schema_query)?;
    let instance_query = instance_query.map(JsonPath::parse).transpose()?;
    let schema_document = Document::load(schema_file)?;
    validate(
        &schema_document,
        &schema_query,
        instance,
        instance_query.as_ref(),
    )
}
