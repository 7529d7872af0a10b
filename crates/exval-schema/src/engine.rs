//! # Fragment Engine
//!
//! Compiles validators for fragments of a schema document and turns the
//! `jsonschema` crate's flat error stream into [`ErrorNode`] trees.
//!
//! ## Reference Resolution
//!
//! A fragment is never compiled on its own. The engine compiles the wrapper
//! `{"$ref": "<origin>#<pointer>"}` and installs a retriever that serves the
//! schema document under its origin URI, so the fragment is evaluated in
//! place: every `$ref` inside it resolves against the document, whichever
//! fragment was selected. `file://` references to other documents are read
//! from disk; anything else is rejected at compile time.
//!
//! ## Composite Failures
//!
//! For `anyOf` and `oneOf` (no branch valid) the engine reports a single
//! error at the keyword. The engine locates the keyword by walking the
//! error's keyword path through `$ref`s, across documents if needed, then
//! re-validates the same instance value against each branch to recover the
//! branch failures as children.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use exval_core::{Document, NormalizedPath, PathElement};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::{json, Value};
use url::Url;

use crate::dialect::Dialect;
use crate::error::SchemaError;
use crate::tree::ErrorNode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Composite expansion stops at this depth; deeper composites stay leaves.
const MAX_COMPOSITE_DEPTH: usize = 16;

/// Serves the schema document under its origin, and other `file://`
/// documents from disk.
struct DocumentRetriever {
    origin: String,
    document: Value,
}

impl Retrieve for DocumentRetriever {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, BoxError> {
        let requested = uri.as_str();
        let requested = requested.split('#').next().unwrap_or(requested);

        if requested == self.origin {
            return Ok(self.document.clone());
        }
        read_file_resource(&Url::parse(requested)?)
    }
}

/// Read and parse the `file://` document at `url`.
fn read_file_resource(url: &Url) -> Result<Value, BoxError> {
    if url.scheme() != "file" {
        return Err(format!("reference to {url} cannot be retrieved locally").into());
    }
    let path = url
        .to_file_path()
        .map_err(|()| format!("invalid file URI: {url}"))?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    tracing::debug!(uri = %url, "retrieved referenced schema document");
    Ok(serde_json::from_str(&content)?)
}

/// A schema node: the document it lives in and its JSON Pointer there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchemaLocation {
    resource: Url,
    pointer: String,
}

impl SchemaLocation {
    /// Absolute URI of the node.
    fn uri(&self) -> String {
        let mut uri = self.resource.clone();
        uri.set_fragment(Some(&encode_fragment(&self.pointer)));
        uri.to_string()
    }

    fn child(&self, token: &str) -> Self {
        Self {
            resource: self.resource.clone(),
            pointer: format!("{}/{}", self.pointer, escape_token(token)),
        }
    }
}

/// A raw engine error, detached from the instance it borrowed.
struct RawError {
    message: String,
    instance_pointer: String,
    schema_pointer: String,
    composite: bool,
}

impl RawError {
    fn from_engine(error: jsonschema::ValidationError<'_>) -> Self {
        let composite = matches!(
            error.kind,
            ValidationErrorKind::AnyOf { .. } | ValidationErrorKind::OneOfNotValid { .. }
        );
        Self {
            message: error.to_string(),
            instance_pointer: error.instance_path.to_string(),
            schema_pointer: error.schema_path.to_string(),
            composite,
        }
    }
}

/// Compiles and runs validators for fragments of one schema document.
pub(crate) struct FragmentEngine<'d> {
    document: &'d Document,
    dialect: Dialect,
    /// Parsed schema documents by URI (no fragment), the origin included.
    resources: RefCell<HashMap<String, Rc<Value>>>,
}

impl<'d> FragmentEngine<'d> {
    pub(crate) fn new(document: &'d Document, dialect: Dialect) -> Self {
        let root = Rc::new(document.value().clone());
        let mut resources = HashMap::new();
        resources.insert(document.origin().as_str().to_string(), Rc::clone(&root));
        if let Some(id) = root
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| Url::parse(id).ok())
        {
            resources.insert(without_fragment(id).to_string(), Rc::clone(&root));
        }
        Self {
            document,
            dialect,
            resources: RefCell::new(resources),
        }
    }

    /// Location of the node at `pointer` in the schema document.
    pub(crate) fn location(&self, pointer: &str) -> SchemaLocation {
        SchemaLocation {
            resource: self.document.origin().clone(),
            pointer: pointer.to_string(),
        }
    }

    /// The parsed document at `resource`, read from disk on first use.
    fn resource(&self, resource: &Url) -> Option<Rc<Value>> {
        if let Some(found) = self.resources.borrow().get(resource.as_str()) {
            return Some(Rc::clone(found));
        }
        let value = match read_file_resource(resource) {
            Ok(value) => Rc::new(value),
            Err(e) => {
                tracing::debug!(uri = %resource, error = %e, "schema document not readable");
                return None;
            }
        };
        self.resources
            .borrow_mut()
            .insert(resource.as_str().to_string(), Rc::clone(&value));
        Some(value)
    }

    /// Compile a validator for the schema at `location`.
    pub(crate) fn compile(&self, location: &SchemaLocation) -> Result<Validator, SchemaError> {
        let target = location.uri();
        let wrapper = json!({ "$ref": target });
        let retriever = DocumentRetriever {
            origin: self.document.origin().as_str().to_string(),
            document: self.document.value().clone(),
        };

        let validator = jsonschema::options()
            .with_draft(self.dialect.draft())
            .with_retriever(retriever)
            .build(&wrapper)
            .map_err(|e| SchemaError::Compile {
                location: target.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(target = %target, dialect = ?self.dialect, "compiled fragment validator");
        Ok(validator)
    }

    /// Validate `instance` (located at `base` in its document) and build
    /// error trees, expanding composite failures.
    pub(crate) fn errors(
        &self,
        validator: &Validator,
        location: &SchemaLocation,
        instance: &Value,
        base: &NormalizedPath,
        depth: usize,
    ) -> Result<Vec<ErrorNode>, SchemaError> {
        let raw: Vec<RawError> = validator
            .iter_errors(instance)
            .map(RawError::from_engine)
            .collect();

        let mut nodes = Vec::with_capacity(raw.len());
        for error in raw {
            let instance_path = locate(base, instance, &split_pointer(&error.instance_pointer));
            let children = if !error.composite {
                Vec::new()
            } else if depth < MAX_COMPOSITE_DEPTH {
                self.expand(location, &error, instance, &instance_path, depth)?
            } else {
                tracing::debug!(
                    schema_path = %error.schema_pointer,
                    depth,
                    "composite nesting too deep; keeping as leaf"
                );
                Vec::new()
            };
            nodes.push(ErrorNode {
                message: error.message,
                instance_path,
                children,
            });
        }
        Ok(nodes)
    }

    /// Branch failures of a composite error; empty when the keyword cannot
    /// be located.
    fn expand(
        &self,
        location: &SchemaLocation,
        error: &RawError,
        instance: &Value,
        at: &NormalizedPath,
        depth: usize,
    ) -> Result<Vec<ErrorNode>, SchemaError> {
        let schema_segments = split_pointer(&error.schema_pointer);
        let Some(keyword) = self.keyword_location(location, &schema_segments) else {
            tracing::debug!(
                schema_path = %error.schema_pointer,
                "composite keyword not located; keeping as leaf"
            );
            return Ok(Vec::new());
        };
        let branch_count = self
            .resource(&keyword.resource)
            .and_then(|document| {
                document
                    .pointer(&keyword.pointer)
                    .and_then(Value::as_array)
                    .map(Vec::len)
            })
            .unwrap_or(0);
        let Some(value) = instance.pointer(&error.instance_pointer) else {
            return Ok(Vec::new());
        };

        let mut children = Vec::new();
        for index in 0..branch_count {
            let branch = keyword.child(&index.to_string());
            let validator = self.compile(&branch)?;
            children.extend(self.errors(&validator, &branch, value, at, depth + 1)?);
        }
        Ok(children)
    }

    /// Follow a keyword path, starting at the wrapper around `start`, to
    /// the location of the keyword.
    fn keyword_location(
        &self,
        start: &SchemaLocation,
        segments: &[String],
    ) -> Option<SchemaLocation> {
        let mut current = start.clone();
        let mut document = self.resource(&current.resource)?;

        let segments = match segments.split_first() {
            Some((first, rest)) if first == "$ref" => rest,
            _ => segments,
        };

        for segment in segments {
            let node = document.pointer(&current.pointer)?;
            let reference = node.get("$ref").and_then(Value::as_str);
            let is_ref_step = segment == "$ref" && reference.is_some();

            // Keyword paths may also omit `$ref` steps.
            if is_ref_step || child(node, segment).is_none() {
                let target = self.reference_target(&current.resource, reference?)?;
                document = self.resource(&target.resource)?;
                current = target;
                if is_ref_step {
                    continue;
                }
            }

            child(document.pointer(&current.pointer)?, segment)?;
            current = current.child(segment);
        }

        Some(current)
    }

    /// Location targeted by `reference`, relative to the document `base`.
    fn reference_target(&self, base: &Url, reference: &str) -> Option<SchemaLocation> {
        let target = base.join(reference).ok()?;
        let pointer = decode_fragment(target.fragment().unwrap_or(""))?;
        Some(SchemaLocation {
            resource: without_fragment(target),
            pointer,
        })
    }
}

fn without_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

/// Check `fragment` against the meta-schema of `dialect`.
pub(crate) fn check_schema(fragment: &Value, dialect: Dialect) -> Result<(), String> {
    let candidate = match fragment {
        Value::Bool(_) if dialect == Dialect::Draft4 => {
            return Err("boolean schemas require draft 6 or later".to_string())
        }
        Value::Bool(_) => return Ok(()),
        Value::Object(map) => {
            let mut map = map.clone();
            map.insert(
                "$schema".to_string(),
                Value::String(dialect.meta_schema_uri().to_string()),
            );
            Value::Object(map)
        }
        other => return Err(format!("expected an object or boolean, found {other}")),
    };
    jsonschema::meta::validate(&candidate).map_err(|e| e.to_string())
}

/// Turn instance pointer tokens into a normalized path below `base`,
/// using the instance to tell array indices from numeric member names.
fn locate(base: &NormalizedPath, instance: &Value, tokens: &[String]) -> NormalizedPath {
    let mut path = base.clone();
    let mut current = Some(instance);
    for token in tokens {
        let element = match (current, token.parse::<usize>()) {
            (Some(Value::Array(_)), Ok(index)) => PathElement::Index(index),
            _ => PathElement::Name(token.clone()),
        };
        current = current.and_then(|value| match (&element, value) {
            (PathElement::Index(index), Value::Array(items)) => items.get(*index),
            (PathElement::Name(name), Value::Object(map)) => map.get(name),
            _ => None,
        });
        path.push(element);
    }
    path
}

fn child<'v>(node: &'v Value, token: &str) -> Option<&'v Value> {
    match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => items.get(token.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Split a JSON Pointer into unescaped tokens. The root pointer has none.
fn split_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Percent-encode a JSON Pointer for use as a URI fragment.
fn encode_fragment(pointer: &str) -> String {
    let mut out = String::with_capacity(pointer.len());
    for byte in pointer.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@/?".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_fragment(fragment: &str) -> Option<String> {
    let bytes = fragment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = fragment.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::flatten;
    use serde_json::json;

    fn engine_errors(schema: Value, pointer: &str, instance: Value) -> Vec<ErrorNode> {
        let document = Document::from_value("schema.json", schema).unwrap();
        let engine = FragmentEngine::new(&document, Dialect::Draft202012);
        let location = engine.location(pointer);
        let validator = engine.compile(&location).unwrap();
        engine
            .errors(&validator, &location, &instance, &NormalizedPath::root(), 0)
            .unwrap()
    }

    #[test]
    fn fragment_refs_resolve_against_document() {
        let schema = json!({
            "defs": {
                "Point": {
                    "type": "object",
                    "properties": {"lat": {"$ref": "#/defs/Coordinate"}}
                },
                "Coordinate": {"type": "number"}
            }
        });
        let nodes = engine_errors(schema, "/defs/Point", json!({"lat": "north"}));
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].instance_path.to_string(), "$['lat']");
        assert!(nodes[0].message.contains("number"), "got: {}", nodes[0].message);
    }

    #[test]
    fn any_of_failure_expands_into_branch_failures() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "integer", "minimum": 5}]});
        let nodes = engine_errors(schema, "", json!(3));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children.len(), 2);

        let leaves = flatten(&nodes);
        assert_eq!(leaves.len(), 2);
        assert!(leaves[0].message.contains("string"), "got: {}", leaves[0].message);
        assert!(leaves[1].message.contains('5'), "got: {}", leaves[1].message);
        assert!(leaves.iter().all(|e| !e.message.contains("anyOf")));
        assert!(leaves.iter().all(|e| e.json_path == "$"));
    }

    #[test]
    fn one_of_behind_ref_expands_at_nested_location() {
        let schema = json!({
            "type": "object",
            "properties": {"geometry": {"$ref": "#/defs/Geometry"}},
            "defs": {
                "Geometry": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
            }
        });
        let leaves = flatten(&engine_errors(schema, "", json!({"geometry": true})));
        assert_eq!(leaves.len(), 2);
        assert!(leaves.iter().all(|e| e.json_path == "$['geometry']"));
        assert!(leaves.iter().all(|e| !e.message.contains("oneOf")));
    }

    #[test]
    fn nested_composites_expand_recursively() {
        let schema = json!({
            "anyOf": [
                {"anyOf": [{"type": "string"}, {"type": "boolean"}]},
                {"type": "array"}
            ]
        });
        let nodes = engine_errors(schema, "", json!(1));
        let leaves = flatten(&nodes);
        assert_eq!(leaves.len(), 3, "got: {leaves:?}");
        assert!(leaves[0].message.contains("string"));
        assert!(leaves[1].message.contains("boolean"));
        assert!(leaves[2].message.contains("array"));
    }

    #[test]
    fn one_of_with_multiple_valid_branches_stays_a_leaf() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]});
        let nodes = engine_errors(schema, "", json!(5));
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
    }

    #[test]
    fn array_positions_become_indices() {
        let schema = json!({
            "type": "object",
            "properties": {
                "features": {"type": "array", "items": {"properties": {"id": {"type": "integer"}}}}
            }
        });
        let nodes = engine_errors(schema, "", json!({"features": [{"id": 1}, {"id": "x"}]}));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].instance_path.to_string(), "$['features'][1]['id']");
    }

    #[test]
    fn file_references_are_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Common.json"),
            br#"{"defs": {"Name": {"type": "string", "minLength": 2}}}"#,
        )
        .unwrap();
        let main = dir.path().join("Main.json");
        std::fs::write(
            &main,
            br#"{"properties": {"name": {"$ref": "Common.json#/defs/Name"}}}"#,
        )
        .unwrap();

        let document = Document::load(&main).unwrap();
        let engine = FragmentEngine::new(&document, Dialect::Draft202012);
        let location = engine.location("");
        let validator = engine.compile(&location).unwrap();
        let nodes = engine
            .errors(&validator, &location, &json!({"name": "x"}), &NormalizedPath::root(), 0)
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].instance_path.to_string(), "$['name']");
    }

    #[test]
    fn composites_in_other_documents_expand() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Common.json"),
            br#"{"defs": {"Alt": {"anyOf": [{"type": "number"}, {"type": "string", "pattern": "^FL[0-9]+$"}]}}}"#,
        )
        .unwrap();
        let main = dir.path().join("Main.json");
        std::fs::write(
            &main,
            br#"{"properties": {"alt": {"$ref": "Common.json#/defs/Alt"}}}"#,
        )
        .unwrap();

        let document = Document::load(&main).unwrap();
        let engine = FragmentEngine::new(&document, Dialect::Draft202012);
        let location = engine.location("");
        let validator = engine.compile(&location).unwrap();
        let nodes = engine
            .errors(&validator, &location, &json!({"alt": "high"}), &NormalizedPath::root(), 0)
            .unwrap();

        let leaves = flatten(&nodes);
        assert_eq!(leaves.len(), 2, "got: {leaves:?}");
        assert!(leaves.iter().all(|e| e.json_path == "$['alt']"));
        assert!(leaves.iter().all(|e| !e.message.contains("anyOf")));
        assert!(leaves[0].message.contains("number"), "got: {}", leaves[0].message);
        assert!(leaves[1].message.contains("^FL"), "got: {}", leaves[1].message);
    }

    #[test]
    fn composites_past_the_depth_cap_stay_leaves() {
        let mut schema = json!({"type": "string"});
        for _ in 0..=MAX_COMPOSITE_DEPTH {
            schema = json!({"anyOf": [schema]});
        }
        let leaves = flatten(&engine_errors(schema, "", json!(1)));
        assert_eq!(leaves.len(), 1);
        assert!(leaves[0].message.contains("anyOf"), "got: {}", leaves[0].message);
    }

    #[test]
    fn remote_references_fail_to_compile() {
        let document = Document::from_value(
            "schema.json",
            json!({"properties": {"a": {"$ref": "https://example.invalid/other.json"}}}),
        )
        .unwrap();
        let engine = FragmentEngine::new(&document, Dialect::Draft202012);
        let err = engine.compile(&engine.location("")).unwrap_err();
        assert!(matches!(err, SchemaError::Compile { .. }), "got: {err}");
    }

    #[test]
    fn check_schema_accepts_valid_fragments() {
        assert!(check_schema(&json!({"type": "object"}), Dialect::Draft202012).is_ok());
        assert!(check_schema(&json!({"type": "object"}), Dialect::Draft4).is_ok());
        assert!(check_schema(&json!(true), Dialect::Draft7).is_ok());
    }

    #[test]
    fn check_schema_rejects_malformed_fragments() {
        assert!(check_schema(&json!({"type": "banana"}), Dialect::Draft202012).is_err());
        assert!(check_schema(&json!({"required": "x"}), Dialect::Draft7).is_err());
        assert!(check_schema(&json!(42), Dialect::Draft202012).is_err());
        assert!(check_schema(&json!(false), Dialect::Draft4).is_err());
    }

    #[test]
    fn pointer_tokens_are_unescaped() {
        assert!(split_pointer("").is_empty());
        assert_eq!(split_pointer("/a~1b/~0c/0"), vec!["a/b", "~c", "0"]);
    }

    #[test]
    fn numeric_member_names_stay_names() {
        let instance = json!({"0": {"1": true}});
        let path = locate(&NormalizedPath::root(), &instance, &["0".into(), "1".into()]);
        assert_eq!(path.to_string(), "$['0']['1']");
    }

    #[test]
    fn fragments_survive_percent_encoding() {
        let pointer = "/defs/Zone Authority/100%";
        let encoded = encode_fragment(pointer);
        assert_eq!(encoded, "/defs/Zone%20Authority/100%25");
        assert_eq!(decode_fragment(&encoded).as_deref(), Some(pointer));
        assert_eq!(decode_fragment("%zz"), None);
    }
}
