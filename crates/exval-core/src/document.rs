//! # Documents
//!
//! A [`Document`] is a parsed JSON tree plus the URI it originated from.
//! Schema documents use the origin as the base for `$ref` resolution, so the
//! origin of a file-backed document is the `file://` URI of its canonical
//! absolute path.

use std::path::Path;

use serde_json::Value;
use url::Url;

use crate::error::CoreError;

/// An immutable, already-parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    name: String,
    origin: Url,
    value: Value,
}

impl Document {
    /// Load and parse a UTF-8 JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentLoad`] if the file cannot be read, is not
    /// valid JSON, or its path cannot be expressed as a `file://` URI.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let load_error = |reason: String| CoreError::DocumentLoad {
            path: path.display().to_string(),
            reason,
        };

        let canonical = path
            .canonicalize()
            .map_err(|e| load_error(format!("cannot resolve path: {e}")))?;
        let content = std::fs::read_to_string(&canonical)
            .map_err(|e| load_error(format!("cannot read file: {e}")))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| load_error(format!("invalid JSON: {e}")))?;
        let origin = Url::from_file_path(&canonical)
            .map_err(|()| load_error("path is not representable as a file URI".to_string()))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(document = %name, origin = %origin, "loaded document");

        Ok(Self {
            name,
            origin,
            value,
        })
    }

    /// Wrap an in-memory value. The origin becomes `memory:///<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentLoad`] if `name` does not form a valid
    /// URI path.
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, CoreError> {
        let name = name.into();
        let origin = Url::parse("memory:///")
            .and_then(|base| base.join(&name))
            .map_err(|e| CoreError::DocumentLoad {
                path: name.clone(),
                reason: format!("invalid document name: {e}"),
            })?;
        Ok(Self {
            name,
            origin,
            value,
        })
    }

    /// Human-readable name (file name for loaded documents).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Origin URI, used as the base for reference resolution.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// The parsed JSON tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the document and returns the parsed tree.
    pub fn into_value(self) -> Value {
        self.value
    }
}
