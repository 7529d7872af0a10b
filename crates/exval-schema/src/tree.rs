//! # Error Trees
//!
//! The engine reports failures as a tree: a composite failure ("no branch of
//! `anyOf` matched") carries the failures of each branch as children. Users
//! only care about the leaves, so [`flatten`] reduces a forest of
//! [`ErrorNode`]s to the flat [`ValidationError`] list that gets reported.

use exval_core::NormalizedPath;
use serde::Serialize;

/// One failure reported by the engine, possibly with sub-failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    /// Human-readable description of the failure.
    pub message: String,
    /// Location of the failing value in the instance document.
    pub instance_path: NormalizedPath,
    /// Sub-failures of a composite keyword; empty for a leaf.
    pub children: Vec<ErrorNode>,
}

impl ErrorNode {
    /// A failure with no sub-failures.
    pub fn leaf(message: impl Into<String>, instance_path: NormalizedPath) -> Self {
        Self {
            message: message.into(),
            instance_path,
            children: Vec::new(),
        }
    }

    /// Whether this node has no sub-failures.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A leaf failure, ready to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Normalized path of the failing value, `$` for the document root.
    pub json_path: String,
}

/// Flatten a forest of error trees into its leaves, in pre-order.
///
/// A composite node contributes exactly its leaf descendants; its own message
/// is dropped. Traversal uses an explicit stack, so deeply nested composites
/// cannot exhaust the call stack.
pub fn flatten(roots: &[ErrorNode]) -> Vec<ValidationError> {
    let mut leaves = Vec::new();
    let mut stack: Vec<&ErrorNode> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.is_leaf() {
            leaves.push(ValidationError {
                message: node.message.clone(),
                json_path: node.instance_path.to_string(),
            });
        } else {
            stack.extend(node.children.iter().rev());
        }
    }

    leaves
}
