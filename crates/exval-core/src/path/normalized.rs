//! Normalized paths: the concrete location of a node in a document.
//!
//! Rendered in RFC 9535 normalized form (`$['features'][0]`), which is
//! unambiguous for every member name, and convertible to a JSON Pointer
//! (`/features/0`) for schema references.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step from a node to its child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Object member name.
    Name(String),
    /// Array position.
    Index(usize),
}

/// Location of a node, as a sequence of steps from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    elements: Vec<PathElement>,
}

impl NormalizedPath {
    /// The root path `$`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// Steps from the root, outermost first.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Number of steps from the root.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append a step in place.
    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    /// A new path one step below this one.
    pub fn child(&self, element: PathElement) -> Self {
        let mut next = self.clone();
        next.push(element);
        next
    }

    /// Render as a JSON Pointer (RFC 6901). The root is the empty string.
    pub fn to_json_pointer(&self) -> String {
        let mut pointer = String::new();
        for element in &self.elements {
            pointer.push('/');
            match element {
                PathElement::Name(name) => {
                    pointer.push_str(&name.replace('~', "~0").replace('/', "~1"))
                }
                PathElement::Index(index) => pointer.push_str(&index.to_string()),
            }
        }
        pointer
    }
}

impl FromIterator<PathElement> for NormalizedPath {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for element in &self.elements {
            match element {
                PathElement::Name(name) => {
                    f.write_str("['")?;
                    write_escaped_name(f, name)?;
                    f.write_str("']")?;
                }
                PathElement::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for NormalizedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn write_escaped_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for c in name.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if u32::from(c) < 0x20 => write!(f, "\\u{:04x}", u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}
