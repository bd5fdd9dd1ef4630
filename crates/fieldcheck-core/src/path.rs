//! Location paths for violations.
//!
//! A [`Path`] is immutable. Extending it allocates a new node that points at
//! its parent, so sibling branches share their common prefix.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
enum Node {
    Field { parent: Path, name: String },
    Element { parent: Path, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Option<Arc<Node>>);

impl Path {
    pub fn root() -> Self {
        Self(None)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    pub fn field(&self, name: impl Into<String>) -> Self {
        Self(Some(Arc::new(Node::Field {
            parent: self.clone(),
            name: name.into(),
        })))
    }

    pub fn element(&self, index: usize) -> Self {
        Self(Some(Arc::new(Node::Element {
            parent: self.clone(),
            index,
        })))
    }

    /// Renders the path, e.g. `orders[2].lines[0].sku`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = &self.0 else {
            return Ok(());
        };
        match node.as_ref() {
            Node::Field { parent, name } => {
                if parent.is_root() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{parent}.{name}")
                }
            }
            Node::Element { parent, index } => write!(f, "{parent}[{index}]"),
        }
    }
}
