use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The root-wrapped tree handed to the rendering widget.
///
/// Serializes as `{ "root": { "id", "topic", "children": [...] } }`, the
/// shape both the renderer and the plaintext outline converter speak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    pub root: Node,
}

/// One labeled node of the mind map, with children in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub topic: String,
    pub children: Vec<Node>,
}

impl MindMap {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Minimal map returned whenever a conversion cannot produce anything
    /// better: just the root label, no children. Callers never see an error.
    pub fn fallback(root_label: &str) -> Self {
        Self {
            root: Node::new(random_id(), root_label),
        }
    }
}

impl Node {
    pub fn new(id: String, topic: impl Into<String>) -> Self {
        Self {
            id,
            topic: topic.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(id: String, topic: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            id,
            topic: topic.into(),
            children,
        }
    }
}

/// Random node id, unique within a conversion for all practical purposes.
pub(crate) fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}
