//! Node identifiers and per-node storage.

use slotmap::new_key_type;

new_key_type! {
    /// A stable handle to a node in a [`Tree`](crate::Tree).
    ///
    /// Node IDs survive detaching and re-inserting a node; they become invalid
    /// only when the node is destroyed.
    pub struct NodeId;
}

/// HTML elements that never have content and need no end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that expose an edit value instead of display text.
pub const EDITABLE_ELEMENTS: &[&str] = &["input", "textarea"];

/// Returns `true` if `tag` is an HTML void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Exactly one per tree.
    Document,
    /// An element with a tag name and ordered attributes.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A run of text.
    Text(String),
    /// A comment.
    Comment(String),
}

impl NodeKind {
    /// Create an element kind with no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// The element tag, if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Whether this is an element.
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}

/// Internal data stored in the tree for each node.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}
