//! Shared document handle.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{MarkupError, MarkupResult};
use crate::node::{NodeId, NodeKind};
use crate::parse::parse_fragment;
use crate::serialize::{inner_markup, outer_markup};
use crate::tree::Tree;

/// A cheaply clonable, thread-safe handle to a markup [`Tree`].
///
/// Every method takes the lock for the duration of one tree operation only,
/// so callers never hold it across their own callbacks.
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<RwLock<Tree>>,
}

static_assertions::assert_impl_all!(Document: Send, Sync);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse markup into a new document. All top-level nodes are appended to
    /// the document root.
    pub fn parse(markup: &str) -> MarkupResult<Self> {
        let document = Self::new();
        document.with_write(|tree| {
            let root = tree.root();
            for node in parse_fragment(tree, markup, true)? {
                tree.append_child(root, node)?;
            }
            Ok::<_, MarkupError>(())
        })?;
        Ok(document)
    }

    /// Whether two handles refer to the same document.
    pub fn same_document(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Execute a closure with read access to the tree.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Tree) -> R,
    {
        f(&self.inner.read())
    }

    /// Execute a closure with write access to the tree.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Tree) -> R,
    {
        f(&mut self.inner.write())
    }

    /// Materialize markup into exactly one detached node.
    ///
    /// Only the first top-level node is kept; the rest are destroyed. Fails
    /// with [`MarkupError::Empty`] when the markup yields no node and with
    /// [`MarkupError::Malformed`] when it cannot be parsed.
    pub fn materialize(&self, markup: &str, trim: bool) -> MarkupResult<NodeId> {
        let source = if trim { markup.trim() } else { markup };
        self.with_write(|tree| {
            let mut nodes = parse_fragment(tree, source, trim)?.into_iter();
            let first = nodes.next().ok_or(MarkupError::Empty)?;
            for extra in nodes {
                tree.destroy(extra)?;
            }
            tracing::trace!(target: "horizon_bind_markup::document", ?first, "materialized markup");
            Ok(first)
        })
    }

    pub fn root(&self) -> NodeId {
        self.inner.read().root()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.read().contains(id)
    }

    pub fn kind(&self, id: NodeId) -> MarkupResult<NodeKind> {
        self.inner.read().kind(id).cloned()
    }

    pub fn tag(&self, id: NodeId) -> Option<String> {
        self.inner.read().tag(id).map(str::to_string)
    }

    pub fn create_element(&self, tag: impl Into<String>) -> NodeId {
        self.inner.write().create_element(tag)
    }

    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.inner.write().create_text(text)
    }

    pub fn deep_clone(&self, id: NodeId) -> MarkupResult<NodeId> {
        self.inner.write().deep_clone(id)
    }

    pub fn destroy(&self, id: NodeId) -> MarkupResult<()> {
        self.inner.write().destroy(id)
    }

    pub fn parent(&self, id: NodeId) -> MarkupResult<Option<NodeId>> {
        self.inner.read().parent(id)
    }

    /// Get the children of a node (owned for lock-free iteration).
    pub fn children(&self, id: NodeId) -> MarkupResult<Vec<NodeId>> {
        self.inner.read().children(id).map(<[NodeId]>::to_vec)
    }

    pub fn descendants(&self, id: NodeId) -> MarkupResult<Vec<NodeId>> {
        self.inner.read().descendants(id)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.inner.read().is_connected(id)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> MarkupResult<()> {
        self.inner.write().append_child(parent, child)
    }

    pub fn insert_after(&self, reference: NodeId, node: NodeId) -> MarkupResult<()> {
        self.inner.write().insert_after(reference, node)
    }

    pub fn replace_with(&self, old: NodeId, replacement: NodeId) -> MarkupResult<()> {
        self.inner.write().replace_with(old, replacement)
    }

    pub fn detach(&self, id: NodeId) -> MarkupResult<()> {
        self.inner.write().detach(id)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.inner.read().attribute(id, name).map(str::to_string)
    }

    pub fn attribute_names(&self, id: NodeId) -> MarkupResult<Vec<String>> {
        self.inner.read().attribute_names(id)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.inner.read().has_attribute(id, name)
    }

    pub fn set_attribute(
        &self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> MarkupResult<()> {
        self.inner.write().set_attribute(id, name, value)
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> MarkupResult<Option<String>> {
        self.inner.write().remove_attribute(id, name)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.inner.read().is_hidden(id)
    }

    pub fn set_hidden(&self, id: NodeId, hidden: bool) -> MarkupResult<()> {
        self.inner.write().set_hidden(id, hidden)
    }

    pub fn text(&self, id: NodeId) -> MarkupResult<String> {
        self.inner.read().text(id)
    }

    pub fn set_text(&self, id: NodeId, text: impl Into<String>) -> MarkupResult<()> {
        self.inner.write().set_text(id, text)
    }

    pub fn is_editable(&self, id: NodeId) -> bool {
        self.inner.read().is_editable(id)
    }

    pub fn edit_value(&self, id: NodeId) -> String {
        self.inner.read().edit_value(id)
    }

    pub fn set_edit_value(&self, id: NodeId, value: impl Into<String>) -> MarkupResult<()> {
        self.inner.write().set_edit_value(id, value)
    }

    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.inner.read().find_by_id(element_id)
    }

    /// Serialize a node and its subtree.
    pub fn outer_markup(&self, id: NodeId) -> MarkupResult<String> {
        outer_markup(&self.inner.read(), id)
    }

    /// Serialize the children of a node.
    pub fn inner_markup(&self, id: NodeId) -> MarkupResult<String> {
        inner_markup(&self.inner.read(), id)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.inner.read();
        f.debug_struct("Document")
            .field("nodes", &tree.node_count())
            .field("markup", &outer_markup(&tree, tree.root()).unwrap_or_default())
            .finish()
    }
}
