//! Arena-backed markup tree.
//!
//! The tree mirrors the parts of a document object model the binding engine
//! needs: elements with ordered attributes, text, parent/child links,
//! detached subtrees, deep cloning and in-place replacement.
//!
//! Detaching a node never destroys it. Binding records hold [`NodeId`]s, so a
//! node swapped out of the tree stays addressable until [`Tree::destroy`] is
//! called explicitly.

use slotmap::SlotMap;

use crate::error::{MarkupError, MarkupResult};
use crate::node::{EDITABLE_ELEMENTS, NodeData, NodeId, NodeKind};

/// Attribute that marks a node as hidden.
pub const HIDDEN_ATTRIBUTE: &str = "hidden";

/// Attribute that carries the edit value of an editable control.
pub const VALUE_ATTRIBUTE: &str = "value";

/// The markup tree.
pub struct Tree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only a document root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Document));
        Self { nodes, root }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn data(&self, id: NodeId) -> MarkupResult<&NodeData> {
        self.nodes.get(id).ok_or(MarkupError::InvalidNode)
    }

    fn data_mut(&mut self, id: NodeId) -> MarkupResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(MarkupError::InvalidNode)
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> MarkupResult<&NodeKind> {
        self.data(id).map(|d| &d.kind)
    }

    /// The tag of an element, `None` for other node kinds.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|d| d.kind.tag())
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::element(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Text(text.into())))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(NodeData::new(NodeKind::Comment(text.into())))
    }

    /// Deep-clone a node and its subtree. The clone is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> MarkupResult<NodeId> {
        let kind = self.data(id)?.kind.clone();
        let copy = self.nodes.insert(NodeData::new(kind));
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            let children = self.data(source)?.children.clone();
            for child in children {
                let kind = self.data(child)?.kind.clone();
                let child_copy = self.nodes.insert(NodeData::new(kind));
                self.link(target, child_copy, None)?;
                pending.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    /// Destroy a node and its whole subtree, detaching it first.
    pub fn destroy(&mut self, id: NodeId) -> MarkupResult<()> {
        if id == self.root {
            return Err(MarkupError::InvalidNode);
        }
        self.detach(id)?;
        let mut doomed = self.descendants(id)?;
        doomed.push(id);
        for node in doomed {
            self.nodes.remove(node);
        }
        Ok(())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> MarkupResult<Option<NodeId>> {
        self.data(id).map(|d| d.parent)
    }

    /// The children of a node.
    pub fn children(&self, id: NodeId) -> MarkupResult<&[NodeId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// All descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> MarkupResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.data(id)?.children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.data(node)?.children.iter().rev().copied());
        }
        Ok(result)
    }

    /// Ancestors from the parent upward to the topmost node.
    pub fn ancestors(&self, id: NodeId) -> MarkupResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(node) = current {
            result.push(node);
            current = self.nodes.get(node).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(node).and_then(|d| d.parent);
        }
        false
    }

    /// Whether the node is attached under the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root, id)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> MarkupResult<()> {
        self.link(parent, child, None)
    }

    /// Insert `node` immediately after `reference`.
    ///
    /// Does nothing when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> MarkupResult<()> {
        if reference == node {
            return Ok(());
        }
        let Some(parent) = self.data(reference)?.parent else {
            return Ok(());
        };
        self.data(node)?;
        self.detach(node)?;
        let index = self
            .data(parent)?
            .children
            .iter()
            .position(|&c| c == reference)
            .map(|i| i + 1);
        self.link(parent, node, index)
    }

    /// Put `replacement` where `old` is and detach `old`.
    ///
    /// Does nothing when `old` has no parent.
    pub fn replace_with(&mut self, old: NodeId, replacement: NodeId) -> MarkupResult<()> {
        if old == replacement {
            return Ok(());
        }
        let Some(parent) = self.data(old)?.parent else {
            return Ok(());
        };
        self.data(replacement)?;
        self.detach(replacement)?;
        let index = self.data(parent)?.children.iter().position(|&c| c == old);
        self.detach(old)?;
        self.link(parent, replacement, index)
    }

    /// Detach a node from its parent, keeping it and its subtree alive.
    pub fn detach(&mut self, id: NodeId) -> MarkupResult<()> {
        let parent = self.data(id)?.parent;
        if let Some(parent) = parent {
            if let Some(data) = self.nodes.get_mut(parent) {
                data.children.retain(|&c| c != id);
            }
        }
        self.data_mut(id)?.parent = None;
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> MarkupResult<()> {
        self.data(parent)?;
        self.data(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(MarkupError::CircularInsertion);
        }
        self.detach(child)?;
        let siblings = &mut self.data_mut(parent)?.children;
        match index {
            Some(i) if i <= siblings.len() => siblings.insert(i, child),
            _ => siblings.push(child),
        }
        self.data_mut(child)?.parent = Some(parent);
        Ok(())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn attributes_mut(&mut self, id: NodeId) -> MarkupResult<&mut Vec<(String, String)>> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Err(MarkupError::NotAnElement),
        }
    }

    /// All attributes of a node in declaration order. Empty for non-elements.
    pub fn attributes(&self, id: NodeId) -> MarkupResult<&[(String, String)]> {
        match &self.data(id)?.kind {
            NodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Ok(&[]),
        }
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self, id: NodeId) -> MarkupResult<Vec<String>> {
        Ok(self.attributes(id)?.iter().map(|(k, _)| k.clone()).collect())
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .ok()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the node carries an attribute.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> MarkupResult<()> {
        let name = name.into();
        let value = value.into();
        let attributes = self.attributes_mut(id)?;
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => attributes.push((name, value)),
        }
        Ok(())
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> MarkupResult<Option<String>> {
        let attributes = self.attributes_mut(id)?;
        let position = attributes.iter().position(|(k, _)| k == name);
        Ok(position.map(|i| attributes.remove(i).1))
    }

    /// Whether the node is hidden.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.has_attribute(id, HIDDEN_ATTRIBUTE)
    }

    /// Hide or reveal an element.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> MarkupResult<()> {
        if hidden {
            self.set_attribute(id, HIDDEN_ATTRIBUTE, "")
        } else {
            self.remove_attribute(id, HIDDEN_ATTRIBUTE).map(|_| ())
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Concatenated text of the node and its descendants.
    pub fn text(&self, id: NodeId) -> MarkupResult<String> {
        let mut out = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)?) {
            if let NodeKind::Text(text) = &self.data(node)?.kind {
                out.push_str(text);
            }
        }
        Ok(out)
    }

    /// Replace the display text of a node.
    ///
    /// For elements all children are detached and replaced with a single text
    /// node (no text node for an empty string). Text and comment nodes have
    /// their content replaced.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> MarkupResult<()> {
        let text = text.into();
        match &mut self.data_mut(id)?.kind {
            NodeKind::Text(content) | NodeKind::Comment(content) => {
                *content = text;
                return Ok(());
            }
            NodeKind::Document | NodeKind::Element { .. } => {}
        }
        let children = std::mem::take(&mut self.data_mut(id)?.children);
        for child in children {
            if let Some(data) = self.nodes.get_mut(child) {
                data.parent = None;
            }
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.link(id, node, None)?;
        }
        Ok(())
    }

    /// Whether the node is an editable-text control.
    pub fn is_editable(&self, id: NodeId) -> bool {
        self.tag(id)
            .is_some_and(|tag| EDITABLE_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(tag)))
    }

    /// The edit value of a control (empty when unset).
    pub fn edit_value(&self, id: NodeId) -> String {
        self.attribute(id, VALUE_ATTRIBUTE)
            .unwrap_or_default()
            .to_string()
    }

    /// Set the edit value of a control.
    pub fn set_edit_value(&mut self, id: NodeId, value: impl Into<String>) -> MarkupResult<()> {
        self.set_attribute(id, VALUE_ATTRIBUTE, value)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the first attached element whose `id` attribute equals `element_id`.
    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .ok()?
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(element_id))
    }

    /// All descendants of `id` carrying attribute `name`, in document order.
    pub fn descendants_with_attribute(&self, id: NodeId, name: &str) -> MarkupResult<Vec<NodeId>> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&n| self.has_attribute(n, name))
            .collect())
    }
}
