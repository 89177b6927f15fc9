//! Scope scanning.
//!
//! A scope is the subtree a model is bound to. Before anything is registered,
//! the subtree is walked once and every node is tagged with the scope that
//! owns it: the scope being scanned ([`Owner::Current`]) or a nested scope
//! opened by some node in between ([`Owner::Nested`]).
//!
//! Nested scopes are opened by component instances, materialized repeat
//! instances, and nodes declaring a repeat or nested-model binding. The
//! opening node itself still belongs to the enclosing scope, except for a
//! repeat instance, which owns its own attributes: they are bound against
//! the list element, never against the enclosing model.

use horizon_bind_core::{Model, Result};
use horizon_bind_markup::{NodeId, Tree};

use crate::binder::Binder;
use crate::dispatch::RenderKind;
use crate::logging::targets;

/// Which scope a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// The scope being scanned.
    Current,
    /// The nested scope opened by the given node.
    Nested(NodeId),
}

/// How a node affects scope ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Belongs to whatever scope encloses it.
    Plain,
    /// Belongs to the enclosing scope and opens a nested one for its
    /// descendants.
    Opener,
    /// Opens a nested scope that includes the node itself.
    Instance,
}

/// One node of a scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeEntry {
    pub node: NodeId,
    /// Distance from the scope root; children of the root have depth 1.
    pub depth: usize,
    pub owner: Owner,
    pub role: NodeRole,
    /// The node is a repeat instance or lies inside one.
    pub in_instance: bool,
}

/// Ownership of every node under a scope root, in document order.
///
/// The root itself is not an entry.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    root: NodeId,
    entries: Vec<ScopeEntry>,
}

impl ScopeTree {
    /// Walk the subtree under `root` once, classifying nodes with `role`.
    pub fn build<F>(tree: &Tree, root: NodeId, role: F) -> horizon_bind_markup::MarkupResult<Self>
    where
        F: Fn(&Tree, NodeId) -> NodeRole,
    {
        let mut entries = Vec::new();
        let mut stack: Vec<(NodeId, usize, Owner, bool)> = tree
            .children(root)?
            .iter()
            .rev()
            .map(|&child| (child, 1, Owner::Current, false))
            .collect();

        while let Some((node, depth, inherited, sealed)) = stack.pop() {
            let role = role(tree, node);
            let in_instance = sealed || role == NodeRole::Instance;
            let (owner, below) = match role {
                NodeRole::Plain => (inherited, inherited),
                NodeRole::Opener => (inherited, Owner::Nested(node)),
                NodeRole::Instance => (Owner::Nested(node), Owner::Nested(node)),
            };
            entries.push(ScopeEntry {
                node,
                depth,
                owner,
                role,
                in_instance,
            });
            for &child in tree.children(node)?.iter().rev() {
                stack.push((child, depth + 1, below, in_instance));
            }
        }

        Ok(Self { root, entries })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All entries in document order.
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The owner of a node, or `None` if it is not under the root.
    pub fn owner(&self, node: NodeId) -> Option<Owner> {
        self.entries
            .iter()
            .find(|entry| entry.node == node)
            .map(|entry| entry.owner)
    }

    /// Whether the node belongs to the scanned scope.
    pub fn is_owned(&self, node: NodeId) -> bool {
        self.owner(node) == Some(Owner::Current)
    }

    /// Nodes owned by the scanned scope, in document order.
    pub fn owned(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.owner == Owner::Current)
            .map(|entry| entry.node)
    }
}

/// Nodes found by one scan, grouped by declaration.
#[derive(Debug, Default)]
struct Candidates {
    scalars: Vec<NodeId>,
    repeats: Vec<NodeId>,
    models: Vec<NodeId>,
}

impl Binder {
    /// Build the scope tree for a subtree.
    pub fn scope_tree(&self, root: NodeId) -> Result<ScopeTree> {
        let repeat = self.config().attribute("repeat");
        let model = self.config().attribute("model");
        let components = self.component_roots();
        let instances = self.instance_roots();
        let tree = self.document().with_read(|tree| {
            ScopeTree::build(tree, root, |tree, node| {
                if instances.contains(&node) {
                    NodeRole::Instance
                } else if components.contains(&node)
                    || tree.has_attribute(node, &repeat)
                    || tree.has_attribute(node, &model)
                {
                    NodeRole::Opener
                } else {
                    NodeRole::Plain
                }
            })
        })?;
        Ok(tree)
    }

    /// Bind every declaration in the subtree under `root` to `model`.
    ///
    /// Scalar declarations are bound only when the scanned scope owns them.
    /// Repeat declarations, then nested-model declarations (other than on
    /// the root) are bound after all scalars; unless
    /// [`strict_scopes`](crate::BinderConfig::strict_scopes) is set they are
    /// bound wherever they are nested, except inside materialized repeat
    /// instances, which belong to their list element. Scanning a bound scope
    /// again registers nothing new.
    #[tracing::instrument(target = "horizon_bind::scope", skip(self, model), fields(model = ?model.id()))]
    pub fn bind_scope(&self, root: NodeId, model: &Model) -> Result<()> {
        let scope = self.scope_tree(root)?;
        let candidates = self.candidates(&scope);
        tracing::debug!(
            target: targets::SCOPE,
            nodes = scope.len(),
            scalars = candidates.scalars.len(),
            repeats = candidates.repeats.len(),
            models = candidates.models.len(),
            "scope scanned"
        );

        for node in candidates.scalars {
            if self.still_under(root, node) {
                self.bind_element(node, model)?;
            }
        }
        for node in candidates.repeats {
            if self.still_under(root, node) {
                self.bind_repeat(node, model)?;
            }
        }
        for node in candidates.models {
            if self.still_under(root, node) {
                self.bind_model(node, model)?;
            }
        }
        Ok(())
    }

    /// Bind the scalar declarations on a single node.
    ///
    /// Unknown declaration kinds are ignored.
    pub fn bind_element(&self, node: NodeId, model: &Model) -> Result<()> {
        let declarations: Vec<(RenderKind, String)> = self.document().with_read(|tree| {
            tree.attributes(node).map(|attributes| {
                attributes
                    .iter()
                    .filter_map(|(name, value)| {
                        let kind = self.config().declaration_kind(name)?;
                        RenderKind::parse(kind).map(|kind| (kind, value.clone()))
                    })
                    .collect()
            })
        })?;
        for (kind, property) in declarations {
            self.bind_property(&property, node, model, kind)?;
        }
        Ok(())
    }

    fn candidates(&self, scope: &ScopeTree) -> Candidates {
        let scalar_attributes: Vec<String> = RenderKind::ALL
            .iter()
            .map(|kind| self.config().attribute(kind.as_str()))
            .collect();
        let repeat = self.config().attribute("repeat");
        let model = self.config().attribute("model");
        let strict = self.config().strict_scopes;

        self.document().with_read(|tree| {
            let mut found = Candidates::default();
            for entry in scope.entries() {
                let owned = entry.owner == Owner::Current;
                let node = entry.node;
                if owned && scalar_attributes.iter().any(|a| tree.has_attribute(node, a)) {
                    found.scalars.push(node);
                }
                let reachable = owned || (!strict && !entry.in_instance);
                if reachable && tree.has_attribute(node, &repeat) {
                    found.repeats.push(node);
                }
                if reachable && tree.has_attribute(node, &model) {
                    found.models.push(node);
                }
            }
            found
        })
    }

    /// Earlier bindings may have swapped nodes out of the scope.
    fn still_under(&self, root: NodeId, node: NodeId) -> bool {
        self.document()
            .with_read(|tree| tree.contains(node) && tree.is_inclusive_ancestor(root, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_bind_markup::Document;

    fn role_by_attribute(tree: &Tree, node: NodeId) -> NodeRole {
        if tree.has_attribute(node, "instance") {
            NodeRole::Instance
        } else if tree.has_attribute(node, "open") {
            NodeRole::Opener
        } else {
            NodeRole::Plain
        }
    }

    #[test]
    fn owners_follow_nearest_opener() {
        let doc = Document::parse(
            r#"<main id="root"><p id="a"></p><div id="o" open=""><p id="b"></p><div id="i" instance=""><p id="c"></p></div></div></main>"#,
        )
        .unwrap();
        let find = |id: &str| doc.find_by_id(id).unwrap();
        let root = find("root");
        let scope = doc
            .with_read(|tree| ScopeTree::build(tree, root, role_by_attribute))
            .unwrap();

        assert_eq!(scope.owner(root), None);
        assert_eq!(scope.owner(find("a")), Some(Owner::Current));
        assert_eq!(scope.owner(find("o")), Some(Owner::Current));
        assert_eq!(scope.owner(find("b")), Some(Owner::Nested(find("o"))));
        assert_eq!(scope.owner(find("i")), Some(Owner::Nested(find("i"))));
        assert_eq!(scope.owner(find("c")), Some(Owner::Nested(find("i"))));
        assert_eq!(scope.len(), 5);

        let sealed: Vec<bool> = ["a", "o", "b", "i", "c"]
            .iter()
            .map(|id| scope.entries().iter().find(|e| e.node == find(id)).unwrap().in_instance)
            .collect();
        assert_eq!(sealed, [false, false, false, true, true]);
    }

    #[test]
    fn entries_are_in_document_order_with_depth() {
        let doc = Document::parse(r#"<ul id="r"><li id="x"><b id="y"></b></li><li id="z"></li></ul>"#).unwrap();
        let root = doc.find_by_id("r").unwrap();
        let scope = doc
            .with_read(|tree| ScopeTree::build(tree, root, |_, _| NodeRole::Plain))
            .unwrap();
        let order: Vec<(NodeId, usize)> = scope.entries().iter().map(|e| (e.node, e.depth)).collect();
        assert_eq!(
            order,
            vec![
                (doc.find_by_id("x").unwrap(), 1),
                (doc.find_by_id("y").unwrap(), 2),
                (doc.find_by_id("z").unwrap(), 1),
            ]
        );
        assert_eq!(scope.owned().count(), 3);
    }

    #[test]
    fn root_role_is_ignored() {
        let doc = Document::parse(r#"<div id="r" open=""><p id="p"></p></div>"#).unwrap();
        let root = doc.find_by_id("r").unwrap();
        let scope = doc
            .with_read(|tree| ScopeTree::build(tree, root, role_by_attribute))
            .unwrap();
        assert!(scope.is_owned(doc.find_by_id("p").unwrap()));
    }
}
