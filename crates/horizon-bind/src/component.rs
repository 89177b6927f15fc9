//! Component hosting.
//!
//! A component is a subtree with a model of its own. Attaching one marks its
//! root as a scope boundary for every enclosing scan and schedules the scan
//! of its own subtree for when the document is ready.
//!
//! A nested-model declaration placed on a component root does not scan the
//! component's markup; assignments are mirrored onto the component model,
//! whose own bindings take it from there.

use horizon_bind_core::{Model, Result, Value};
use horizon_bind_markup::NodeId;

use crate::binder::Binder;
use crate::logging::targets;

/// A handle to an attached component.
#[derive(Debug, Clone)]
pub struct Component {
    root: NodeId,
    model: Model,
}

impl Component {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Read a property of the component model.
    pub fn get(&self, property: &str) -> Option<Value> {
        self.model.get(property)
    }

    /// Write a property of the component model.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<()> {
        self.model.set(property, value)
    }
}

impl Binder {
    /// Attach a component rooted at `root`.
    ///
    /// The scan of the component subtree against `model` is deferred until
    /// [`Binder::mark_ready`]; after that it runs immediately.
    pub fn attach(&self, root: NodeId, model: Model) -> Result<Component> {
        self.insert_component(root, model.clone());
        tracing::debug!(target: targets::BINDER, ?root, model = ?model.id(), ready = self.is_ready(), "component attached");

        let binder = self.downgrade();
        let scope_model = model.clone();
        self.ready().when_ready(move || match Binder::upgrade(&binder) {
            Some(binder) => binder.bind_scope(root, &scope_model),
            None => Ok(()),
        })?;

        Ok(Component { root, model })
    }

    /// Whether `node` is the root of an attached component.
    pub fn is_component(&self, node: NodeId) -> bool {
        self.component_model(node).is_some()
    }

    /// The component attached at `root`.
    pub fn component(&self, root: NodeId) -> Option<Component> {
        self.component_model(root).map(|model| Component { root, model })
    }
}
