//! The binder: one markup document plus every binding made against it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockWriteGuard};

use horizon_bind_core::{Model, ObservableList, Result, StorePolicy, Value, WriteEvent};
use horizon_bind_markup::{Document, NodeId};

use crate::compose;
use crate::config::BinderConfig;
use crate::error::BindResult;
use crate::logging::targets;
use crate::ready::ReadySignal;
use crate::registry::{BindingId, BindingRecord, RecordKey, Registry};

pub(crate) struct BinderInner {
    document: Document,
    config: BinderConfig,
    registry: RwLock<Registry>,
    /// Component roots and the models they were attached with.
    components: RwLock<HashMap<NodeId, Model>>,
    /// Roots of materialized repeat instances.
    instances: RwLock<HashSet<NodeId>>,
    ready: ReadySignal,
}

/// Binds models to a markup document.
///
/// Cloning a binder shares it. Property hooks installed by a binder hold it
/// weakly: once every handle is dropped, writes to previously bound models
/// no longer touch the markup.
#[derive(Clone)]
pub struct Binder {
    inner: Arc<BinderInner>,
}

static_assertions::assert_impl_all!(Binder: Send, Sync);

impl Binder {
    /// Create a binder over a document with the default configuration.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, BinderConfig::default())
    }

    /// Create a binder over a document.
    pub fn with_config(document: Document, config: BinderConfig) -> Self {
        Self {
            inner: Arc::new(BinderInner {
                document,
                config,
                registry: RwLock::new(Registry::default()),
                components: RwLock::new(HashMap::new()),
                instances: RwLock::new(HashSet::new()),
                ready: ReadySignal::new(),
            }),
        }
    }

    /// Parse markup into a fresh document and create a binder over it.
    pub fn from_markup(markup: &str, config: BinderConfig) -> BindResult<Self> {
        let document = Document::parse(markup)?;
        Ok(Self::with_config(document, config))
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn config(&self) -> &BinderConfig {
        &self.inner.config
    }

    /// The readiness signal that gates component scans.
    pub fn ready(&self) -> &ReadySignal {
        &self.inner.ready
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.is_ready()
    }

    /// Declare the document ready, running deferred component scans.
    pub fn mark_ready(&self) -> Result<()> {
        self.inner.ready.fire()
    }

    pub(crate) fn downgrade(&self) -> Weak<BinderInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<BinderInner>) -> Option<Self> {
        inner.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn registry_mut(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.registry.write()
    }

    pub(crate) fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.inner.registry.read())
    }

    pub(crate) fn component_roots(&self) -> HashSet<NodeId> {
        self.inner.components.read().keys().copied().collect()
    }

    pub(crate) fn component_model(&self, root: NodeId) -> Option<Model> {
        self.inner.components.read().get(&root).cloned()
    }

    pub(crate) fn insert_component(&self, root: NodeId, model: Model) {
        self.inner.components.write().insert(root, model);
    }

    pub(crate) fn instance_roots(&self) -> HashSet<NodeId> {
        self.inner.instances.read().clone()
    }

    pub(crate) fn insert_instance(&self, root: NodeId) {
        self.inner.instances.write().insert(root);
    }

    pub(crate) fn remove_instance(&self, root: NodeId) {
        self.inner.instances.write().remove(&root);
    }

    /// Whether a node is a materialized repeat instance.
    pub fn is_instance(&self, node: NodeId) -> bool {
        self.inner.instances.read().contains(&node)
    }

    /// Intercept a property so writes reach this binder's records.
    ///
    /// Returns `false` when the property was already intercepted, in which
    /// case the existing hook and store policy stay in place.
    pub(crate) fn intercept<I>(&self, model: &Model, property: &str, policy: StorePolicy, init: I) -> bool
    where
        I: FnOnce(Option<Value>) -> Value,
    {
        let binder = self.downgrade();
        model.observe(property, init, policy, move |event| match Binder::upgrade(&binder) {
            Some(binder) => binder.on_write(event),
            None => Ok(()),
        })
    }

    pub(crate) fn register(&self, model: &Model, property: &str, record: BindingRecord) -> Option<BindingId> {
        self.registry_mut().insert(model, property, record)
    }

    /// Dispatch one intercepted write to every record on the property.
    fn on_write(&self, event: &WriteEvent<'_>) -> Result<()> {
        let ids = self.with_registry(|r| r.bindings(event.model.id(), event.name));
        tracing::trace!(
            target: targets::BINDER,
            model = ?event.model.id(),
            property = event.name,
            records = ids.len(),
            "property written"
        );

        let mut composed = false;
        let mut mirrors = Vec::new();
        for id in ids {
            // Earlier records may have retargeted or pruned this one.
            let Some(key) = self.with_registry(|r| r.key(id)) else {
                continue;
            };
            match key {
                RecordKey::Value(kind, target) => self.dispatch(id, kind, target, event.stored)?,
                RecordKey::Repeat(_) => self.repeat_written(id, event.stored)?,
                RecordKey::Model(root) => {
                    composed = true;
                    mirrors.extend(self.component_model(root));
                }
            }
        }
        if composed {
            compose::merge(event.stored, event.incoming, &mirrors)?;
        }
        Ok(())
    }

    /// Commit user input from an editable control.
    ///
    /// Sets the control's edit value and writes the text to every property
    /// with a `value` binding on it. Returns whether any property was
    /// written. Nodes that are not editable controls are left alone.
    pub fn commit_edit(&self, node: NodeId, text: &str) -> Result<bool> {
        if !self.document().is_editable(node) {
            return Ok(false);
        }
        self.document().set_edit_value(node, text)?;

        let bound = self.with_registry(|r| r.value_bindings_on(node));
        let mut written = false;
        for (model, property) in bound {
            let Some(model) = model.upgrade() else {
                continue;
            };
            tracing::debug!(target: targets::BINDER, model = ?model.id(), property, ?node, "edit committed");
            model.set(&property, text)?;
            written = true;
        }
        Ok(written)
    }

    /// Forget the bindings of models that have been dropped.
    ///
    /// Returns how many models were forgotten.
    pub fn prune(&self) -> usize {
        let (removed, watched) = self.registry_mut().prune();
        for watched in watched {
            watched.list.unwatch(watched.watch);
        }
        if removed > 0 {
            tracing::debug!(target: targets::REGISTRY, removed, "pruned dropped models");
        }
        removed
    }

    /// Number of records bound to a property of a model.
    pub fn binding_count(&self, model: &Model, property: &str) -> usize {
        self.with_registry(|r| r.bindings(model.id(), property).len())
    }

    /// Number of models with at least one binding.
    pub fn bound_model_count(&self) -> usize {
        self.with_registry(Registry::table_count)
    }

    /// Number of binding records across all models.
    pub fn record_count(&self) -> usize {
        self.with_registry(Registry::record_count)
    }

    /// Whether any repeat binding is watching `list`.
    pub fn is_watching(&self, list: &ObservableList) -> bool {
        self.with_registry(|r| r.watched_lists().contains(&list.id()))
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("config", &self.inner.config)
            .field("models", &self.bound_model_count())
            .field("records", &self.record_count())
            .field("components", &self.inner.components.read().len())
            .field("ready", &self.is_ready())
            .finish()
    }
}
