//! Repeat bindings and list reconciliation.
//!
//! A repeat declaration turns its node into a hidden template. Each element
//! of the bound list is rendered by one instance: a deep clone of the
//! template inserted after the previous instance, or after the template for
//! the first one.
//!
//! Reconciliation is index-positional. Slot `i` is always rendered by
//! `instances[i]`; existing instances are revealed, missing ones are cloned,
//! and instances past the end of the list are hidden so they can be reused
//! when the list grows again. Instances are never removed.
//!
//! An instance holds bindings for one element at a time. When its slot
//! moves to a different element, or is hidden, the bindings inside it are
//! forgotten and its content is restored from the template, so a reused
//! instance renders exactly like a fresh clone.
//!
//! The record reconciles on every write of the property and on every
//! structural mutation of the list it currently holds.

use horizon_bind_core::{Model, ModelId, ObservableList, Result, StorePolicy, Value};
use horizon_bind_markup::{HIDDEN_ATTRIBUTE, NodeId};

use crate::binder::Binder;
use crate::logging::targets;
use crate::registry::{BindingId, BindingRecord, Registry, RepeatRecord, WatchedList};

impl Binder {
    /// Bind the repeat declaration on `decl` to a list property of `model`.
    ///
    /// A current value that is not a list renders as an empty list. Binding
    /// the same declaration twice does nothing.
    pub fn bind_repeat(&self, decl: NodeId, model: &Model) -> Result<()> {
        let attribute = self.config().attribute("repeat");
        let Some(property) = self.document().attribute(decl, &attribute) else {
            return Ok(());
        };
        self.document().set_hidden(decl, true)?;

        self.intercept(model, &property, StorePolicy::Replace, |existing| match existing {
            Some(list @ Value::List(_)) => list,
            _ => Value::List(ObservableList::new()),
        });

        let record = BindingRecord::Repeat(RepeatRecord {
            template: decl,
            anchor: decl,
            instances: Vec::new(),
            bound: Vec::new(),
            watched: None,
        });
        let Some(id) = self.register(model, &property, record) else {
            return Ok(());
        };
        tracing::debug!(target: targets::REPEAT, model = ?model.id(), property, template = ?decl, "repeat binding registered");

        let current = model.value(&property);
        let items = current.as_list().map(ObservableList::to_vec).unwrap_or_default();
        self.reconcile(id, &items)?;
        self.watch_list(id, current.as_list());
        Ok(())
    }

    /// A new value was assigned to a repeat-bound property.
    pub(crate) fn repeat_written(&self, id: BindingId, value: &Value) -> Result<()> {
        let list = value.as_list();
        self.watch_list(id, list);
        let items = list.map(ObservableList::to_vec).unwrap_or_default();
        self.reconcile(id, &items)
    }

    /// Move the record's watcher to `list`, detaching it from the previous
    /// one. Watching the same list again keeps the existing watcher.
    fn watch_list(&self, id: BindingId, list: Option<&ObservableList>) {
        let previous = self.with_registry(|r| r.repeat(id).and_then(|record| record.watched.clone()));
        if let (Some(previous), Some(list)) = (&previous, list) {
            if previous.list.ptr_eq(list) {
                return;
            }
        }
        if let Some(previous) = previous {
            previous.list.unwatch(previous.watch);
        }

        let watched = list.map(|list| {
            let binder = self.downgrade();
            let watch = list.watch(move |list, op| {
                let Some(binder) = Binder::upgrade(&binder) else {
                    return Ok(());
                };
                tracing::trace!(target: targets::REPEAT, ?op, len = list.len(), "list mutated");
                binder.reconcile(id, &list.to_vec())
            });
            WatchedList {
                list: list.clone(),
                watch,
            }
        });
        if let Some(record) = self.registry_mut().repeat_mut(id) {
            record.watched = watched;
        }
    }

    /// Bring the instances of a repeat record in line with `items`.
    #[tracing::instrument(target = "horizon_bind::repeat", skip(self, items), fields(len = items.len()))]
    pub(crate) fn reconcile(&self, id: BindingId, items: &[Value]) -> Result<()> {
        let Some((template, anchor, existing)) = self.with_registry(|r| {
            r.repeat(id)
                .map(|record| (record.template, record.anchor, record.instances.len()))
        }) else {
            return Ok(());
        };
        let repeat_attribute = self.config().attribute("repeat");
        let document = self.document();

        let mut previous = None;
        let mut rebound = 0;
        for (index, item) in items.iter().enumerate() {
            let element = item.as_model();
            let wanted = element.map(Model::id);
            let slot = self.with_registry(|r| {
                r.repeat(id)
                    .and_then(|record| Some((*record.instances.get(index)?, *record.bound.get(index)?)))
            });
            let instance = match slot {
                Some((instance, bound)) => {
                    if bound != wanted {
                        if bound.is_some() {
                            self.reset_instance(instance, template)?;
                        }
                        if let Some(element) = element {
                            self.bind_instance(instance, element)?;
                        }
                        self.set_bound(id, index, wanted);
                        rebound += 1;
                    }
                    document.set_hidden(instance, false)?;
                    instance
                }
                None => {
                    let instance = document.deep_clone(template)?;
                    document.remove_attribute(instance, &repeat_attribute)?;
                    self.insert_instance(instance);
                    if let Some(element) = element {
                        self.bind_instance(instance, element)?;
                    }
                    document.set_hidden(instance, false)?;
                    document.insert_after(previous.unwrap_or(anchor), instance)?;
                    if let Some(record) = self.registry_mut().repeat_mut(id) {
                        record.instances.push(instance);
                        record.bound.push(wanted);
                    }
                    instance
                }
            };
            previous = Some(instance);
        }

        let surplus: Vec<(usize, NodeId, Option<ModelId>)> = self.with_registry(|r| {
            r.repeat(id)
                .map(|record| {
                    record
                        .instances
                        .iter()
                        .zip(&record.bound)
                        .enumerate()
                        .skip(items.len())
                        .map(|(index, (&instance, &bound))| (index, instance, bound))
                        .collect()
                })
                .unwrap_or_default()
        });
        for &(index, instance, bound) in &surplus {
            if bound.is_some() {
                self.reset_instance(instance, template)?;
                self.set_bound(id, index, None);
            }
            document.set_hidden(instance, true)?;
        }

        tracing::debug!(
            target: targets::REPEAT,
            template = ?template,
            shown = items.len(),
            created = items.len().saturating_sub(existing),
            rebound,
            hidden = surplus.len(),
            "reconciled"
        );
        Ok(())
    }

    fn set_bound(&self, id: BindingId, index: usize, element: Option<ModelId>) {
        if let Some(slot) = self
            .registry_mut()
            .repeat_mut(id)
            .and_then(|record| record.bound.get_mut(index))
        {
            *slot = element;
        }
    }

    /// Bind an instance to its list element: its own attributes, then its
    /// subtree.
    fn bind_instance(&self, instance: NodeId, element: &Model) -> Result<()> {
        self.bind_element(instance, element)?;
        self.bind_scope(instance, element)
    }

    /// Forget the bindings inside `instance` and restore its content and
    /// attributes from the template. The hidden state is left alone.
    fn reset_instance(&self, instance: NodeId, template: NodeId) -> Result<()> {
        self.forget_subtree(instance)?;

        let document = self.document();
        for child in document.children(instance)? {
            document.destroy(child)?;
        }
        for child in document.children(template)? {
            let copy = document.deep_clone(child)?;
            document.append_child(instance, copy)?;
        }

        let repeat_attribute = self.config().attribute("repeat");
        for name in document.attribute_names(instance)? {
            if name != HIDDEN_ATTRIBUTE {
                document.remove_attribute(instance, &name)?;
            }
        }
        for name in document.attribute_names(template)? {
            if name == repeat_attribute || name == HIDDEN_ATTRIBUTE {
                continue;
            }
            if let Some(value) = document.attribute(template, &name) {
                document.set_attribute(instance, name, value)?;
            }
        }
        tracing::trace!(target: targets::REPEAT, ?instance, "instance reset");
        Ok(())
    }

    /// Unregister every record keyed on a node under `root`, inclusive.
    ///
    /// Forgotten repeat records stop watching their list and destroy their
    /// instances.
    pub(crate) fn forget_subtree(&self, root: NodeId) -> Result<()> {
        let nodes = self.with_registry(Registry::record_nodes);
        let inside: Vec<BindingId> = self.document().with_read(|tree| {
            nodes
                .into_iter()
                .filter(|&(_, node)| tree.contains(node) && tree.is_inclusive_ancestor(root, node))
                .map(|(id, _)| id)
                .collect()
        });
        if inside.is_empty() {
            return Ok(());
        }

        let removed = self.registry_mut().forget(&inside);
        let document = self.document();
        for record in &removed {
            let BindingRecord::Repeat(repeat) = record else {
                continue;
            };
            if let Some(watched) = &repeat.watched {
                watched.list.unwatch(watched.watch);
            }
            for &instance in &repeat.instances {
                self.remove_instance(instance);
                if document.contains(instance) {
                    document.destroy(instance)?;
                }
            }
        }
        tracing::debug!(target: targets::REPEAT, ?root, forgotten = removed.len(), "subtree bindings forgotten");
        Ok(())
    }

    /// The materialized instances of the repeat declared on `template`.
    pub fn repeat_instances(&self, template: NodeId) -> Vec<NodeId> {
        self.with_registry(|r| {
            r.repeat_for_template(template)
                .map(|record| record.instances.clone())
                .unwrap_or_default()
        })
    }
}
