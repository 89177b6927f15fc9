//! The binding registry.
//!
//! Binding records live in a side-table owned by the binder, keyed by model
//! identity. Models carry no bookkeeping of their own; each table holds a
//! weak reference to its model so dropped models can be pruned.
//!
//! Within a table, records are listed per property name in registration
//! order, which is the order writes are dispatched in. A (property, target)
//! pair is registered at most once.

use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};

use horizon_bind_core::{ListId, Model, ModelId, ObservableList, WatchId, WeakModel};
use horizon_bind_markup::NodeId;

use crate::dispatch::RenderKind;

new_key_type! {
    /// Identifies one binding record.
    pub struct BindingId;
}

/// The list a repeat binding currently watches.
#[derive(Debug, Clone)]
pub(crate) struct WatchedList {
    pub(crate) list: ObservableList,
    pub(crate) watch: WatchId,
}

/// One repeating region.
#[derive(Debug, Clone)]
pub(crate) struct RepeatRecord {
    pub(crate) template: NodeId,
    pub(crate) anchor: NodeId,
    /// `instances[i]` renders list slot `i`; the tail beyond the list length
    /// is hidden.
    pub(crate) instances: Vec<NodeId>,
    /// The element model each instance is bound to, parallel to `instances`.
    pub(crate) bound: Vec<Option<ModelId>>,
    pub(crate) watched: Option<WatchedList>,
}

/// A binding record.
#[derive(Debug, Clone)]
pub(crate) enum BindingRecord {
    Value { kind: RenderKind, target: NodeId },
    Repeat(RepeatRecord),
    Model { root: NodeId },
}

/// What identifies a record within a property, and what a write needs to
/// dispatch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RecordKey {
    Value(RenderKind, NodeId),
    Repeat(NodeId),
    Model(NodeId),
}

impl RecordKey {
    /// The node the record renders into or is declared on.
    pub(crate) fn node(self) -> NodeId {
        match self {
            Self::Value(_, node) | Self::Repeat(node) | Self::Model(node) => node,
        }
    }
}

impl BindingRecord {
    pub(crate) fn key(&self) -> RecordKey {
        match self {
            Self::Value { kind, target } => RecordKey::Value(*kind, *target),
            Self::Repeat(repeat) => RecordKey::Repeat(repeat.template),
            Self::Model { root } => RecordKey::Model(*root),
        }
    }
}

struct ModelTable {
    model: WeakModel,
    properties: HashMap<String, Vec<BindingId>>,
}

/// Side-table of binding records.
#[derive(Default)]
pub(crate) struct Registry {
    records: SlotMap<BindingId, BindingRecord>,
    tables: HashMap<ModelId, ModelTable>,
}

impl Registry {
    /// Register a record unless an equal key is already listed under the
    /// property. Returns the new record's id.
    pub(crate) fn insert(
        &mut self,
        model: &Model,
        property: &str,
        record: BindingRecord,
    ) -> Option<BindingId> {
        let key = record.key();
        let table = self.tables.entry(model.id()).or_insert_with(|| ModelTable {
            model: model.downgrade(),
            properties: HashMap::new(),
        });
        let ids = table.properties.entry(property.to_string()).or_default();
        if ids
            .iter()
            .any(|&id| self.records.get(id).is_some_and(|r| r.key() == key))
        {
            return None;
        }
        let id = self.records.insert(record);
        ids.push(id);
        Some(id)
    }

    /// Record ids bound to a property, in registration order.
    pub(crate) fn bindings(&self, model: ModelId, property: &str) -> Vec<BindingId> {
        self.tables
            .get(&model)
            .and_then(|table| table.properties.get(property))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn key(&self, id: BindingId) -> Option<RecordKey> {
        self.records.get(id).map(BindingRecord::key)
    }

    pub(crate) fn repeat(&self, id: BindingId) -> Option<&RepeatRecord> {
        match self.records.get(id) {
            Some(BindingRecord::Repeat(repeat)) => Some(repeat),
            _ => None,
        }
    }

    pub(crate) fn repeat_mut(&mut self, id: BindingId) -> Option<&mut RepeatRecord> {
        match self.records.get_mut(id) {
            Some(BindingRecord::Repeat(repeat)) => Some(repeat),
            _ => None,
        }
    }

    /// Repeat record declared on a template node.
    pub(crate) fn repeat_for_template(&self, template: NodeId) -> Option<&RepeatRecord> {
        self.records.values().find_map(|record| match record {
            BindingRecord::Repeat(repeat) if repeat.template == template => Some(repeat),
            _ => None,
        })
    }

    /// Point a scalar record at a new node.
    pub(crate) fn retarget(&mut self, id: BindingId, new_target: NodeId) {
        if let Some(BindingRecord::Value { target, .. }) = self.records.get_mut(id) {
            *target = new_target;
        }
    }

    /// (model, property) pairs with a `value` binding on `target`.
    pub(crate) fn value_bindings_on(&self, target: NodeId) -> Vec<(WeakModel, String)> {
        let mut found = Vec::new();
        for table in self.tables.values() {
            for (property, ids) in &table.properties {
                let bound = ids.iter().any(|&id| {
                    self.key(id) == Some(RecordKey::Value(RenderKind::Value, target))
                });
                if bound {
                    found.push((table.model.clone(), property.clone()));
                }
            }
        }
        found
    }

    /// Every record with the node it is keyed on.
    pub(crate) fn record_nodes(&self) -> Vec<(BindingId, NodeId)> {
        self.records
            .iter()
            .map(|(id, record)| (id, record.key().node()))
            .collect()
    }

    /// Remove records, unlisting them from their tables. Tables left empty
    /// are dropped.
    pub(crate) fn forget(&mut self, ids: &[BindingId]) -> Vec<BindingRecord> {
        let removed: Vec<BindingRecord> = ids.iter().filter_map(|&id| self.records.remove(id)).collect();
        if removed.is_empty() {
            return removed;
        }
        let records = &self.records;
        self.tables.retain(|_, table| {
            table.properties.retain(|_, listed| {
                listed.retain(|&id| records.contains_key(id));
                !listed.is_empty()
            });
            !table.properties.is_empty()
        });
        removed
    }

    /// Drop the tables of models that no longer exist, returning the lists
    /// whose watchers must be removed.
    pub(crate) fn prune(&mut self) -> (usize, Vec<WatchedList>) {
        let dead: Vec<ModelId> = self
            .tables
            .iter()
            .filter(|(_, table)| table.model.is_dropped())
            .map(|(&id, _)| id)
            .collect();
        let mut watched = Vec::new();
        for model in &dead {
            let Some(table) = self.tables.remove(model) else {
                continue;
            };
            for id in table.properties.into_values().flatten() {
                if let Some(BindingRecord::Repeat(repeat)) = self.records.remove(id) {
                    watched.extend(repeat.watched);
                }
            }
        }
        (dead.len(), watched)
    }

    pub(crate) fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Lists currently watched by any repeat record.
    pub(crate) fn watched_lists(&self) -> Vec<ListId> {
        self.records
            .values()
            .filter_map(|record| match record {
                BindingRecord::Repeat(RepeatRecord {
                    watched: Some(watched),
                    ..
                }) => Some(watched.list.id()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_bind_markup::Document;

    #[test]
    fn insert_dedupes_by_key() {
        let doc = Document::new();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        let model = Model::new();
        let mut registry = Registry::default();

        let first = registry.insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: a });
        assert!(first.is_some());
        assert!(registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: a })
            .is_none());
        assert!(registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Append, target: a })
            .is_some());
        assert!(registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: b })
            .is_some());
        assert!(registry
            .insert(&model, "y", BindingRecord::Value { kind: RenderKind::Value, target: a })
            .is_some());

        assert_eq!(registry.bindings(model.id(), "x").len(), 3);
        assert_eq!(registry.bindings(model.id(), "x")[0], first.unwrap());
        assert_eq!(registry.record_count(), 4);
    }

    #[test]
    fn retarget_changes_key() {
        let doc = Document::new();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        let model = Model::new();
        let mut registry = Registry::default();
        let id = registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Replace, target: a })
            .unwrap();
        registry.retarget(id, b);
        assert_eq!(registry.key(id), Some(RecordKey::Value(RenderKind::Replace, b)));
    }

    #[test]
    fn prune_removes_dropped_models() {
        let doc = Document::new();
        let a = doc.create_element("p");
        let kept = Model::new();
        let dropped = Model::new();
        let mut registry = Registry::default();
        registry.insert(&kept, "x", BindingRecord::Model { root: a });
        registry.insert(&dropped, "x", BindingRecord::Model { root: a });
        registry.insert(&dropped, "y", BindingRecord::Model { root: a });
        drop(dropped);

        let (removed, watched) = registry.prune();
        assert_eq!(removed, 1);
        assert!(watched.is_empty());
        assert_eq!(registry.table_count(), 1);
        assert_eq!(registry.record_count(), 1);
    }

    #[test]
    fn value_bindings_on_target() {
        let doc = Document::new();
        let input = doc.create_element("input");
        let model = Model::new();
        let mut registry = Registry::default();
        registry.insert(&model, "name", BindingRecord::Value { kind: RenderKind::Value, target: input });
        registry.insert(&model, "log", BindingRecord::Value { kind: RenderKind::Append, target: input });

        let found = registry.value_bindings_on(input);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, "name");
        assert_eq!(found[0].0.id(), model.id());
    }

    #[test]
    fn forget_unlists_records() {
        let doc = Document::new();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        let model = Model::new();
        let other = Model::new();
        let mut registry = Registry::default();
        let kept = registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: a })
            .unwrap();
        let gone = registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: b })
            .unwrap();
        let alone = registry.insert(&other, "y", BindingRecord::Model { root: b }).unwrap();

        let on_b: Vec<BindingId> = registry
            .record_nodes()
            .into_iter()
            .filter(|&(_, node)| node == b)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(on_b.len(), 2);
        assert_eq!(registry.forget(&on_b).len(), 2);

        assert_eq!(registry.bindings(model.id(), "x"), vec![kept]);
        assert!(registry.key(gone).is_none());
        assert!(registry.key(alone).is_none());
        assert_eq!(registry.table_count(), 1);
        assert_eq!(registry.record_count(), 1);

        assert!(registry
            .insert(&model, "x", BindingRecord::Value { kind: RenderKind::Value, target: b })
            .is_some());
    }
}
