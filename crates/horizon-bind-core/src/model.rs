//! Models: the data objects that drive markup.
//!
//! A [`Model`] is a shared handle to an ordered set of named fields. A field
//! starts out as a plain value and becomes an [`ObservableField`] the first
//! time it is observed. Once observed, a field stays observed for the life of
//! the model: it cannot be redefined or removed, and every write through
//! [`Model::set`] goes through its hook.
//!
//! Models carry no binding bookkeeping of their own. Anything that needs to
//! remember which markup depends on a model keys a side-table by
//! [`ModelId`] and holds a [`WeakModel`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use horizon_bind_core::{Model, StorePolicy, Value};
//!
//! let model = Model::new().with("title", "draft");
//!
//! let writes = Arc::new(AtomicUsize::new(0));
//! let counter = writes.clone();
//! let installed = model.observe(
//!     "title",
//!     |existing| existing.unwrap_or_default(),
//!     StorePolicy::Replace,
//!     move |_event| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     },
//! );
//! assert!(installed);
//! assert_eq!(model.get("title"), Some(Value::from("draft")));
//!
//! model.set("title", "final").unwrap();
//! assert_eq!(writes.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{PropertyError, Result};
use crate::field::{ObservableField, StorePolicy, WriteEvent};
use crate::logging::targets;
use crate::signal::ConnectionId;
use crate::value::Value;

/// A process-unique model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    /// Get the raw u64 value of this model ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique model IDs.
static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

fn next_model_id() -> ModelId {
    ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
}

enum Slot {
    Plain(Value),
    Observed(Arc<ObservableField>),
}

struct FieldEntry {
    name: String,
    slot: Slot,
}

struct ModelInner {
    id: ModelId,
    fields: RwLock<Vec<FieldEntry>>,
}

/// A shared handle to a model.
///
/// Cloning the handle shares the model; use [`Model::ptr_eq`] or
/// [`Model::id`] to compare identity.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ModelInner {
                id: next_model_id(),
                fields: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Create a model from name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let model = Self::new();
        {
            let mut fields = model.inner.fields.write();
            for (name, value) in pairs {
                let name = name.into();
                let value = value.into();
                match fields.iter_mut().find(|e| e.name == name) {
                    Some(entry) => entry.slot = Slot::Plain(value),
                    None => fields.push(FieldEntry {
                        name,
                        slot: Slot::Plain(value),
                    }),
                }
            }
        }
        model
    }

    /// Builder-style plain assignment, for constructing models inline.
    ///
    /// Writes to an observed field are routed through [`Model::set`]; errors
    /// from its hook are logged and dropped.
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        if let Err(err) = self.set(name, value) {
            tracing::warn!(target: targets::MODEL, name, %err, "write during construction failed");
        }
        self
    }

    /// The model's identity.
    pub fn id(&self) -> ModelId {
        self.inner.id
    }

    /// Whether two handles refer to the same model.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a weak handle that does not keep the model alive.
    pub fn downgrade(&self) -> WeakModel {
        WeakModel {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Read a property. Never has side effects.
    pub fn get(&self, name: &str) -> Option<Value> {
        let fields = self.inner.fields.read();
        fields.iter().find(|e| e.name == name).map(|e| match &e.slot {
            Slot::Plain(value) => value.clone(),
            Slot::Observed(field) => field.get(),
        })
    }

    /// Read a property, `Value::Null` when absent.
    pub fn value(&self, name: &str) -> Value {
        self.get(name).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.fields.read().iter().any(|e| e.name == name)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .fields
            .read()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Name/value pairs in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.keys()
            .into_iter()
            .filter_map(|name| self.get(&name).map(|value| (name, value)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.read().is_empty()
    }

    /// Whether a property has been intercepted.
    pub fn is_observed(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The intercepted field behind a property, if any.
    pub fn field(&self, name: &str) -> Option<Arc<ObservableField>> {
        let fields = self.inner.fields.read();
        fields.iter().find(|e| e.name == name).and_then(|e| match &e.slot {
            Slot::Observed(field) => Some(field.clone()),
            Slot::Plain(_) => None,
        })
    }

    /// Assign a property.
    ///
    /// Plain properties are stored. Observed properties go through their
    /// field: the value is stored per the field's policy, the write hook
    /// runs, then change subscribers are notified, all before this returns.
    /// Errors from the hook (markup that cannot be materialized) propagate.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = {
            let mut fields = self.inner.fields.write();
            match fields.iter_mut().find(|e| e.name == name) {
                Some(FieldEntry {
                    slot: Slot::Observed(field),
                    ..
                }) => field.clone(),
                Some(entry) => {
                    entry.slot = Slot::Plain(value);
                    return Ok(());
                }
                None => {
                    fields.push(FieldEntry {
                        name: name.to_string(),
                        slot: Slot::Plain(value),
                    });
                    return Ok(());
                }
            }
        };
        field.write(self, name, value)
    }

    /// Remove a plain property. Observed properties cannot be removed.
    pub fn remove(&self, name: &str) -> Result<Option<Value>> {
        let mut fields = self.inner.fields.write();
        let Some(position) = fields.iter().position(|e| e.name == name) else {
            return Ok(None);
        };
        if matches!(fields[position].slot, Slot::Observed(_)) {
            return Err(PropertyError::Intercepted {
                name: name.to_string(),
            }
            .into());
        }
        match fields.remove(position).slot {
            Slot::Plain(value) => Ok(Some(value)),
            Slot::Observed(_) => Ok(None),
        }
    }

    /// Intercept a property.
    ///
    /// If `name` is not yet observed, installs an [`ObservableField`] whose
    /// initial value is `init` applied to the existing plain value (`None`
    /// when the property is absent), and returns `true`. If it is already
    /// observed, nothing changes and `false` is returned: the first hook
    /// stays in place for the life of the model.
    ///
    /// `init` runs while the model is locked and must not touch the model.
    pub fn observe<I, H>(&self, name: &str, init: I, policy: StorePolicy, hook: H) -> bool
    where
        I: FnOnce(Option<Value>) -> Value,
        H: Fn(&WriteEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let mut fields = self.inner.fields.write();
        let position = fields.iter().position(|e| e.name == name);
        let existing = match position {
            Some(i) => match &fields[i].slot {
                Slot::Observed(_) => return false,
                Slot::Plain(value) => Some(value.clone()),
            },
            None => None,
        };
        let field = Arc::new(ObservableField::new(init(existing), policy, Arc::new(hook)));
        match position {
            Some(i) => fields[i].slot = Slot::Observed(field),
            None => fields.push(FieldEntry {
                name: name.to_string(),
                slot: Slot::Observed(field),
            }),
        }
        tracing::debug!(target: targets::PROPERTY, model = ?self.inner.id, name, ?policy, "property intercepted");
        true
    }

    /// Subscribe to writes of an observed property.
    ///
    /// Returns `None` when the property is not observed.
    pub fn connect<F>(&self, name: &str, slot: F) -> Option<ConnectionId>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.field(name).map(|field| field.changed().connect(slot))
    }

    /// Remove a subscription made with [`Model::connect`].
    pub fn disconnect(&self, name: &str, id: ConnectionId) -> bool {
        self.field(name)
            .is_some_and(|field| field.changed().disconnect(id))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.inner.id)
            .field("keys", &self.keys())
            .finish()
    }
}

/// Conversion of plain data into a [`Model`].
///
/// Usually derived with `#[derive(IntoModel)]` from `horizon-bind-macros`.
pub trait IntoModel {
    fn into_model(self) -> Model;
}

impl IntoModel for Model {
    fn into_model(self) -> Model {
        self
    }
}

/// A weak handle to a model.
#[derive(Clone)]
pub struct WeakModel {
    id: ModelId,
    inner: Weak<ModelInner>,
}

impl WeakModel {
    /// The identity of the model this handle points to.
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Get a strong handle if the model is still alive.
    pub fn upgrade(&self) -> Option<Model> {
        self.inner.upgrade().map(|inner| Model { inner })
    }

    /// Whether the model has been dropped.
    pub fn is_dropped(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl fmt::Debug for WeakModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakModel")
            .field("id", &self.id)
            .field("alive", &!self.is_dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_hook(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(&WriteEvent<'_>) -> Result<()> + Send + Sync + 'static {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(Model::new().id(), Model::new().id());
    }

    #[test]
    fn plain_set_and_get() {
        let model = Model::new();
        model.set("a", 1).unwrap();
        model.set("b", "two").unwrap();
        model.set("a", 3).unwrap();
        assert_eq!(model.keys(), vec!["a", "b"]);
        assert_eq!(model.get("a"), Some(Value::from(3)));
        assert_eq!(model.get("missing"), None);
    }

    #[test]
    fn observe_uses_existing_value() {
        let model = Model::from_pairs([("name", "Ada")]);
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(model.observe("name", |v| v.unwrap_or_default(), StorePolicy::Replace, counting_hook(calls.clone())));
        assert_eq!(model.value("name"), Value::from("Ada"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn observe_absent_uses_default() {
        let model = Model::new();
        let calls = Arc::new(AtomicUsize::new(0));
        model.observe("items", |_| Value::from(Vec::<Value>::new()), StorePolicy::Replace, counting_hook(calls.clone()));
        assert!(model.value("items").as_list().is_some());
    }

    #[test]
    fn second_observe_keeps_first_hook() {
        let model = Model::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        assert!(model.observe("x", |v| v.unwrap_or_default(), StorePolicy::Replace, counting_hook(first.clone())));
        assert!(!model.observe("x", |v| v.unwrap_or_default(), StorePolicy::Replace, counting_hook(second.clone())));
        model.set("x", 1).unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_write_propagates() {
        let model = Model::new();
        let calls = Arc::new(AtomicUsize::new(0));
        model.observe("x", |v| v.unwrap_or_default(), StorePolicy::Replace, counting_hook(calls.clone()));
        model.set("x", "same").unwrap();
        model.set("x", "same").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn retain_policy_keeps_stored_value() {
        let model = Model::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let s = seen.clone();
        model.observe("child", |_| Value::from("kept"), StorePolicy::Retain, move |event| {
            *s.lock() = Some(event.incoming.clone());
            Ok(())
        });
        model.set("child", "incoming").unwrap();
        assert_eq!(model.value("child"), Value::from("kept"));
        assert_eq!(*seen.lock(), Some(Value::from("incoming")));
    }

    #[test]
    fn observed_property_cannot_be_removed() {
        let model = Model::from_pairs([("a", 1), ("b", 2)]);
        model.observe("a", |v| v.unwrap_or_default(), StorePolicy::Replace, |_| Ok(()));
        assert!(matches!(
            model.remove("a"),
            Err(crate::Error::Property(PropertyError::Intercepted { .. }))
        ));
        assert_eq!(model.remove("b").unwrap(), Some(Value::from(2)));
    }

    #[test]
    fn connect_requires_observed_field() {
        let model = Model::new();
        assert!(model.connect("x", |_| {}).is_none());
        model.observe("x", |v| v.unwrap_or_default(), StorePolicy::Replace, |_| Ok(()));
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let id = model
            .connect("x", move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        model.set("x", 5).unwrap();
        assert!(model.disconnect("x", id));
        model.set("x", 6).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_may_write_back_into_model() {
        let model = Model::new();
        model.observe("source", |v| v.unwrap_or_default(), StorePolicy::Replace, |event| {
            event.model.set("mirror", event.stored.clone())
        });
        model.set("source", "x").unwrap();
        assert_eq!(model.value("mirror"), Value::from("x"));
    }

    #[test]
    fn weak_handle() {
        let model = Model::new();
        let weak = model.downgrade();
        assert_eq!(weak.id(), model.id());
        assert!(weak.upgrade().is_some());
        drop(model);
        assert!(weak.is_dropped());
        assert!(weak.upgrade().is_none());
    }
}
