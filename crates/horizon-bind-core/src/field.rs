//! Intercepted model fields.
//!
//! An [`ObservableField`] replaces a plain model value the first time the
//! property is bound. It owns a private backing slot, a write hook that is
//! fixed for the life of the field, and a [`Signal`] of change subscribers.
//!
//! A write runs in three steps, synchronously:
//!
//! 1. The backing slot is updated according to the field's [`StorePolicy`].
//! 2. The write hook runs with the stored and the incoming value.
//! 3. The change signal is emitted with the stored value.
//!
//! Reads never have side effects.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::logging::targets;
use crate::model::Model;
use crate::property::{Property, ReadOnlyProperty};
use crate::signal::Signal;
use crate::value::Value;

/// What a write leaves in the backing slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorePolicy {
    /// The incoming value replaces the stored one.
    #[default]
    Replace,
    /// The stored value is kept; the hook decides what to do with the
    /// incoming one.
    Retain,
}

/// Everything a write hook gets to see about one write.
#[derive(Debug)]
pub struct WriteEvent<'a> {
    /// The model that owns the field.
    pub model: &'a Model,
    /// The property name.
    pub name: &'a str,
    /// The value held by the field after the write.
    pub stored: &'a Value,
    /// The value that was assigned.
    pub incoming: &'a Value,
}

/// The interceptor installed with a field.
pub type WriteHook = Arc<dyn Fn(&WriteEvent<'_>) -> Result<()> + Send + Sync>;

/// An intercepted property with a private backing value.
pub struct ObservableField {
    value: Property<Value>,
    policy: StorePolicy,
    hook: WriteHook,
    changed: Signal<Value>,
}

impl ObservableField {
    pub(crate) fn new(initial: Value, policy: StorePolicy, hook: WriteHook) -> Self {
        Self {
            value: Property::new(initial),
            policy,
            hook,
            changed: Signal::new(),
        }
    }

    /// The current backing value.
    pub fn get(&self) -> Value {
        self.value.get()
    }

    /// A read-only view of the backing slot.
    pub fn backing(&self) -> ReadOnlyProperty<'_, Value> {
        ReadOnlyProperty::new(&self.value)
    }

    /// How writes are stored.
    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// Subscribers notified after every write.
    pub fn changed(&self) -> &Signal<Value> {
        &self.changed
    }

    pub(crate) fn write(&self, model: &Model, name: &str, incoming: Value) -> Result<()> {
        let stored = match self.policy {
            StorePolicy::Replace => {
                self.value.set(incoming.clone());
                incoming.clone()
            }
            StorePolicy::Retain => self.value.get(),
        };
        tracing::trace!(
            target: targets::PROPERTY,
            model = ?model.id(),
            name,
            kind = incoming.type_name(),
            "intercepted write"
        );
        (self.hook)(&WriteEvent {
            model,
            name,
            stored: &stored,
            incoming: &incoming,
        })?;
        self.changed.emit(&stored);
        Ok(())
    }
}

impl fmt::Debug for ObservableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableField")
            .field("value", &self.value)
            .field("policy", &self.policy)
            .field("subscribers", &self.changed.connection_count())
            .finish()
    }
}
