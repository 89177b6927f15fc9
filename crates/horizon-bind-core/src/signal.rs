//! Signal/slot system for Horizon Bind.
//!
//! A [`Signal`] is the list of change subscribers attached to an observable
//! field. Emitting a signal invokes every connected slot synchronously on the
//! emitting thread.
//!
//! # Re-entrancy
//!
//! The connection table is snapshotted before slots run, so a slot may
//! connect, disconnect or emit again without deadlocking. Slots connected
//! during an emission are first invoked by the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::Signal;
//!
//! let changed = Signal::<String>::new();
//! let id = changed.connect(|text| println!("now {text}"));
//!
//! changed.emit(&"Ada".to_string());
//! assert!(changed.disconnect(id));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identifies one subscriber of a [`Signal`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Change subscribers of one observable field.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Subscribe `slot`. It runs on every emission until disconnected.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Returns `false` when `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Invoke every subscriber with `args`.
    pub fn emit(&self, args: &Args) {
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        if slots.is_empty() {
            return;
        }
        tracing::trace!(target: targets::SIGNAL, subscribers = slots.len(), "emit");
        for slot in slots {
            slot(args);
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn subscribers_see_every_emission() {
        let signal = Signal::<Value>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |value: &Value| sink.lock().push(value.to_string()));

        signal.emit(&Value::from("a"));
        signal.emit(&Value::from("a"));
        assert_eq!(*seen.lock(), vec!["a", "a"]);
    }

    #[test]
    fn disconnect_stops_delivery() {
        let signal = Signal::<Value>::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        let id = signal.connect(move |_| *sink.lock() += 1);

        signal.emit(&Value::Null);
        assert!(signal.disconnect(id));
        signal.emit(&Value::Null);
        assert_eq!(*seen.lock(), 1);
        assert!(!signal.disconnect(id));
    }

    #[test]
    fn slot_may_connect_during_emit() {
        let signal = Arc::new(Signal::<Value>::new());
        let inner = signal.clone();
        signal.connect(move |_| {
            inner.connect(|_| {});
        });
        signal.emit(&Value::Null);
        assert_eq!(signal.connection_count(), 2);
    }
}
