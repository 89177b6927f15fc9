//! Backing storage for observed values.
//!
//! [`Property<T>`] is the private backing slot behind an intercepted model
//! field. It only stores; notification is layered on top by
//! [`ObservableField`](crate::ObservableField), which pairs a property with a
//! write hook and a [`Signal`](crate::Signal).
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::Property;
//!
//! let prop = Property::new(42);
//! assert_eq!(prop.get(), 42);
//!
//! let old = prop.swap(100);
//! assert_eq!(old, 42);
//! assert_eq!(prop.get(), 100);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value slot with interior mutability.
///
/// Unlike a change-detecting property, every write is stored regardless of
/// equality: binding propagation never compares old and new values.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Store a value.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
    }

    /// Store a value and return the previous one.
    pub fn swap(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// A read-only view of a property.
pub struct ReadOnlyProperty<'a, T> {
    inner: &'a Property<T>,
}

impl<'a, T: Clone> ReadOnlyProperty<'a, T> {
    /// Create a read-only view of a property.
    pub fn new(property: &'a Property<T>) -> Self {
        Self { inner: property }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.inner.get()
    }

    /// Access the value through a closure.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.with(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn equal_writes_are_stored() {
        let slot = Property::new(Value::from("a"));
        slot.set(Value::from("a"));
        assert_eq!(slot.get(), Value::from("a"));
        slot.set(Value::Null);
        assert!(!slot.get().is_truthy());
    }

    #[test]
    fn swap_returns_previous_value() {
        let slot = Property::new(Value::from(1));
        assert_eq!(slot.swap(Value::from(2)), Value::from(1));
        assert_eq!(slot.get(), Value::from(2));
    }

    #[test]
    fn with_borrows_without_cloning() {
        let slot = Property::new(Value::from("horizon"));
        let len = slot.with(|value| value.to_string().len());
        assert_eq!(len, 7);
    }

    #[test]
    fn read_only_view_tracks_writes() {
        let slot = Property::<Value>::default();
        let view = ReadOnlyProperty::new(&slot);
        assert_eq!(view.get(), Value::Null);
        slot.set(Value::from(true));
        assert_eq!(view.get(), Value::from(true));
    }
}
