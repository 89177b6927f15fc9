//! Observable lists.
//!
//! An [`ObservableList`] is a shared, ordered sequence of [`Value`]s. Every
//! structural mutation notifies the list's watchers synchronously, after the
//! mutation has been applied and the list lock released. Watchers receive the
//! list itself, so they never need to hold a handle to it.
//!
//! [`ObservableList::replace_at`] is the one in-place write that does not
//! notify; call [`ObservableList::refresh`] afterwards to have watchers
//! reconcile.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use slotmap::{SlotMap, new_key_type};

use crate::error::Result;
use crate::logging::targets;
use crate::value::Value;

new_key_type! {
    /// Identifies a watcher registered with [`ObservableList::watch`].
    pub struct WatchId;
}

/// A process-unique list identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(u64);

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// The structural operation that triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    Push,
    Pop,
    Shift,
    Unshift,
    Insert,
    Remove,
    Splice,
    Reverse,
    Sort,
    Clear,
    /// Explicit request to reconcile without a structural change.
    Refresh,
}

/// Callback invoked after each structural mutation.
pub type ListWatcher = Arc<dyn Fn(&ObservableList, ListOp) -> Result<()> + Send + Sync>;

struct ListInner {
    id: ListId,
    items: RwLock<Vec<Value>>,
    watchers: Mutex<SlotMap<WatchId, ListWatcher>>,
}

/// A shared handle to an observable list.
#[derive(Clone)]
pub struct ObservableList {
    inner: Arc<ListInner>,
}

impl Default for ObservableList {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableList {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list from anything convertible to values.
    pub fn from_values<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::from_vec(items.into_iter().map(Into::into).collect())
    }

    fn from_vec(items: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(ListInner {
                id: ListId(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed)),
                items: RwLock::new(items),
                watchers: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    pub fn id(&self) -> ListId {
        self.inner.id
    }

    /// Whether two handles refer to the same list.
    pub fn ptr_eq(&self, other: &ObservableList) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.read().get(index).cloned()
    }

    /// A snapshot of the current items.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.read().clone()
    }

    /// Run a closure with read access to the items.
    ///
    /// The closure must not mutate this list.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Value]) -> R,
    {
        f(&self.inner.items.read())
    }

    /// Register a watcher for structural mutations.
    pub fn watch<F>(&self, watcher: F) -> WatchId
    where
        F: Fn(&ObservableList, ListOp) -> Result<()> + Send + Sync + 'static,
    {
        self.inner.watchers.lock().insert(Arc::new(watcher))
    }

    /// Remove a watcher. Returns `false` if it was not registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        self.inner.watchers.lock().remove(id).is_some()
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }

    /// Append an item.
    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        self.inner.items.write().push(value.into());
        self.notify(ListOp::Push)
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Result<Option<Value>> {
        let popped = self.inner.items.write().pop();
        self.notify(ListOp::Pop)?;
        Ok(popped)
    }

    /// Remove and return the first item.
    pub fn shift(&self) -> Result<Option<Value>> {
        let shifted = {
            let mut items = self.inner.items.write();
            (!items.is_empty()).then(|| items.remove(0))
        };
        self.notify(ListOp::Shift)?;
        Ok(shifted)
    }

    /// Prepend an item.
    pub fn unshift(&self, value: impl Into<Value>) -> Result<()> {
        self.inner.items.write().insert(0, value.into());
        self.notify(ListOp::Unshift)
    }

    /// Insert an item, clamping `index` to the list length.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        {
            let mut items = self.inner.items.write();
            let index = index.min(items.len());
            items.insert(index, value.into());
        }
        self.notify(ListOp::Insert)
    }

    /// Remove the item at `index`, if present.
    pub fn remove(&self, index: usize) -> Result<Option<Value>> {
        let removed = {
            let mut items = self.inner.items.write();
            (index < items.len()).then(|| items.remove(index))
        };
        self.notify(ListOp::Remove)?;
        Ok(removed)
    }

    /// Remove `delete_count` items starting at `start` and insert `items` in
    /// their place. Out-of-range bounds are clamped. Returns the removed
    /// items.
    pub fn splice<I>(&self, start: usize, delete_count: usize, items: I) -> Result<Vec<Value>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let removed: Vec<Value> = {
            let mut current = self.inner.items.write();
            let start = start.min(current.len());
            let end = start.saturating_add(delete_count).min(current.len());
            current
                .splice(start..end, items.into_iter().map(Into::into))
                .collect()
        };
        self.notify(ListOp::Splice)?;
        Ok(removed)
    }

    pub fn reverse(&self) -> Result<()> {
        self.inner.items.write().reverse();
        self.notify(ListOp::Reverse)
    }

    /// Sort by display text.
    pub fn sort(&self) -> Result<()> {
        self.inner
            .items
            .write()
            .sort_by_cached_key(|item| item.to_string());
        self.notify(ListOp::Sort)
    }

    /// Sort with a comparator.
    pub fn sort_by<F>(&self, compare: F) -> Result<()>
    where
        F: FnMut(&Value, &Value) -> std::cmp::Ordering,
    {
        self.inner.items.write().sort_by(compare);
        self.notify(ListOp::Sort)
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.items.write().clear();
        self.notify(ListOp::Clear)
    }

    /// Notify watchers without changing the list.
    pub fn refresh(&self) -> Result<()> {
        self.notify(ListOp::Refresh)
    }

    /// Overwrite the item at `index` in place, returning the old item.
    ///
    /// Does not notify watchers.
    pub fn replace_at(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let mut items = self.inner.items.write();
        items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    fn notify(&self, op: ListOp) -> Result<()> {
        let watchers: Vec<ListWatcher> = self.inner.watchers.lock().values().cloned().collect();
        tracing::trace!(
            target: targets::LIST,
            list = ?self.inner.id,
            ?op,
            watchers = watchers.len(),
            "list mutated"
        );
        let mut first_error = None;
        for watcher in watchers {
            if let Err(err) = watcher(self, op) {
                tracing::warn!(target: targets::LIST, list = ?self.inner.id, ?op, %err, "list watcher failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for ObservableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("id", &self.inner.id)
            .field("len", &self.len())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}
