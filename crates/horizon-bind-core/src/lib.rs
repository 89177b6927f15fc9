//! Core systems for Horizon Bind.
//!
//! This crate provides the data side of the binding engine:
//!
//! - **Values**: [`Value`], the dynamic type carried by model properties
//! - **Models**: [`Model`], a shared handle to named fields with a stable
//!   [`ModelId`]
//! - **Observable Fields**: [`ObservableField`], installed by
//!   [`Model::observe`] to intercept writes to a property
//! - **Observable Lists**: [`ObservableList`], whose structural mutations
//!   notify watchers
//! - **Signal/Slot System**: [`Signal`], the change subscribers of a field
//!
//! # Example
//!
//! ```
//! use horizon_bind_core::{Model, ObservableList, StorePolicy, Value};
//!
//! let todos = ObservableList::from_values(["write docs"]);
//! let model = Model::new().with("todos", todos.clone());
//!
//! model.observe("todos", |v| v.unwrap_or_default(), StorePolicy::Replace, |event| {
//!     println!("{} now holds {}", event.name, event.stored);
//!     Ok(())
//! });
//!
//! todos.watch(|list, op| {
//!     println!("{op:?}: {} items", list.len());
//!     Ok(())
//! });
//! todos.push("ship it").unwrap();
//! assert_eq!(model.value("todos"), Value::from(todos));
//! ```

mod error;
mod field;
mod list;
pub mod logging;
mod model;
pub mod property;
pub mod signal;
mod value;

pub use error::{Error, PropertyError, Result};
pub use field::{ObservableField, StorePolicy, WriteEvent, WriteHook};
pub use list::{ListId, ListOp, ListWatcher, ObservableList, WatchId};
pub use model::{IntoModel, Model, ModelId, WeakModel};
pub use property::{Property, ReadOnlyProperty};
pub use signal::{ConnectionId, Signal};
pub use value::Value;

static_assertions::assert_impl_all!(Model: Send, Sync);
static_assertions::assert_impl_all!(ObservableList: Send, Sync);
static_assertions::assert_impl_all!(Value: Send, Sync);
static_assertions::assert_impl_all!(ObservableField: Send, Sync);
