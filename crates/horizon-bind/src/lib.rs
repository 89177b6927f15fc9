//! Declarative two-way data binding for Horizon Bind.
//!
//! Markup declares what it shows with prefixed attributes; a [`Binder`]
//! connects those declarations to [`Model`] properties. After one scan,
//! updates are push-driven: assigning a bound property renders it
//! immediately, and structural changes to a bound list reconcile the
//! repeated markup.
//!
//! | Declaration | Effect |
//! |---|---|
//! | `bind-value="p"` | text (or edit value) of the node is `p` |
//! | `bind-append="p"` | `p` is appended to the node's text |
//! | `bind-replace="p"` | the node is replaced by the markup in `p` |
//! | `bind-repeat="p"` | the node is a hidden template repeated per element of `p` |
//! | `bind-model="p"` | the subtree is bound to the child model `p` |
//!
//! # Example
//!
//! ```
//! use horizon_bind::{Binder, BinderConfig, Model, ObservableList};
//!
//! let binder = Binder::from_markup(
//!     r#"<section>
//!         <h1 bind-value="title"></h1>
//!         <ul><li bind-repeat="todos"><span bind-value="text"></span></li></ul>
//!     </section>"#,
//!     BinderConfig::default(),
//! ).unwrap();
//!
//! let todos = ObservableList::from_values([Model::new().with("text", "write docs")]);
//! let model = Model::new().with("title", "Today").with("todos", todos.clone());
//! binder.bind_scope(binder.document().root(), &model).unwrap();
//!
//! todos.push(Model::new().with("text", "ship")).unwrap();
//! model.set("title", "Tomorrow").unwrap();
//!
//! let doc = binder.document();
//! assert_eq!(doc.text(doc.root()).unwrap(), "Tomorrowwrite docsship");
//! ```

mod binder;
mod component;
mod compose;
mod config;
mod dispatch;
mod error;
pub mod logging;
mod ready;
mod registry;
mod repeat;
mod scope;

pub use binder::Binder;
pub use component::Component;
pub use config::{BinderConfig, DEFAULT_PREFIX};
pub use dispatch::RenderKind;
pub use error::{BindError, BindResult};
pub use logging::{ScopeTreeDebug, TreeFormatOptions, TreeStyle};
pub use ready::ReadySignal;
pub use registry::BindingId;
pub use scope::{NodeRole, Owner, ScopeEntry, ScopeTree};

pub use horizon_bind_core::{
    Error, IntoModel, ListOp, Model, ModelId, ObservableList, Result, StorePolicy, Value,
};
pub use horizon_bind_markup::{Document, MarkupError, NodeId};
