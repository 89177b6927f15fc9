//! In-memory markup tree for Horizon Bind.
//!
//! This crate provides the hosting document the binding engine works on:
//!
//! - **Tree**: Arena-based storage with stable [`NodeId`]s, parent/child
//!   links, attributes, text, deep cloning and in-place replacement
//! - **Document**: A shared, thread-safe handle over a [`Tree`]
//! - **Materializer**: Parses a markup string into a single node
//! - **Serializer**: Renders a subtree back to markup
//!
//! # Example
//!
//! ```
//! use horizon_bind_markup::Document;
//!
//! let doc = Document::parse(r#"<ul><li id="first">one</li></ul>"#).unwrap();
//! let li = doc.find_by_id("first").unwrap();
//! doc.set_text(li, "uno").unwrap();
//! assert_eq!(doc.outer_markup(doc.root()).unwrap(), r#"<ul><li id="first">uno</li></ul>"#);
//!
//! let span = doc.materialize("<span>z</span>", true).unwrap();
//! doc.replace_with(li, span).unwrap();
//! assert_eq!(doc.inner_markup(doc.root()).unwrap(), "<ul><span>z</span></ul>");
//! ```

mod document;
mod error;
mod node;
mod parse;
mod serialize;
mod tree;

pub use document::Document;
pub use error::{MarkupError, MarkupResult};
pub use node::{is_void_element, NodeId, NodeKind, EDITABLE_ELEMENTS, VOID_ELEMENTS};
pub use tree::{Tree, HIDDEN_ATTRIBUTE, VALUE_ATTRIBUTE};
