//! Update dispatchers for scalar bindings.
//!
//! Each scalar binding renders its property into one target node:
//!
//! | Kind | Editable control | Any other node |
//! |---|---|---|
//! | `value` | edit value := text | display text := text |
//! | `append` | edit value += text | display text += text |
//! | `replace` | node is swapped for the value | same |
//!
//! A `replace` value that is not already a node is materialized from markup;
//! only the first top-level node is kept. The binding then follows the new
//! node, so the next write replaces it in turn.

use std::fmt;

use horizon_bind_core::{Model, Result, StorePolicy, Value};
use horizon_bind_markup::{Document, MarkupResult, NodeId};

use crate::binder::Binder;
use crate::logging::targets;
use crate::registry::{BindingId, BindingRecord};

/// The rendering strategy of a scalar binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    Replace,
    Value,
    Append,
}

impl RenderKind {
    /// Every scalar kind.
    pub const ALL: [RenderKind; 3] = [Self::Replace, Self::Value, Self::Append];

    /// Parse a declaration kind. Unknown kinds yield `None`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "replace" => Some(Self::Replace),
            "value" => Some(Self::Value),
            "append" => Some(Self::Append),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Value => "value",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for RenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `value` into `target`, returning the node the binding now targets.
pub(crate) fn render(
    document: &Document,
    kind: RenderKind,
    target: NodeId,
    value: &Value,
    trim: bool,
) -> MarkupResult<NodeId> {
    match kind {
        RenderKind::Value => {
            set_content(document, target, value.to_string())?;
            Ok(target)
        }
        RenderKind::Append => {
            let current = if document.is_editable(target) {
                document.edit_value(target)
            } else {
                document.text(target)?
            };
            set_content(document, target, format!("{current}{value}"))?;
            Ok(target)
        }
        RenderKind::Replace => {
            let replacement = match value {
                Value::Node(node) => *node,
                other => document.materialize(&other.to_string(), trim)?,
            };
            document.replace_with(target, replacement)?;
            Ok(replacement)
        }
    }
}

fn set_content(document: &Document, target: NodeId, text: String) -> MarkupResult<()> {
    if document.is_editable(target) {
        document.set_edit_value(target, text)
    } else {
        document.set_text(target, text)
    }
}

impl Binder {
    /// Bind `property` of `model` to `target` with the given rendering.
    ///
    /// Intercepts the property on first use. When the property already holds
    /// a truthy value, it is rendered into the new binding only. Binding the
    /// same property, target and kind twice does nothing.
    pub fn bind_property(
        &self,
        property: &str,
        target: NodeId,
        model: &Model,
        kind: RenderKind,
    ) -> Result<()> {
        self.intercept(model, property, StorePolicy::Replace, |existing| {
            existing.unwrap_or_default()
        });

        let record = BindingRecord::Value { kind, target };
        let Some(id) = self.register(model, property, record) else {
            return Ok(());
        };
        tracing::debug!(target: targets::DISPATCH, model = ?model.id(), property, %kind, ?target, "scalar binding registered");

        let current = model.value(property);
        if current.is_truthy() {
            self.dispatch(id, kind, target, &current)?;
        }
        Ok(())
    }

    /// Render a value through one scalar record and follow any retarget.
    pub(crate) fn dispatch(
        &self,
        id: BindingId,
        kind: RenderKind,
        target: NodeId,
        value: &Value,
    ) -> Result<()> {
        tracing::trace!(target: targets::DISPATCH, %kind, ?target, value = value.type_name(), "dispatch");
        let new_target = render(self.document(), kind, target, value, self.config().trim_markup)?;
        if new_target != target {
            self.registry_mut().retarget(id, new_target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(markup: &str) -> (Document, NodeId) {
        let doc = Document::parse(markup).unwrap();
        let target = doc.find_by_id("t").unwrap();
        (doc, target)
    }

    #[test]
    fn parse_kinds() {
        assert_eq!(RenderKind::parse("append"), Some(RenderKind::Append));
        assert_eq!(RenderKind::parse("repeat"), None);
        assert_eq!(RenderKind::parse("bogus"), None);
        for kind in RenderKind::ALL {
            assert_eq!(RenderKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn value_sets_text_or_edit_value() {
        let (doc, target) = doc_with(r#"<p id="t">old <b>bold</b></p>"#);
        render(&doc, RenderKind::Value, target, &Value::from(42), true).unwrap();
        assert_eq!(doc.inner_markup(target).unwrap(), "42");

        let (doc, input) = doc_with(r#"<input id="t" value="x">"#);
        render(&doc, RenderKind::Value, input, &Value::from("y"), true).unwrap();
        assert_eq!(doc.edit_value(input), "y");
    }

    #[test]
    fn append_concatenates() {
        let (doc, target) = doc_with(r#"<p id="t">a</p>"#);
        render(&doc, RenderKind::Append, target, &Value::from("b"), true).unwrap();
        render(&doc, RenderKind::Append, target, &Value::from(1), true).unwrap();
        assert_eq!(doc.text(target).unwrap(), "ab1");

        let (doc, input) = doc_with(r#"<textarea id="t" value="x"></textarea>"#);
        render(&doc, RenderKind::Append, input, &Value::from("y"), true).unwrap();
        assert_eq!(doc.edit_value(input), "xy");
    }

    #[test]
    fn replace_materializes_first_node() {
        let (doc, target) = doc_with(r#"<div><p id="t">x</p></div>"#);
        let new_target = render(
            &doc,
            RenderKind::Replace,
            target,
            &Value::from("  <span>z</span><i>dropped</i> "),
            true,
        )
        .unwrap();
        assert_ne!(new_target, target);
        assert_eq!(doc.inner_markup(doc.root()).unwrap(), "<div><span>z</span></div>");
        assert!(!doc.is_connected(target));
    }

    #[test]
    fn replace_accepts_nodes() {
        let (doc, target) = doc_with(r#"<div><p id="t">x</p></div>"#);
        let node = doc.create_element("hr");
        let new_target = render(&doc, RenderKind::Replace, target, &Value::Node(node), true).unwrap();
        assert_eq!(new_target, node);
        assert_eq!(doc.inner_markup(doc.root()).unwrap(), "<div><hr/></div>");
    }

    #[test]
    fn replace_with_empty_markup_fails() {
        let (doc, target) = doc_with(r#"<p id="t"></p>"#);
        assert!(render(&doc, RenderKind::Replace, target, &Value::from("   "), true).is_err());
    }
}
