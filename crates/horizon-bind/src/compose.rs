//! Nested-model bindings.
//!
//! A nested-model declaration binds a subtree to a child model held in a
//! property of the enclosing model. The property keeps its child model for
//! life: assigning a new model merges it into the retained one, so every
//! binding made inside the subtree keeps working.
//!
//! A merge first clears (sets to `""`) every key of the retained model that
//! the incoming model lacks, then copies every incoming key. When the
//! declaring node is a component, each change is mirrored onto the
//! component's own model instead of scanning the component's markup.

use horizon_bind_core::{Model, Result, StorePolicy, Value};
use horizon_bind_markup::NodeId;

use crate::binder::Binder;
use crate::logging::targets;
use crate::registry::BindingRecord;

impl Binder {
    /// Bind the nested-model declaration on `decl` to a property of `model`.
    pub fn bind_model(&self, decl: NodeId, model: &Model) -> Result<()> {
        let attribute = self.config().attribute("model");
        let Some(property) = self.document().attribute(decl, &attribute) else {
            return Ok(());
        };

        self.intercept(model, &property, StorePolicy::Retain, |existing| match existing {
            Some(child @ Value::Model(_)) => child,
            _ => Value::Model(Model::new()),
        });

        let record = BindingRecord::Model { root: decl };
        if self.register(model, &property, record).is_none() {
            return Ok(());
        }

        // A property first bound as a scalar may hold something else.
        let child = match model.value(&property) {
            Value::Model(child) => child,
            other => {
                tracing::warn!(
                    target: targets::COMPOSE,
                    property,
                    found = other.type_name(),
                    "nested-model property does not hold a model"
                );
                Model::new()
            }
        };
        tracing::debug!(target: targets::COMPOSE, model = ?model.id(), property, child = ?child.id(), root = ?decl, "nested model bound");

        if !self.is_component(decl) {
            self.bind_scope(decl, &child)?;
        }
        Ok(())
    }
}

/// Merge an assigned value into the retained child model.
///
/// A value that is not a model merges like an empty model.
pub(crate) fn merge(stored: &Value, incoming: &Value, mirrors: &[Model]) -> Result<()> {
    let Some(retained) = stored.as_model() else {
        return Ok(());
    };
    let incoming = incoming.as_model();
    let incoming_keys = incoming.map(Model::keys).unwrap_or_default();

    let mut cleared = 0;
    for key in retained.keys() {
        if incoming_keys.contains(&key) {
            continue;
        }
        retained.set(&key, "")?;
        for mirror in mirrors {
            mirror.set(&key, "")?;
        }
        cleared += 1;
    }

    if let Some(incoming) = incoming {
        for (key, value) in incoming.entries() {
            retained.set(&key, value.clone())?;
            for mirror in mirrors {
                mirror.set(&key, value.clone())?;
            }
        }
    }

    tracing::trace!(
        target: targets::COMPOSE,
        retained = ?retained.id(),
        cleared,
        copied = incoming_keys.len(),
        mirrors = mirrors.len(),
        "merged"
    );
    Ok(())
}
