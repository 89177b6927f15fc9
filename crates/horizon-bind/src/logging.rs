//! Logging and debugging facilities for Horizon Bind.
//!
//! This module provides:
//! - Target names for filtering the engine's `tracing` output
//! - Debug visualization for scope trees
//!
//! # Tracing Integration
//!
//! Horizon Bind uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_bind::repeat=debug,horizon_bind_core=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`ScopeTreeDebug`] to see which nodes a scan binds:
//!
//! ```
//! use horizon_bind::{Binder, BinderConfig};
//! use horizon_bind::logging::ScopeTreeDebug;
//!
//! let binder = Binder::from_markup(
//!     r#"<ul id="list"><li bind-repeat="items"><span bind-value="name"></span></li></ul>"#,
//!     BinderConfig::default(),
//! ).unwrap();
//! let root = binder.document().root();
//! let output = ScopeTreeDebug::new(&binder).format(root).unwrap();
//! assert!(output.contains("<li> bind-repeat=\"items\""));
//! ```

use std::fmt::Write as FmtWrite;

use horizon_bind_core::Result;
use horizon_bind_markup::{NodeId, NodeKind};

use crate::binder::Binder;
use crate::scope::{Owner, ScopeEntry};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Binder lifecycle, components and edits.
    pub const BINDER: &str = "horizon_bind::binder";
    /// Scope scanning.
    pub const SCOPE: &str = "horizon_bind::scope";
    /// Scalar update dispatch.
    pub const DISPATCH: &str = "horizon_bind::dispatch";
    /// Repeat bindings and reconciliation.
    pub const REPEAT: &str = "horizon_bind::repeat";
    /// Nested-model composition.
    pub const COMPOSE: &str = "horizon_bind::compose";
    /// Readiness signal.
    pub const READY: &str = "horizon_bind::ready";
    /// Binding registry maintenance.
    pub const REGISTRY: &str = "horizon_bind::registry";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for scope tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to list nodes owned by nested scopes.
    pub show_nested: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_nested: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Only the nodes the scanned scope owns.
    pub fn owned_only() -> Self {
        Self {
            show_nested: false,
            ..Default::default()
        }
    }
}

/// Renders the scope tree of a subtree, one line per element, with its
/// declarations and owner.
pub struct ScopeTreeDebug<'a> {
    binder: &'a Binder,
    options: TreeFormatOptions,
}

impl<'a> ScopeTreeDebug<'a> {
    pub fn new(binder: &'a Binder) -> Self {
        Self {
            binder,
            options: TreeFormatOptions::default(),
        }
    }

    pub fn with_options(binder: &'a Binder, options: TreeFormatOptions) -> Self {
        Self { binder, options }
    }

    /// Format the scope tree rooted at `root`.
    pub fn format(&self, root: NodeId) -> Result<String> {
        let scope = self.binder.scope_tree(root)?;
        let entries: Vec<&ScopeEntry> = scope
            .entries()
            .iter()
            .filter(|entry| self.options.show_nested || entry.owner == Owner::Current)
            .filter(|entry| self.options.max_depth.is_none_or(|max| entry.depth <= max))
            .collect();

        let document = self.binder.document();
        let mut output = String::new();
        let _ = writeln!(output, "Scope ({} nodes):", scope.len());

        for (i, entry) in entries.iter().enumerate() {
            let NodeKind::Element { tag, attributes } = document.kind(entry.node)? else {
                continue;
            };
            let is_last = !entries[i + 1..]
                .iter()
                .take_while(|next| next.depth >= entry.depth)
                .any(|next| next.depth == entry.depth);

            output.push_str(&self.prefix(entry.depth, is_last));
            let _ = write!(output, "<{tag}>");
            for (name, value) in &attributes {
                if self.binder.config().declaration_kind(name).is_some() {
                    let _ = write!(output, " {name}=\"{value}\"");
                }
            }
            if self.options.show_ids {
                let _ = write!(output, " [{:?}]", entry.node);
            }
            if let Owner::Nested(opener) = entry.owner {
                let _ = write!(output, " (nested in {opener:?})");
            }
            output.push('\n');
        }
        Ok(output)
    }

    fn prefix(&self, depth: usize, is_last: bool) -> String {
        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        };
        let mut prefix = branch.repeat(depth.saturating_sub(1));
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinderConfig;

    fn binder(markup: &str) -> Binder {
        Binder::from_markup(markup, BinderConfig::default()).unwrap()
    }

    #[test]
    fn marks_nested_nodes() {
        let binder = binder(r#"<div bind-model="child"><p bind-value="x"></p></div>"#);
        let root = binder.document().root();
        let output = ScopeTreeDebug::new(&binder).format(root).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("<div> bind-model=\"child\""));
        assert!(lines[2].contains("<p> bind-value=\"x\""));
        assert!(lines[2].contains("nested in"));
    }

    #[test]
    fn owned_only_hides_nested() {
        let binder = binder(r#"<div bind-model="child"><p bind-value="x"></p></div><span bind-append="y"></span>"#);
        let root = binder.document().root();
        let output = ScopeTreeDebug::with_options(&binder, TreeFormatOptions::owned_only())
            .format(root)
            .unwrap();
        assert!(!output.contains("<p>"));
        assert!(output.contains("<span> bind-append=\"y\""));
    }

    #[test]
    fn ascii_connectors() {
        let binder = binder(r#"<ul><li></li><li></li></ul>"#);
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        let output = ScopeTreeDebug::with_options(&binder, options)
            .format(binder.document().root())
            .unwrap();
        assert_eq!(output, "Scope (3 nodes):\n`-- <ul>\n|   +-- <li>\n|   `-- <li>\n");
    }
}
