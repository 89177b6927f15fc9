//! Binder configuration.
//!
//! ```
//! use horizon_bind::BinderConfig;
//!
//! let config = BinderConfig::from_toml_str(r#"
//! prefix = "data-bind-"
//! strict_scopes = true
//! "#).unwrap();
//! assert_eq!(config.attribute("value"), "data-bind-value");
//! assert!(config.trim_markup);
//! ```

use serde::Deserialize;

use crate::error::BindResult;

/// Default declaration prefix.
pub const DEFAULT_PREFIX: &str = "bind-";

/// Configuration for a [`Binder`](crate::Binder).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Attribute prefix shared by every declaration (`bind-value`, ...).
    pub prefix: String,
    /// Apply scope ownership to repeat and nested-model declarations too.
    ///
    /// Off by default: a scope scan picks up every repeat and nested-model
    /// declaration in its subtree, however deeply nested. Scalar
    /// declarations are always limited to the scope that owns them.
    pub strict_scopes: bool,
    /// Trim surrounding whitespace from markup before materializing it.
    pub trim_markup: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            strict_scopes: false,
            trim_markup: true,
        }
    }
}

impl BinderConfig {
    /// Load a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> BindResult<Self> {
        let config: Self = toml::from_str(source)?;
        tracing::debug!(target: crate::logging::targets::BINDER, ?config, "loaded binder configuration");
        Ok(config)
    }

    /// Set the declaration prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable or disable strict scope ownership.
    pub fn with_strict_scopes(mut self, strict: bool) -> Self {
        self.strict_scopes = strict;
        self
    }

    /// Enable or disable markup trimming.
    pub fn with_trim_markup(mut self, trim: bool) -> Self {
        self.trim_markup = trim;
        self
    }

    /// The full attribute name for a declaration kind.
    pub fn attribute(&self, kind: &str) -> String {
        format!("{}{}", self.prefix, kind)
    }

    /// The declaration kind named by an attribute, if it carries the prefix.
    pub fn declaration_kind<'a>(&self, attribute: &'a str) -> Option<&'a str> {
        attribute
            .strip_prefix(self.prefix.as_str())
            .filter(|kind| !kind.is_empty())
    }
}
