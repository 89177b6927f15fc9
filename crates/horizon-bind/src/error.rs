//! Error types for the binding engine.
//!
//! Binding entry points return the core [`Result`](horizon_bind_core::Result):
//! they run inside property write hooks, so their errors must flow back
//! through [`Model::set`](horizon_bind_core::Model::set) unchanged.
//! [`BindError`] covers what happens before any binding exists: loading
//! configuration and building the document.

use horizon_bind_core::Error;
use horizon_bind_markup::MarkupError;

/// Errors raised while setting up a binder.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A binding operation failed.
    #[error(transparent)]
    Core(#[from] Error),

    /// The configuration could not be parsed.
    #[error("Invalid binder configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<MarkupError> for BindError {
    fn from(err: MarkupError) -> Self {
        Self::Core(Error::Markup(err))
    }
}

/// A specialized Result type for binder setup.
pub type BindResult<T> = std::result::Result<T, BindError>;
