//! Error types for Horizon Bind.

use horizon_bind_markup::MarkupError;

/// The main error type for binding operations.
///
/// Declaration misuse never produces an error: unknown binding kinds and
/// mistyped values degrade to "nothing rendered". What does surface is markup
/// that cannot be materialized and misuse of the model API itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Markup could not be materialized or a node operation failed.
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Property-related error.
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),
}

/// Property-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property is intercepted and cannot be redefined or removed.
    #[error("Property '{name}' is bound and cannot be redefined")]
    Intercepted {
        /// The name of the intercepted property.
        name: String,
    },
}

/// A specialized Result type for binding operations.
pub type Result<T> = std::result::Result<T, Error>;
