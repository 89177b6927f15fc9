//! Error types for the markup tree.

/// Result type alias for markup operations.
pub type MarkupResult<T> = std::result::Result<T, MarkupError>;

/// Errors that can occur while building, editing or parsing markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    /// The markup produced no node at all.
    #[error("Markup is empty")]
    Empty,

    /// The markup could not be parsed.
    #[error("Malformed markup at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The node ID is invalid or the node has been destroyed.
    #[error("Invalid or destroyed node ID")]
    InvalidNode,

    /// Attempted to insert a node into its own subtree.
    #[error("Cannot insert a node into its own subtree")]
    CircularInsertion,

    /// The operation needs an element but got another node kind.
    #[error("Node is not an element")]
    NotAnElement,
}

impl MarkupError {
    /// Create a parse error.
    pub fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}
