//! Error types for editor operations.

use thiserror::Error;

/// Errors raised by tree, range and editing operations.
///
/// Soft conditions (disabled editor, missing range, empty incoming element)
/// are not errors: the operation returns `Ok(())` without touching the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// Argument of the wrong shape, e.g. a detached node where an attached
    /// one is required, or an offset past the end of a leaf.
    #[error("contract violation: {0}")]
    Contract(String),

    /// The requested structure cannot exist, e.g. a caret on an empty or
    /// void element, or a merge between non-container elements.
    #[error("structural error: {0}")]
    Structure(String),

    /// HTML input could not be turned into elements.
    #[error("parse error: {0}")]
    Parse(String),
}

impl EditorError {
    pub(crate) fn contract(msg: impl Into<String>) -> Self {
        EditorError::Contract(msg.into())
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        EditorError::Structure(msg.into())
    }
}

/// Result alias for editor operations.
pub type Result<T, E = EditorError> = std::result::Result<T, E>;
