//! Platform abstraction traits for editor operations.
//!
//! These traits define the interface between the editor logic and
//! platform-specific implementations (browser DOM, test doubles). The core
//! never touches a native node; it hands the platform the element tree and
//! range and gets ranges and clipboard payloads back.

use crate::document::Editor;
use crate::types::Range;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Platform-specific selection handling.
///
/// The browser implementation maps points to native (node, UTF-16 offset)
/// pairs through the Selection API.
pub trait SelectionPlatform {
    /// Show the editor's range (or clear the native selection without one).
    fn apply_range(&self, editor: &Editor) -> Result<(), PlatformError>;

    /// Read the native selection back as a range over the editor's tree.
    ///
    /// Returns `Ok(None)` when the selection lies outside the editor.
    fn read_range(&self, editor: &Editor) -> Result<Option<Range>, PlatformError>;
}

/// Platform clipboard access.
///
/// Writes carry both representations; reads prefer HTML so pasted
/// formatting survives.
pub trait ClipboardPlatform {
    /// Write HTML with a plain-text fallback.
    fn write_html(&self, html: &str, plain_text: &str);

    /// Read HTML, if the clipboard has any.
    fn read_html(&self) -> Option<String>;

    /// Read plain text, if the clipboard has any.
    fn read_text(&self) -> Option<String>;
}
