//! Consumer hooks for parsing, merging and code highlighting.
//!
//! These traits abstract over external concerns:
//! - Highlighting preformatted code containers
//! - Adjusting elements as they come out of the HTML parser
//! - Replacing the default container merge
//!
//! Implementations are provided by the consuming application.

use crate::element::NodeId;
use crate::error::Result;
use crate::tree::Tree;

/// Syntax highlighter for preformatted code containers.
pub trait Highlighter {
    /// Highlight `code`, returning markup to be parsed back into the
    /// container, or `None` to leave it as it is.
    fn highlight(&self, code: &str, language: Option<&str>) -> Option<String>;
}

/// Unit type implementation - no highlighting.
impl Highlighter for () {
    fn highlight(&self, _code: &str, _language: Option<&str>) -> Option<String> {
        None
    }
}

/// Called for every element the HTML parser creates, after its children
/// are attached.
pub trait ParseHook {
    fn on_element(&self, tree: &mut Tree, id: NodeId);
}

/// Unit type implementation - elements are kept as parsed.
impl ParseHook for () {
    fn on_element(&self, _tree: &mut Tree, _id: NodeId) {}
}

/// Overrides the default merge of `target` into `previous`.
pub trait MergeHook {
    /// Return `None` to fall back to the default merge (appending the
    /// children of `target` to `previous`), or `Some` with the outcome of a
    /// custom merge. A custom merge that leaves `target` with children keeps
    /// it in the tree.
    fn merge(&self, tree: &mut Tree, target: NodeId, previous: NodeId) -> Option<Result<()>>;
}

/// Unit type implementation - always the default merge.
impl MergeHook for () {
    fn merge(&self, _tree: &mut Tree, _target: NodeId, _previous: NodeId) -> Option<Result<()>> {
        None
    }
}

impl<T: Highlighter + ?Sized> Highlighter for &T {
    fn highlight(&self, code: &str, language: Option<&str>) -> Option<String> {
        (**self).highlight(code, language)
    }
}

impl<T: ParseHook + ?Sized> ParseHook for &T {
    fn on_element(&self, tree: &mut Tree, id: NodeId) {
        (**self).on_element(tree, id)
    }
}

impl<T: MergeHook + ?Sized> MergeHook for &T {
    fn merge(&self, tree: &mut Tree, target: NodeId, previous: NodeId) -> Option<Result<()>> {
        (**self).merge(tree, target, previous)
    }
}

impl<T: Highlighter> Highlighter for Option<T> {
    fn highlight(&self, code: &str, language: Option<&str>) -> Option<String> {
        self.as_ref().and_then(|h| h.highlight(code, language))
    }
}

impl<T: ParseHook> ParseHook for Option<T> {
    fn on_element(&self, tree: &mut Tree, id: NodeId) {
        if let Some(hook) = self {
            hook.on_element(tree, id);
        }
    }
}

impl<T: MergeHook> MergeHook for Option<T> {
    fn merge(&self, tree: &mut Tree, target: NodeId, previous: NodeId) -> Option<Result<()>> {
        self.as_ref().and_then(|h| h.merge(tree, target, previous))
    }
}
