//! Structural editing operations.
//!
//! Operations are methods on [`Editor`]. Each public one wraps an `*_inner`
//! variant in a transaction; the inner variants compose freely (a selection
//! insert is a range delete followed by the collapsed insert). A
//! non-collapsed range is always deleted first.

mod delete;
mod insert;
mod navigate;
mod selection;
mod style;

pub use navigate::{
    get_next_element, get_next_element_of_point, get_previous_element,
    get_previous_element_of_point,
};
pub use selection::{RangeItem, get_elements_by_range};

pub(crate) use delete::delete_span;
pub(crate) use navigate::previous_leaf_within;
pub(crate) use selection::{split_text, split_texts_by_range};

use crate::config::PLACEHOLDER;
use crate::document::Editor;
use crate::element::{ElementKind, NodeId};
use crate::error::{EditorError, Result};
use crate::tree::Tree;
use crate::types::{Point, Range};

/// Where a caret sits relative to the content of its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Edge {
    Start,
    End,
    Middle,
}

/// True when a leaf has visible content between two offsets. Placeholders
/// and line breaks don't count.
fn has_content(tree: &Tree, leaf: NodeId, from: usize, to: usize) -> bool {
    match tree[leaf].kind() {
        ElementKind::Text => tree[leaf]
            .text()
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .any(|c| c != PLACEHOLDER),
        ElementKind::Closed => from == 0 && to >= 1 && !tree.is_break(leaf),
        ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => false,
    }
}

/// Classify `point` against the caret hosts of `container`.
pub(crate) fn caret_edge(tree: &Tree, container: NodeId, point: &Point) -> Edge {
    let leaves = tree.caret_leaves(container);
    let Some(index) = leaves.iter().position(|l| *l == point.element) else {
        return Edge::End;
    };
    let whole = |leaf: &NodeId| has_content(tree, *leaf, 0, tree.leaf_len(*leaf));

    let before = leaves[..index].iter().any(whole)
        || has_content(tree, point.element, 0, point.offset);
    if !before {
        return Edge::Start;
    }
    let after = leaves[index + 1..].iter().any(whole)
        || has_content(tree, point.element, point.offset, tree.leaf_len(point.element));
    if after { Edge::Middle } else { Edge::End }
}

/// True when the element or an enclosing container is preformatted, by tag
/// or by a `white-space: pre*` style.
pub(crate) fn is_preformatted(tree: &Tree, id: NodeId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .filter(|n| matches!(tree[*n].kind(), ElementKind::Block | ElementKind::Inblock { .. }))
        .any(|n| {
            tree.config().is_pre_tag(tree[n].tag())
                || tree[n]
                    .style("white-space")
                    .is_some_and(|v| v.trim_start().starts_with("pre"))
        })
}

/// True when the only caret host of `container` is a line break.
pub(crate) fn holds_only_break(tree: &Tree, container: NodeId) -> bool {
    matches!(tree.caret_leaves(container).as_slice(), [only] if tree.is_break(*only))
}

impl Editor {
    pub(crate) fn set_caret(&mut self, point: Point) {
        self.range = Some(Range::collapsed(point));
    }

    pub(crate) fn ensure_attached(&self, point: &Point) -> Result<()> {
        if self.tree.contains_node(point.element) && self.tree.is_attached(point.element) {
            Ok(())
        } else {
            Err(EditorError::contract(format!(
                "range endpoint {:?} is not attached",
                point.element
            )))
        }
    }

    pub(crate) fn container_of(&self, id: NodeId) -> Result<NodeId> {
        self.tree.get_container(id).ok_or_else(|| {
            EditorError::structure(format!(
                "element {} has no enclosing container",
                self.tree[id].key()
            ))
        })
    }

    /// The caret after deleting any selection, or `None` without a range.
    pub(crate) fn collapsed_point(&mut self) -> Result<Option<Point>> {
        let Some(range) = self.range else {
            return Ok(None);
        };
        self.ensure_attached(&range.anchor)?;
        self.ensure_attached(&range.focus)?;
        if !range.is_collapsed() {
            self.delete_range(range)?;
        }
        Ok(self.range.map(|r| r.focus))
    }

    /// Move a caret that rests on an empty, detached or non-host element to
    /// the nearest caret host: forward then backward, first inside the
    /// enclosing inblock, then the block, then the whole document.
    pub(crate) fn settle_caret(&mut self) {
        let Some(range) = self.range else {
            return;
        };
        let point = range.focus;
        let tree = &self.tree;
        if tree.contains_node(point.element)
            && tree.is_attached(point.element)
            && tree.is_caret_host(point.element)
        {
            let offset = point.offset.min(tree.leaf_len(point.element));
            self.set_caret(Point {
                element: point.element,
                offset,
            });
            return;
        }
        if let Some(found) = self.relocation_for(point.element) {
            tracing::trace!(target: "quire::mutation", "relocated caret");
            self.set_caret(found);
        }
    }

    fn relocation_for(&self, from: NodeId) -> Option<Point> {
        let tree = &self.tree;
        if !tree.contains_node(from) || !tree.is_attached(from) {
            let first = *tree.stack().first()?;
            return Point::start_of(tree, first).ok();
        }
        let order = tree.document_order();
        let position = order.iter().position(|n| *n == from)?;

        let mut scopes = Vec::new();
        if let Some(inblock) = tree.get_inblock(from) {
            scopes.push(Some(inblock));
        }
        if let Some(block) = tree.get_block(from) {
            scopes.push(Some(block));
        }
        scopes.push(None);

        for scope in scopes {
            let within = |n: &&NodeId| {
                tree.is_caret_host(**n) && scope.is_none_or(|s| tree.is_contains(s, **n))
            };
            if let Some(next) = order[position + 1..].iter().find(within) {
                return Some(Point {
                    element: *next,
                    offset: 0,
                });
            }
            if let Some(previous) = order[..position].iter().rev().find(within) {
                return Some(Point {
                    element: *previous,
                    offset: tree.leaf_len(*previous),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<p>\u{FEFF}ab<br></p>` → `[p, placeholder, ab, br]`
    fn sample() -> (Tree, [NodeId; 4]) {
        let mut tree = Tree::default();
        let p = tree.create(ElementKind::Block, "p");
        let space = tree.create_text(PLACEHOLDER.to_string());
        let ab = tree.create_text("ab");
        let br = tree.create_break();
        tree.push_block(p).unwrap();
        for child in [space, ab, br] {
            tree.append_child(p, child).unwrap();
        }
        (tree, [p, space, ab, br])
    }

    #[test]
    fn test_caret_edges_ignore_placeholders_and_breaks() {
        let (tree, [p, space, ab, br]) = sample();
        let at = |element, offset| Point { element, offset };
        assert_eq!(caret_edge(&tree, p, &at(space, 1)), Edge::Start);
        assert_eq!(caret_edge(&tree, p, &at(ab, 0)), Edge::Start);
        assert_eq!(caret_edge(&tree, p, &at(ab, 1)), Edge::Middle);
        assert_eq!(caret_edge(&tree, p, &at(ab, 2)), Edge::End);
        assert_eq!(caret_edge(&tree, p, &at(br, 0)), Edge::End);
    }

    #[test]
    fn test_preformatted_detection() {
        let mut tree = Tree::default();
        let pre = tree.create(ElementKind::Block, "pre");
        let code = tree.create(ElementKind::Inline, "code");
        let text = tree.create_text("x");
        tree.push_block(pre).unwrap();
        tree.append_child(pre, code).unwrap();
        tree.append_child(code, text).unwrap();
        assert!(is_preformatted(&tree, text));

        let div = tree.create(ElementKind::Block, "div");
        tree.set_style(div, "white-space", "pre-wrap");
        let other = tree.create_text("y");
        tree.push_block(div).unwrap();
        tree.append_child(div, other).unwrap();
        assert!(is_preformatted(&tree, other));

        let (tree, [_, _, ab, _]) = sample();
        assert!(!is_preformatted(&tree, ab));
    }

    #[test]
    fn test_holds_only_break() {
        let mut tree = Tree::default();
        let p = tree.create_empty_paragraph();
        tree.push_block(p).unwrap();
        assert!(holds_only_break(&tree, p));
        let (tree, [p, ..]) = sample();
        assert!(!holds_only_break(&tree, p));
    }
}
