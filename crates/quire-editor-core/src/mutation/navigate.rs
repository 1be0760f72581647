//! Caret navigation over sibling lists.
//!
//! The element variants walk sibling lists (skipping empty elements) and
//! climb to the parent when a list runs out. The point variants descend from
//! there to the nearest caret-host leaf.

use crate::element::NodeId;
use crate::tree::Tree;
use crate::types::Point;

/// The previous non-empty element, climbing parents when needed.
pub fn get_previous_element(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    loop {
        let siblings = tree.siblings(current);
        let index = tree.index_in_parent(current)?;
        let found = siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|s| !tree.is_empty(*s));
        if found.is_some() {
            return found;
        }
        current = tree[current].parent()?;
    }
}

/// The next non-empty element, climbing parents when needed.
pub fn get_next_element(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    loop {
        let siblings = tree.siblings(current);
        let index = tree.index_in_parent(current)?;
        let found = siblings[index + 1..]
            .iter()
            .copied()
            .find(|s| !tree.is_empty(*s));
        if found.is_some() {
            return found;
        }
        current = tree[current].parent()?;
    }
}

/// Nearest caret-host leaf before the point's element.
pub fn get_previous_element_of_point(tree: &Tree, point: &Point) -> Option<NodeId> {
    let mut current = point.element;
    loop {
        let previous = get_previous_element(tree, current)?;
        if let Some(leaf) = tree.caret_leaves(previous).last() {
            return Some(*leaf);
        }
        current = previous;
    }
}

/// Nearest caret-host leaf after the point's element.
pub fn get_next_element_of_point(tree: &Tree, point: &Point) -> Option<NodeId> {
    let mut current = point.element;
    loop {
        let next = get_next_element(tree, current)?;
        if let Some(leaf) = tree.caret_leaves(next).first() {
            return Some(*leaf);
        }
        current = next;
    }
}

/// Previous caret-host leaf that stays inside `scope`.
pub(crate) fn previous_leaf_within(tree: &Tree, leaf: NodeId, scope: NodeId) -> Option<NodeId> {
    get_previous_element_of_point(tree, &Point { element: leaf, offset: 0 })
        .filter(|found| tree.is_contains(scope, *found))
}
