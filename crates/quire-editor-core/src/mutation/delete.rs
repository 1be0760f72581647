//! Backspace, forward delete, range delete and container merge.

use crate::config::PLACEHOLDER;
use crate::document::{Editor, EditorEvent};
use crate::element::{ElementKind, NodeId};
use crate::error::{EditorError, Result};
use crate::mutation::navigate::{get_next_element_of_point, get_previous_element_of_point};
use crate::mutation::{get_elements_by_range, previous_leaf_within};
use crate::text_helpers::remove_range;
use crate::tree::Tree;
use crate::types::{Point, Range};

/// Clear everything between two points. Whole elements are emptied in place
/// (the formatting pass prunes them); partially covered texts lose the
/// covered characters.
pub(crate) fn delete_span(tree: &mut Tree, start: &Point, end: &Point) {
    for item in get_elements_by_range(tree, start, end) {
        match item.offsets {
            None => tree.to_empty(item.element),
            Some((from, to)) => match tree[item.element].kind() {
                ElementKind::Text => {
                    remove_range(&mut tree[item.element].text, from..to);
                }
                ElementKind::Closed => {
                    if from == 0 && to >= 1 {
                        tree.to_empty(item.element);
                    }
                }
                ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {}
            },
        }
    }
}

impl Editor {
    /// Delete the selection, or the character or structure before the caret.
    pub fn delete(&mut self) -> Result<()> {
        self.transact("delete", |ed| ed.delete_inner())
    }

    /// Delete the selection, or the character or structure after the caret.
    pub fn delete_forward(&mut self) -> Result<()> {
        self.transact("delete_forward", |ed| ed.delete_forward_inner())
    }

    /// Merge the container `target` into `previous`, appending its children
    /// unless a merge hook takes over.
    pub fn merge(&mut self, target: NodeId, previous: NodeId) -> Result<()> {
        self.transact("merge", |ed| {
            ed.merge_containers(target, previous)?;
            if ed.tree[target].children().is_empty() {
                ed.tree.detach(target);
            }
            ed.settle_caret();
            Ok(true)
        })
    }

    pub(crate) fn delete_inner(&mut self) -> Result<bool> {
        let Some(range) = self.range else {
            return Ok(false);
        };
        self.ensure_attached(&range.anchor)?;
        self.ensure_attached(&range.focus)?;
        if range.is_collapsed() {
            self.delete_backward(range.focus)
        } else {
            self.delete_range(range)
        }
    }

    fn delete_forward_inner(&mut self) -> Result<bool> {
        let Some(range) = self.range else {
            return Ok(false);
        };
        self.ensure_attached(&range.anchor)?;
        self.ensure_attached(&range.focus)?;
        if !range.is_collapsed() {
            return self.delete_range(range);
        }

        let point = range.focus;
        let target = if point.offset < self.tree.leaf_len(point.element) {
            Point {
                element: point.element,
                offset: point.offset + 1,
            }
        } else {
            let Some(next) = get_next_element_of_point(&self.tree, &point) else {
                return Ok(false);
            };
            let same_container = self.tree.get_container(next) == self.tree.get_container(point.element);
            Point {
                element: next,
                offset: if same_container { 1 } else { 0 },
            }
        };
        self.set_caret(target);
        let changed = self.delete_backward(target)?;
        if !changed {
            self.set_caret(point);
        }
        Ok(changed)
    }

    /// Backspace at a collapsed caret.
    fn delete_backward(&mut self, point: Point) -> Result<bool> {
        if point.offset == 0 {
            return self.delete_at_start(point);
        }
        let leaf = point.element;
        let container = self.container_of(leaf)?;
        match self.tree[leaf].kind() {
            ElementKind::Text if self.tree.is_space_text(leaf) => {
                self.tree.to_empty(leaf);
                if !self.refill(container, leaf)? {
                    self.delete_at_start(Point {
                        element: leaf,
                        offset: 0,
                    })?;
                }
                Ok(true)
            }
            ElementKind::Text => {
                let removed = remove_range(&mut self.tree[leaf].text, point.offset - 1..point.offset);
                let caret = Point {
                    element: leaf,
                    offset: point.offset - 1,
                };
                self.set_caret(caret);
                // A placeholder has no width; keep going to the visible
                // character before it.
                if removed.starts_with(PLACEHOLDER) {
                    return self.delete_backward(caret).map(|_| true);
                }
                if !self.refill(container, leaf)? && self.tree[leaf].text().is_empty() {
                    self.settle_caret();
                }
                Ok(true)
            }
            ElementKind::Closed => {
                self.tree.to_empty(leaf);
                if !self.refill(container, leaf)? {
                    self.set_caret(Point {
                        element: leaf,
                        offset: 0,
                    });
                    self.settle_caret();
                }
                Ok(true)
            }
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                Err(EditorError::structure(format!(
                    "caret on {} element {}",
                    self.tree[leaf].kind().name(),
                    self.tree[leaf].key()
                )))
            }
        }
    }

    /// Give a container emptied by a delete a fresh line break after `at`
    /// and put the caret on it. Returns false when the container still has
    /// content.
    fn refill(&mut self, container: NodeId, at: NodeId) -> Result<bool> {
        if !self.tree.is_empty(container) {
            return Ok(false);
        }
        let br = self.tree.create_break();
        self.tree.insert_after(at, br)?;
        self.set_caret(Point {
            element: br,
            offset: 0,
        });
        Ok(true)
    }

    /// Backspace at offset 0.
    fn delete_at_start(&mut self, point: Point) -> Result<bool> {
        let leaf = point.element;
        let container = self.container_of(leaf)?;

        if let Some(previous) = previous_leaf_within(&self.tree, leaf, container) {
            let end = Point {
                element: previous,
                offset: self.tree.leaf_len(previous),
            };
            self.set_caret(end);
            return self.delete_backward(end);
        }

        let Some(previous) = get_previous_element_of_point(&self.tree, &point) else {
            tracing::debug!(target: "quire::mutation", "delete at document start");
            self.events.push(EditorEvent::DeleteInStart);
            return Ok(false);
        };
        let target = self.container_of(previous)?;
        if !self.tree[container].kind().behaves_as_block()
            || !self.tree[target].kind().behaves_as_block()
        {
            return Ok(false);
        }

        let end = Point {
            element: previous,
            offset: self.tree.leaf_len(previous),
        };
        if self.tree.is_contains(target, container) {
            self.unwrap_container(container)?;
        } else if self.tree.is_contains(container, target) {
            return Ok(false);
        } else {
            self.merge_containers(container, target)?;
            if self.tree[container].children().is_empty() {
                self.tree.detach(container);
            }
        }
        self.set_caret(end);
        Ok(true)
    }

    /// Delete a non-collapsed range.
    pub(crate) fn delete_range(&mut self, range: Range) -> Result<bool> {
        let (start, end) = range.ordered(&self.tree);
        let start_container = self.container_of(start.element)?;
        let end_container = self.container_of(end.element)?;

        delete_span(&mut self.tree, &start, &end);
        self.set_caret(start);

        if start_container != end_container && self.tree.is_attached(end_container) {
            if self.tree.is_contains(start_container, end_container) {
                self.unwrap_container(end_container)?;
            } else if self.tree[start_container].kind().behaves_as_block()
                && self.tree[end_container].kind().behaves_as_block()
                && !self.tree.is_contains(end_container, start_container)
            {
                self.merge_containers(end_container, start_container)?;
                if self.tree[end_container].children().is_empty() {
                    self.tree.detach(end_container);
                }
            }
        }

        for container in [start_container, end_container] {
            if self.tree.is_attached(container) && self.tree.is_empty(container) {
                let br = self.tree.create_break();
                self.tree.append_child(container, br)?;
            }
        }
        self.settle_caret();
        tracing::trace!(target: "quire::mutation", "deleted range");
        Ok(true)
    }

    /// Replace a container with its children.
    fn unwrap_container(&mut self, container: NodeId) -> Result<()> {
        for child in self.tree[container].children().to_vec() {
            self.tree.detach(child);
            self.tree.insert_before(container, child)?;
        }
        self.tree.detach(container);
        Ok(())
    }

    pub(crate) fn merge_containers(&mut self, target: NodeId, previous: NodeId) -> Result<()> {
        for id in [target, previous] {
            if !matches!(
                self.tree[id].kind(),
                ElementKind::Block | ElementKind::Inblock { .. }
            ) {
                return Err(EditorError::structure(format!(
                    "cannot merge {} element {}",
                    self.tree[id].kind().name(),
                    self.tree[id].key()
                )));
            }
        }
        if let Some(hook) = self.merge_hook.as_deref() {
            if let Some(outcome) = hook.merge(&mut self.tree, target, previous) {
                tracing::trace!(target: "quire::mutation", "merge hook handled merge");
                return outcome;
            }
        }
        self.tree.move_children(target, previous);
        tracing::trace!(
            target: "quire::mutation",
            target_key = %self.tree[target].key(),
            previous_key = %self.tree[previous].key(),
            "merged containers"
        );
        Ok(())
    }
}
