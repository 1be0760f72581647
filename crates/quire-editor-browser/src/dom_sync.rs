//! Native selection → editor range.
//!
//! The inverse of `cursor`: a DOM (node, offset) pair is resolved to the
//! element rendered there, and UTF-16 offsets are turned back into char
//! offsets.

use quire_editor_core::text_helpers::utf16_to_char;
use quire_editor_core::{ElementKind, NodeId, Point, Range, Tree};

use crate::dom_render::DomRenderer;

/// Resolve a native position to a point, or `None` when it lies outside the
/// rendered document.
pub fn dom_point_to_point(
    renderer: &DomRenderer,
    tree: &Tree,
    node: &web_sys::Node,
    offset: u32,
) -> Option<Point> {
    let root: &web_sys::Node = renderer.root().as_ref();
    if !root.contains(Some(node)) {
        return None;
    }

    if node.node_type() == web_sys::Node::TEXT_NODE {
        let id = renderer.enclosing_element(tree, node)?;
        return text_point(tree, id, node, offset);
    }

    // Element positions count children: resolve the child after the offset,
    // or the end of the child before it.
    let children = node.child_nodes();
    if let Some(child) = children.item(offset) {
        if let Some(id) = renderer.element_of(tree, &child) {
            return leaf_point(tree, id, false);
        }
    }
    if offset > 0 {
        if let Some(child) = children.item(offset - 1) {
            if let Some(id) = renderer.element_of(tree, &child) {
                return leaf_point(tree, id, true);
            }
        }
    }
    let id = renderer.enclosing_element(tree, node)?;
    leaf_point(tree, id, offset > 0)
}

fn text_point(tree: &Tree, id: NodeId, node: &web_sys::Node, offset: u32) -> Option<Point> {
    let element = tree.get(id)?;
    if element.kind() != ElementKind::Text {
        return leaf_point(tree, id, offset > 0);
    }
    let dom_text = node.node_value().unwrap_or_default();
    let offset = utf16_to_char(&dom_text, offset as usize).min(element.leaf_len());
    Point::new(tree, id, offset).ok()
}

fn leaf_point(tree: &Tree, id: NodeId, at_end: bool) -> Option<Point> {
    let point = if at_end {
        Point::end_of(tree, id)
    } else {
        Point::start_of(tree, id)
    };
    point.ok()
}

/// Read a native selection as a range over `tree`.
pub fn selection_to_range(
    renderer: &DomRenderer,
    tree: &Tree,
    selection: &web_sys::Selection,
) -> Option<Range> {
    let anchor_node = selection.anchor_node()?;
    let focus_node = selection.focus_node()?;
    let anchor = dom_point_to_point(renderer, tree, &anchor_node, selection.anchor_offset());
    let focus = dom_point_to_point(renderer, tree, &focus_node, selection.focus_offset());

    tracing::trace!(
        target: "quire::dom",
        anchor_node = %anchor_node.node_name(),
        anchor_offset = selection.anchor_offset(),
        focus_node = %focus_node.node_name(),
        focus_offset = selection.focus_offset(),
        resolved = anchor.is_some() && focus.is_some(),
        "read native selection"
    );
    Some(Range::new(anchor?, focus?))
}

/// Pull the native selection into the editor. Returns true when the editor
/// range changed.
pub fn sync_range_from_dom(
    renderer: &DomRenderer,
    editor: &mut quire_editor_core::Editor,
) -> bool {
    let Some(selection) = gloo_utils::window().get_selection().ok().flatten() else {
        return false;
    };
    let Some(range) = selection_to_range(renderer, editor.tree(), &selection) else {
        return false;
    };
    if editor.range() == Some(&range) {
        return false;
    }
    match editor.set_range(range) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(target: "quire::dom", %err, "native selection rejected");
            false
        }
    }
}
