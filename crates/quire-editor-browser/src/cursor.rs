//! Range → native selection.
//!
//! Points are char offsets into text elements (or 0/1 around a closed
//! element); the DOM wants (node, UTF-16 offset) pairs.

use quire_editor_core::text_helpers::char_to_utf16;
use quire_editor_core::{
    Editor, ElementKind, PlatformError, Point, Range, SelectionPlatform, Tree,
};

use crate::dom_render::DomRenderer;
use crate::dom_sync::selection_to_range;

/// Native position for a point.
pub fn point_to_dom(
    renderer: &DomRenderer,
    tree: &Tree,
    point: &Point,
) -> Result<(web_sys::Node, u32), PlatformError> {
    let element = tree
        .get(point.element)
        .ok_or_else(|| format!("point element {:?} is gone", point.element))?;
    let node = renderer
        .node_of(tree, point.element)
        .ok_or_else(|| format!("element {} was never rendered", element.key()))?;

    match element.kind() {
        ElementKind::Text => {
            // Styled texts render as a wrapper around a single text node.
            let text_node = if node.node_type() == web_sys::Node::TEXT_NODE {
                node.clone()
            } else {
                node.first_child()
                    .ok_or_else(|| format!("text wrapper {} is empty", element.key()))?
            };
            let offset = char_to_utf16(element.text(), point.offset);
            Ok((text_node, offset as u32))
        }
        ElementKind::Closed => {
            let parent = node
                .parent_node()
                .ok_or_else(|| format!("closed element {} is detached", element.key()))?;
            let siblings = parent.child_nodes();
            let index = (0..siblings.length())
                .find(|i| siblings.item(*i).is_some_and(|n| n.is_same_node(Some(node))))
                .ok_or("closed element missing from its parent")?;
            Ok((parent, index + point.offset.min(1) as u32))
        }
        ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
            let index = if point.offset == 0 { 0 } else { node.child_nodes().length() };
            Ok((node.clone(), index))
        }
    }
}

/// Show `range` as the document selection, or clear it for `None`.
pub fn range_render(
    renderer: &DomRenderer,
    tree: &Tree,
    range: Option<&Range>,
) -> Result<(), PlatformError> {
    let selection = gloo_utils::window()
        .get_selection()
        .map_err(|e| format!("get_selection failed: {e:?}"))?
        .ok_or("no selection object")?;

    let Some(range) = range else {
        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {e:?}"))?;
        return Ok(());
    };

    let (anchor_node, anchor_offset) = point_to_dom(renderer, tree, &range.anchor)?;
    let (focus_node, focus_offset) = point_to_dom(renderer, tree, &range.focus)?;
    tracing::trace!(
        target: "quire::dom",
        anchor_offset,
        focus_offset,
        "restoring selection"
    );
    selection
        .set_base_and_extent(&anchor_node, anchor_offset, &focus_node, focus_offset)
        .map_err(|e| format!("set_base_and_extent failed: {e:?}"))?;
    Ok(())
}

impl SelectionPlatform for DomRenderer {
    fn apply_range(&self, editor: &Editor) -> Result<(), PlatformError> {
        range_render(self, editor.tree(), editor.range())
    }

    fn read_range(&self, editor: &Editor) -> Result<Option<Range>, PlatformError> {
        let selection = gloo_utils::window()
            .get_selection()
            .map_err(|e| format!("get_selection failed: {e:?}"))?;
        Ok(selection.and_then(|s| selection_to_range(self, editor.tree(), &s)))
    }
}

