//! Re-highlighting of preformatted code containers.

use crate::element::NodeId;
use crate::error::Result;
use crate::html::parse::parse_fragment_into;
use crate::html::serialize::children_html;
use crate::render::Highlighter;
use crate::tree::Tree;
use crate::types::{Point, Range};

/// Run `highlighter` over every top-most preformatted container and swap in
/// its markup. Range endpoints inside a replaced container keep their
/// character position. Returns the number of containers replaced.
pub fn highlight_code_blocks(
    tree: &mut Tree,
    range: &mut Option<Range>,
    highlighter: &dyn Highlighter,
) -> Result<usize> {
    let containers: Vec<NodeId> = tree
        .document_order()
        .into_iter()
        .filter(|id| is_pre(tree, *id) && !tree.ancestors(*id).any(|a| is_pre(tree, a)))
        .collect();

    let mut replaced = 0;
    for pre in containers {
        let code = tree.text_content(pre);
        let language = language_of(tree, pre);
        let Some(markup) = highlighter.highlight(&code, language.as_deref()) else {
            continue;
        };
        if markup == children_html(tree, tree[pre].children()) {
            continue;
        }

        let nodes = parse_fragment_into(tree, &markup, &(), true)?;
        let new_text: String = nodes.iter().map(|n| tree.text_content(*n)).collect();
        if new_text != code {
            tracing::warn!(
                target: "quire::highlight",
                key = %tree[pre].key(),
                "highlighter changed the code text, keeping the old markup"
            );
            continue;
        }

        let offsets = range.map(|r| {
            (
                text_offset(tree, pre, &r.anchor),
                text_offset(tree, pre, &r.focus),
            )
        });

        for child in tree[pre].children().to_vec() {
            tree.detach(child);
        }
        for node in nodes {
            tree.link_child(pre, node, None);
        }

        if let (Some(r), Some((anchor, focus))) = (range.as_mut(), offsets) {
            if let Some(p) = anchor.and_then(|o| point_at(tree, pre, o)) {
                r.anchor = p;
            }
            if let Some(p) = focus.and_then(|o| point_at(tree, pre, o)) {
                r.focus = p;
            }
        }
        replaced += 1;
    }

    if replaced > 0 {
        tracing::debug!(target: "quire::highlight", replaced, "highlighted code blocks");
    }
    Ok(replaced)
}

fn is_pre(tree: &Tree, id: NodeId) -> bool {
    tree[id].kind().is_container() && tree.config().is_pre_tag(tree[id].tag())
}

/// `data-language`, else a `language-*` class, on the container or its first
/// child.
fn language_of(tree: &Tree, pre: NodeId) -> Option<String> {
    let candidates = std::iter::once(pre).chain(tree[pre].children().first().copied());
    for id in candidates {
        let element = &tree[id];
        if let Some(language) = element.mark("data-language") {
            return Some(language.to_string());
        }
        let class_language = element.mark("class").and_then(|class| {
            class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
        });
        if let Some(language) = class_language {
            return Some(language.to_string());
        }
    }
    None
}

/// Character offset of `point` within the text of `pre`, or `None` when the
/// point is elsewhere.
fn text_offset(tree: &Tree, pre: NodeId, point: &Point) -> Option<usize> {
    if !tree.is_contains(pre, point.element) {
        return None;
    }
    let mut offset = 0;
    for leaf in tree.flat_elements(&[pre]) {
        if leaf == point.element {
            return Some(if tree.is_text(leaf) {
                offset + point.offset
            } else {
                offset
            });
        }
        if tree.is_text(leaf) {
            offset += tree.leaf_len(leaf);
        }
    }
    None
}

/// Point at a character offset within the text of `pre`. A boundary offset
/// lands at the end of the earlier leaf.
fn point_at(tree: &Tree, pre: NodeId, offset: usize) -> Option<Point> {
    let mut seen = 0;
    for leaf in tree.caret_leaves(pre) {
        let len = if tree.is_text(leaf) { tree.leaf_len(leaf) } else { 0 };
        if offset <= seen + len && tree.is_text(leaf) {
            return Some(Point {
                element: leaf,
                offset: offset - seen,
            });
        }
        seen += len;
    }
    Point::end_of(tree, pre).ok()
}
