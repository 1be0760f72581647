//! Built-in formatting rules.
//!
//! Every rule is applied to one element at a time and returns whether it
//! changed anything. Rules that look at children act when the walk visits
//! the parent.

use crate::element::{ElementKind, NodeId, merge_attributes};
use crate::format::FormatContext;

/// A block that is not a stack entry becomes an inline under an inline
/// parent, otherwise a block-like inblock.
pub fn demote_nested_blocks(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    if !ctx.tree.is_block(id) {
        return false;
    }
    let Some(parent) = ctx.tree[id].parent() else {
        return false;
    };
    let kind = if ctx.tree.is_inline(parent) {
        ElementKind::Inline
    } else {
        ElementKind::Inblock { block_like: true }
    };
    ctx.tree[id].kind = kind;
    tracing::trace!(target: "quire::format", key = %ctx.tree[id].key(), to = kind.name(), "demoted nested block");
    true
}

/// Inblocks may only sit among other inblocks. When a container mixes them
/// with other non-empty children, the inblocks become inlines.
pub fn sibling_homogeneity(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    if !ctx.tree[id].kind().is_container() {
        return false;
    }
    let children: Vec<NodeId> = ctx
        .tree[id]
        .children()
        .iter()
        .copied()
        .filter(|c| !ctx.tree.is_empty(*c))
        .collect();
    let inblocks: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|c| ctx.tree.is_inblock(*c))
        .collect();
    if inblocks.is_empty() || inblocks.len() == children.len() {
        return false;
    }
    for child in inblocks {
        ctx.tree[child].kind = ElementKind::Inline;
    }
    true
}

/// An inline never hosts inblocks directly.
pub fn inline_purity(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    if !ctx.tree.is_inline(id) {
        return false;
    }
    let inblocks: Vec<NodeId> = ctx
        .tree[id]
        .children()
        .iter()
        .copied()
        .filter(|c| ctx.tree.is_inblock(*c))
        .collect();
    for child in &inblocks {
        ctx.tree[*child].kind = ElementKind::Inline;
    }
    !inblocks.is_empty()
}

/// A container holding only line breaks keeps exactly one. Breaks mixed with
/// other content are emptied so the walk prunes them.
pub fn line_break_collapse(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    if !ctx.tree[id].kind().is_container() {
        return false;
    }
    let children: Vec<NodeId> = ctx
        .tree[id]
        .children()
        .iter()
        .copied()
        .filter(|c| !ctx.tree.is_empty(*c))
        .collect();
    let (breaks, others): (Vec<NodeId>, Vec<NodeId>) =
        children.into_iter().partition(|c| ctx.tree.is_break(*c));
    if breaks.is_empty() {
        return false;
    }

    if others.is_empty() {
        if breaks.len() == 1 {
            return false;
        }
        let keep = breaks[0];
        for extra in &breaks[1..] {
            ctx.move_points(*extra, keep, 0);
            ctx.tree.detach(*extra);
        }
        tracing::trace!(target: "quire::format", key = %ctx.tree[id].key(), removed = breaks.len() - 1, "collapsed line breaks");
        return true;
    }

    for br in breaks {
        ctx.tree.to_empty(br);
    }
    true
}

/// A container with a single mergeable child absorbs it.
///
/// Inline into inline and inblock into inblock merge when the tags match. An
/// inline carrying the text tag folds a lone text child into itself and
/// becomes that text. Child attributes win over the parent's.
pub fn merge_parent_child(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    let parent_kind = ctx.tree[id].kind();
    if !matches!(parent_kind, ElementKind::Inline | ElementKind::Inblock { .. }) {
        return false;
    }
    let [child] = ctx.tree[id].children() else {
        return false;
    };
    let child = *child;
    let child_kind = ctx.tree[child].kind();

    let same_class = matches!(
        (parent_kind, child_kind),
        (ElementKind::Inline, ElementKind::Inline)
            | (ElementKind::Inblock { .. }, ElementKind::Inblock { .. })
    );
    let same_tag = ctx.tree[id].tag().eq_ignore_ascii_case(ctx.tree[child].tag());

    if same_class && same_tag {
        absorb_attributes(ctx, id, child);
        ctx.tree.detach(child);
        ctx.tree.move_children(child, id);
        tracing::trace!(target: "quire::format", key = %ctx.tree[id].key(), "merged same-tag child");
        return true;
    }

    let text_tag = ctx.tree.config().text_tag.clone();
    if parent_kind == ElementKind::Inline
        && child_kind == ElementKind::Text
        && ctx.tree[id].tag().eq_ignore_ascii_case(&text_tag)
    {
        absorb_attributes(ctx, id, child);
        let text = std::mem::take(&mut ctx.tree[child].text);
        ctx.tree.detach(child);
        let element = &mut ctx.tree[id];
        element.kind = ElementKind::Text;
        element.text = text;
        ctx.move_points(child, id, 0);
        tracing::trace!(target: "quire::format", key = %ctx.tree[id].key(), "folded text into span");
        return true;
    }
    false
}

fn absorb_attributes(ctx: &mut FormatContext<'_>, into: NodeId, from: NodeId) {
    let marks = ctx.tree[from].marks.take();
    let styles = ctx.tree[from].styles.take();
    let element = &mut ctx.tree[into];
    element.marks = merge_attributes(element.marks.take(), marks.as_ref());
    element.styles = merge_attributes(element.styles.take(), styles.as_ref());
}

/// Merge the first mergeable adjacent pair among the children of `id`:
/// texts with equal attributes, or inlines with equal tag and attributes.
pub fn merge_siblings(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
    if !ctx.tree[id].kind().is_container() {
        return false;
    }
    let children = ctx.tree[id].children().to_vec();
    for pair in children.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let (l, r) = (&ctx.tree[left], &ctx.tree[right]);
        if l.kind() == ElementKind::Text
            && r.kind() == ElementKind::Text
            && !l.text().is_empty()
            && !r.text().is_empty()
            && l.same_attributes(r)
        {
            let shift = ctx.tree.leaf_len(left);
            let tail = std::mem::take(&mut ctx.tree[right].text);
            ctx.tree[left].text.push_str(&tail);
            ctx.move_points(right, left, shift);
            ctx.tree.detach(right);
            return true;
        }
        if l.kind() == ElementKind::Inline
            && r.kind() == ElementKind::Inline
            && l.tag().eq_ignore_ascii_case(r.tag())
            && l.same_attributes(r)
            && !ctx.tree.is_empty(left)
            && !ctx.tree.is_empty(right)
        {
            ctx.tree.detach(right);
            ctx.tree.move_children(right, left);
            return true;
        }
    }
    false
}
