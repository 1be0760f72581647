//! Formatting engine: structural normalization of the element tree.
//!
//! A pass promotes stray stack entries to blocks, then runs an ordered list
//! of rules. Each rule is walked depth-first over the whole tree until it
//! stops reporting changes. Empty elements are pruned the moment the walk
//! meets them, after any range endpoint inside them has been moved to a
//! neighbouring leaf. The whole sequence repeats until a round changes
//! nothing, so formatting an already formatted tree is a no-op.

mod rules;

pub use rules::{
    demote_nested_blocks, inline_purity, line_break_collapse, merge_parent_child,
    merge_siblings, sibling_homogeneity,
};

use crate::element::NodeId;
use crate::tree::Tree;
use crate::types::{Point, Range};

/// A structural rule applied to one element at a time.
///
/// `apply` returns true when it changed the tree. Rules must be idempotent:
/// on an element they already normalized they return false.
pub trait FormatRule {
    fn apply(&self, ctx: &mut FormatContext<'_>, id: NodeId) -> bool;
}

impl<F> FormatRule for F
where
    F: Fn(&mut FormatContext<'_>, NodeId) -> bool,
{
    fn apply(&self, ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
        self(ctx, id)
    }
}

/// Mutable view handed to rules: the tree plus the range to keep valid.
pub struct FormatContext<'a> {
    pub tree: &'a mut Tree,
    pub range: &'a mut Option<Range>,
    budget: usize,
}

impl<'a> FormatContext<'a> {
    pub fn new(tree: &'a mut Tree, range: &'a mut Option<Range>) -> Self {
        Self {
            tree,
            range,
            budget: 0,
        }
    }

    /// Allowance of rule applications for one rule running to fixpoint.
    /// A restart at index 0 per change makes a full merge of n siblings cost
    /// O(n²) applications, so the allowance is quadratic in the live count.
    fn reset_budget(&mut self) {
        let live = self.tree.live_count() + 1;
        self.budget = live
            .saturating_mul(live)
            .saturating_mul(self.tree.config().format_round_limit.max(1));
    }

    /// Rewrite every range endpoint for which `f` returns a replacement.
    pub fn retarget(&mut self, mut f: impl FnMut(&Tree, Point) -> Option<Point>) {
        if let Some(range) = self.range.as_mut() {
            if let Some(p) = f(self.tree, range.anchor) {
                range.anchor = p;
            }
            if let Some(p) = f(self.tree, range.focus) {
                range.focus = p;
            }
        }
    }

    /// Move endpoints sitting on `from` to `to`, shifting offsets by `shift`.
    pub fn move_points(&mut self, from: NodeId, to: NodeId, shift: usize) {
        self.retarget(|_, p| {
            (p.element == from).then_some(Point {
                element: to,
                offset: p.offset + shift,
            })
        });
    }

    /// Detach `id` after moving any endpoint inside it to a neighbouring
    /// caret-host leaf.
    pub fn prune(&mut self, id: NodeId) {
        let inside = |tree: &Tree, p: &Point| tree.is_contains(id, p.element);
        let affected = self
            .range
            .as_ref()
            .is_some_and(|r| inside(self.tree, &r.anchor) || inside(self.tree, &r.focus));
        if affected {
            // With nowhere to go the endpoints stay put; the stack guard or
            // the final repair picks them up.
            if let Some(point) = relocation_target(self.tree, id) {
                self.retarget(|tree, p| inside(tree, &p).then_some(point));
            }
        }
        tracing::trace!(
            target: "quire::format",
            key = %self.tree[id].key(),
            kind = self.tree[id].kind().name(),
            "pruned empty element"
        );
        self.tree.detach(id);
    }

    fn spend(&mut self) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;
        true
    }
}

/// Where to put a caret that sat inside `id`: the previous leaf's end within
/// the same block, then the next leaf's start within the block, then the same
/// two document-wide.
fn relocation_target(tree: &Tree, id: NodeId) -> Option<Point> {
    let outside = |leaves: Vec<NodeId>| -> Vec<NodeId> {
        leaves
            .into_iter()
            .filter(|leaf| !tree.is_contains(id, *leaf))
            .collect()
    };
    let order = tree.document_order();
    let position = order.iter().position(|n| *n == id)?;
    let before: Vec<NodeId> = order[..position].to_vec();
    let after: Vec<NodeId> = order[position..].to_vec();

    let mut scopes = Vec::new();
    if let Some(block) = tree.get_block(id).filter(|b| *b != id) {
        scopes.push(Some(block));
    }
    scopes.push(None);

    for scope in scopes {
        let in_scope = |n: &NodeId| scope.is_none_or(|s| tree.is_contains(s, *n));
        let prev = outside(before.clone())
            .into_iter()
            .rev()
            .find(|n| in_scope(n) && tree.is_caret_host(*n));
        if let Some(leaf) = prev {
            return Some(Point {
                element: leaf,
                offset: tree.leaf_len(leaf),
            });
        }
        let next = outside(after.clone())
            .into_iter()
            .find(|n| in_scope(n) && tree.is_caret_host(*n));
        if let Some(leaf) = next {
            return Some(Point {
                element: leaf,
                offset: 0,
            });
        }
    }
    None
}

/// Ordered rule set run by [`format`].
pub struct Formatter<'r> {
    external: &'r [Box<dyn FormatRule>],
}

impl<'r> Formatter<'r> {
    pub fn new(external: &'r [Box<dyn FormatRule>]) -> Self {
        Self { external }
    }

    /// Normalize `tree`, keeping `range` on valid caret hosts.
    pub fn run(&self, tree: &mut Tree, range: &mut Option<Range>) {
        let limit = tree.config().format_round_limit.max(1);
        let mut ctx = FormatContext::new(tree, range);
        let mut rounds = 0;
        loop {
            if rounds == limit {
                tracing::warn!(
                    target: "quire::format",
                    rounds,
                    "formatting did not settle, giving up"
                );
                break;
            }
            rounds += 1;
            if !self.round(&mut ctx) {
                break;
            }
        }
        guard_stack(&mut ctx);
        repair_range(&mut ctx);
        tracing::debug!(
            target: "quire::format",
            rounds,
            blocks = ctx.tree.stack().len(),
            "formatted tree"
        );
    }

    fn round(&self, ctx: &mut FormatContext<'_>) -> bool {
        let mut changed = promote_stack(ctx);
        let builtin: [&dyn FormatRule; 6] = [
            &demote_nested_blocks,
            &sibling_homogeneity,
            &inline_purity,
            &line_break_collapse,
            &merge_parent_child,
            &merge_siblings,
        ];
        for rule in builtin {
            changed |= run_rule(ctx, rule);
        }
        for rule in self.external {
            changed |= run_rule(ctx, rule.as_ref());
        }
        changed |= run_rule(ctx, &merge_parent_child);
        changed
    }
}

/// Format with only the built-in rules.
pub fn format(tree: &mut Tree, range: &mut Option<Range>) {
    Formatter::new(&[]).run(tree, range);
}

/// Turn every non-block stack entry into a paragraph block.
fn promote_stack(ctx: &mut FormatContext<'_>) -> bool {
    let mut changed = false;
    for id in ctx.tree.stack().to_vec() {
        if ctx.tree.is_block(id) {
            continue;
        }
        let was_leaf = ctx.tree[id].kind().is_leaf();
        ctx.tree.convert_to_block(id);
        if was_leaf {
            if let Some(inner) = ctx.tree[id].children().first().copied() {
                ctx.move_points(id, inner, 0);
            }
        }
        changed = true;
    }
    changed
}

/// Apply one rule to fixpoint over the whole tree.
fn run_rule(ctx: &mut FormatContext<'_>, rule: &dyn FormatRule) -> bool {
    ctx.reset_budget();
    let mut changed = false;
    while walk(ctx, rule, None) {
        changed = true;
        if ctx.budget == 0 {
            tracing::warn!(
                target: "quire::format",
                live = ctx.tree.live_count(),
                "rule kept changing the tree, stopping it"
            );
            break;
        }
    }
    changed
}

fn list_of(tree: &Tree, parent: Option<NodeId>) -> Vec<NodeId> {
    match parent {
        Some(p) => tree[p].children().to_vec(),
        None => tree.stack().to_vec(),
    }
}

/// Depth-first walk of one sibling list. After the list changes the walk
/// starts over at index 0.
fn walk(ctx: &mut FormatContext<'_>, rule: &dyn FormatRule, parent: Option<NodeId>) -> bool {
    let mut changed = false;
    let mut index = 0;
    loop {
        let list = list_of(ctx.tree, parent);
        let Some(&id) = list.get(index) else {
            break;
        };

        if ctx.tree.is_empty(id) {
            ctx.prune(id);
            changed = true;
            index = 0;
            continue;
        }

        if !ctx.spend() {
            return changed;
        }
        if rule.apply(ctx, id) {
            changed = true;
            if list_of(ctx.tree, parent) != list {
                index = 0;
                continue;
            }
        }

        if ctx.tree[id].kind().is_container() && walk(ctx, rule, Some(id)) {
            changed = true;
            if list_of(ctx.tree, parent) != list || ctx.tree.is_empty(id) {
                index = 0;
                continue;
            }
        }
        index += 1;
    }
    changed
}

/// Never leave the stack without a block.
fn guard_stack(ctx: &mut FormatContext<'_>) {
    if !ctx.tree.stack().is_empty() {
        return;
    }
    let block = ctx.tree.create_empty_paragraph();
    if let Err(err) = ctx.tree.push_block(block) {
        tracing::warn!(target: "quire::format", %err, "could not add a paragraph to the empty stack");
        return;
    }
    if ctx.range.is_some() {
        let br = ctx.tree[block].children()[0];
        *ctx.range = Some(Range::collapsed(Point {
            element: br,
            offset: 0,
        }));
    }
    tracing::debug!(target: "quire::format", "stack was empty, added a paragraph");
}

fn is_valid_point(tree: &Tree, p: &Point) -> bool {
    tree.contains_node(p.element)
        && tree.is_attached(p.element)
        && tree.is_caret_host(p.element)
        && p.offset <= tree.leaf_len(p.element)
}

/// Last resort for endpoints a rule left on a non-host or detached element:
/// the end of the same block, else the start of the document.
fn repair_range(ctx: &mut FormatContext<'_>) {
    let Some(range) = *ctx.range else {
        return;
    };
    let tree = &*ctx.tree;
    let repair = |p: Point| -> Option<Point> {
        if is_valid_point(tree, &p) {
            return Some(p);
        }
        let nearby = tree
            .contains_node(p.element)
            .then(|| tree.get_block(p.element))
            .flatten()
            .filter(|b| tree.is_attached(*b))
            .and_then(|b| Point::end_of(tree, b).ok());
        nearby.or_else(|| {
            let first = *tree.stack().first()?;
            Point::start_of(tree, first).ok()
        })
    };
    *ctx.range = match (repair(range.anchor), repair(range.focus)) {
        (Some(anchor), Some(focus)) => Some(Range::new(anchor, focus)),
        _ => {
            tracing::warn!(target: "quire::format", "range has no caret host left, clearing");
            None
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn paragraph(tree: &mut Tree, children: &[NodeId]) -> NodeId {
        let p = tree.create(ElementKind::Block, "p");
        tree.push_block(p).unwrap();
        for child in children {
            tree.append_child(p, *child).unwrap();
        }
        p
    }

    #[test]
    fn test_adjacent_texts_merge() {
        let mut tree = Tree::default();
        let foo = tree.create_text("foo");
        let bar = tree.create_text("bar");
        let p = paragraph(&mut tree, &[foo, bar]);
        let mut range = Some(Range::collapsed(Point {
            element: bar,
            offset: 1,
        }));

        format(&mut tree, &mut range);

        assert_eq!(tree[p].children(), &[foo]);
        assert_eq!(tree[foo].text(), "foobar");
        assert_eq!(range.unwrap().anchor, Point { element: foo, offset: 4 });
    }

    #[test]
    fn test_double_break_collapses() {
        let mut tree = Tree::default();
        let a = tree.create_break();
        let b = tree.create_break();
        let p = paragraph(&mut tree, &[a, b]);
        let mut range = Some(Range::collapsed(Point {
            element: b,
            offset: 0,
        }));

        format(&mut tree, &mut range);

        assert_eq!(tree[p].children(), &[a]);
        assert_eq!(range.unwrap().anchor.element, a);
    }

    #[test]
    fn test_break_beside_text_is_removed() {
        let mut tree = Tree::default();
        let br = tree.create_break();
        let text = tree.create_text("ab");
        let p = paragraph(&mut tree, &[br, text]);
        let mut range = Some(Range::collapsed(Point {
            element: br,
            offset: 0,
        }));

        format(&mut tree, &mut range);

        assert_eq!(tree[p].children(), &[text]);
        assert_eq!(range.unwrap().anchor, Point { element: text, offset: 0 });
    }

    #[test]
    fn test_empty_stack_gets_paragraph() {
        let mut tree = Tree::default();
        let empty = tree.create_text("");
        paragraph(&mut tree, &[empty]);
        let mut range = Some(Range::collapsed(Point {
            element: empty,
            offset: 0,
        }));

        format(&mut tree, &mut range);

        assert_eq!(tree.stack().len(), 1);
        let block = tree.stack()[0];
        let br = tree[block].children()[0];
        assert!(tree.is_break(br));
        assert_eq!(range.unwrap().anchor.element, br);
    }

    #[test]
    fn test_stray_text_in_stack_is_promoted() {
        let mut tree = Tree::default();
        let text = tree.create_text("loose");
        tree.push_block(text).unwrap();
        let mut range = Some(Range::collapsed(Point {
            element: text,
            offset: 2,
        }));

        format(&mut tree, &mut range);

        assert!(tree.is_block(text));
        let inner = tree[text].children()[0];
        assert_eq!(tree[inner].text(), "loose");
        assert_eq!(range.unwrap().anchor, Point { element: inner, offset: 2 });
    }

    #[test]
    fn test_pruning_moves_caret_to_previous_leaf() {
        let mut tree = Tree::default();
        let ab = tree.create_text("ab");
        let link = tree.create(ElementKind::Inline, "a");
        let empty = tree.create_text("");
        paragraph(&mut tree, &[ab, link]);
        tree.append_child(link, empty).unwrap();
        let mut range = Some(Range::collapsed(Point {
            element: empty,
            offset: 0,
        }));

        format(&mut tree, &mut range);

        assert!(tree.is_detached(link));
        assert_eq!(range.unwrap().anchor, Point { element: ab, offset: 2 });
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let mut tree = Tree::default();
        let outer = tree.create(ElementKind::Inline, "a");
        let inner = tree.create(ElementKind::Inline, "a");
        tree.set_mark(inner, "href", "#x");
        let x = tree.create_text("x");
        let y = tree.create_text("y");
        let br = tree.create_break();
        let nested = tree.create(ElementKind::Block, "div");
        let z = tree.create_text("z");
        paragraph(&mut tree, &[outer, y, br, nested]);
        tree.append_child(outer, inner).unwrap();
        tree.append_child(inner, x).unwrap();
        tree.append_child(nested, z).unwrap();
        let mut range = None;

        format(&mut tree, &mut range);
        let once = crate::html::render_html(&tree);
        format(&mut tree, &mut range);
        let twice = crate::html::render_html(&tree);

        assert_eq!(once, twice);
        insta::assert_snapshot!(once, @r##"<p><a href="#x">x</a>y<div>z</div></p>"##);
    }

    #[test]
    fn test_long_runs_of_texts_merge_completely() {
        for n in [60, 300] {
            let mut tree = Tree::default();
            let texts: Vec<NodeId> = (0..n).map(|_| tree.create_text("x")).collect();
            let p = paragraph(&mut tree, &texts);
            let mut range = None;

            format(&mut tree, &mut range);

            assert_eq!(tree[p].children().len(), 1, "{n} texts");
            assert_eq!(tree.text_content(p), "x".repeat(n));
            let count = tree.live_count();
            format(&mut tree, &mut range);
            assert_eq!(tree.live_count(), count);
        }
    }

    fn uppercase(ctx: &mut FormatContext<'_>, id: NodeId) -> bool {
        let element = &ctx.tree[id];
        if element.kind() != ElementKind::Text || element.text() == element.text().to_uppercase() {
            return false;
        }
        let upper = element.text().to_uppercase();
        ctx.tree.set_text(id, upper).is_ok()
    }

    #[test]
    fn test_external_rule_runs() {
        let mut tree = Tree::default();
        let text = tree.create_text("shout");
        paragraph(&mut tree, &[text]);
        let rules: Vec<Box<dyn FormatRule>> = vec![Box::new(uppercase)];
        let mut range = None;

        Formatter::new(&rules).run(&mut tree, &mut range);

        assert_eq!(tree[text].text(), "SHOUT");
    }
}
