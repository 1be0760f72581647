//! Arena-backed element tree.
//!
//! The tree owns every element in a slot arena and the top-level ordered
//! sequence of blocks (the "stack"). Elements refer to each other by
//! [`NodeId`]; detached elements stay in the arena until [`Tree::sweep`]
//! reclaims them.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::element::{Attributes, Element, ElementKey, ElementKind, NodeId, RenderHandle};
use crate::error::{EditorError, Result};
use crate::text_helpers::{char_len, is_placeholder_only};

/// The document tree.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Option<Element>>,
    free: Vec<usize>,
    stack: Vec<NodeId>,
    next_key: u64,
    config: Arc<EditorConfig>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(Arc::new(EditorConfig::default()))
    }
}

impl Index<NodeId> for Tree {
    type Output = Element;

    fn index(&self, id: NodeId) -> &Element {
        match self.nodes.get(id.0) {
            Some(Some(element)) => element,
            _ => panic!("node {id:?} is not alive in this tree"),
        }
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Element {
        match self.nodes.get_mut(id.0) {
            Some(Some(element)) => element,
            _ => panic!("node {id:?} is not alive in this tree"),
        }
    }
}

impl Tree {
    pub fn new(config: Arc<EditorConfig>) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            stack: Vec::new(),
            next_key: 1,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_arc(&self) -> Arc<EditorConfig> {
        Arc::clone(&self.config)
    }

    /// Top-level blocks in document order.
    pub fn stack(&self) -> &[NodeId] {
        &self.stack
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live arena slots (attached or not).
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    // === Construction ===

    /// Make sure keys minted from now on are also fresh in `other`.
    pub(crate) fn adopt_key_counter(&mut self, other: &Tree) {
        self.next_key = self.next_key.max(other.next_key);
    }

    fn mint_key(&mut self) -> ElementKey {
        let key = ElementKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = Some(element);
            NodeId(slot)
        } else {
            self.nodes.push(Some(element));
            NodeId(self.nodes.len() - 1)
        }
    }

    /// Create a detached element with a fresh key.
    pub fn create(&mut self, kind: ElementKind, tag: impl Into<SmolStr>) -> NodeId {
        let key = self.mint_key();
        self.alloc(Element::new(key, kind, tag.into()))
    }

    /// Create a detached text element.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let tag = self.config.text_tag.clone();
        let id = self.create(ElementKind::Text, tag);
        self[id].text = text.into();
        id
    }

    /// Create a detached line-break element.
    pub fn create_break(&mut self) -> NodeId {
        let tag = self.config.break_tag.clone();
        self.create(ElementKind::Closed, tag)
    }

    /// Create a detached paragraph holding a single line break.
    pub fn create_empty_paragraph(&mut self) -> NodeId {
        let tag = self.config.paragraph_tag.clone();
        let block = self.create(ElementKind::Block, tag);
        let br = self.create_break();
        self.link_child(block, br, None);
        block
    }

    // === Setters ===

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        if self[id].kind != ElementKind::Text {
            return Err(EditorError::contract(format!(
                "set_text needs a text element, got {}",
                self[id].kind.name()
            )));
        }
        self[id].text = text.into();
        Ok(())
    }

    pub fn set_marks(&mut self, id: NodeId, marks: Option<Attributes>) {
        self[id].marks = marks.filter(|m| !m.is_empty());
    }

    pub fn set_styles(&mut self, id: NodeId, styles: Option<Attributes>) {
        self[id].styles = styles.filter(|s| !s.is_empty());
    }

    pub fn set_mark(&mut self, id: NodeId, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self[id]
            .marks
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
    }

    pub fn set_style(&mut self, id: NodeId, name: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self[id]
            .styles
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
    }

    pub fn set_rendered(&mut self, id: NodeId, handle: Option<RenderHandle>) {
        self[id].rendered = handle;
    }

    // === Attachment ===

    /// True when the element is neither in the stack nor under a parent.
    pub fn is_detached(&self, id: NodeId) -> bool {
        self[id].parent.is_none() && !self.stack.contains(&id)
    }

    /// True when the element is reachable from the stack.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        self.stack.contains(&self.root_of(id))
    }

    fn ensure_detached(&self, id: NodeId) -> Result<()> {
        if self.is_detached(id) {
            Ok(())
        } else {
            Err(EditorError::contract(format!(
                "element {} is already attached",
                self[id].key
            )))
        }
    }

    fn ensure_container(&self, id: NodeId) -> Result<()> {
        if self[id].kind.is_container() {
            Ok(())
        } else {
            Err(EditorError::contract(format!(
                "{} element {} cannot have children",
                self[id].kind.name(),
                self[id].key
            )))
        }
    }

    /// Link without validation. `index` of `None` appends.
    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        let children = &mut self[parent].children;
        let at = index.unwrap_or(children.len()).min(children.len());
        children.insert(at, child);
        self[child].parent = Some(parent);
    }

    /// Append a detached block to the stack.
    pub fn push_block(&mut self, id: NodeId) -> Result<()> {
        self.ensure_detached(id)?;
        self.stack.push(id);
        Ok(())
    }

    /// Insert a detached element into the stack at `index`.
    pub fn insert_block(&mut self, index: usize, id: NodeId) -> Result<()> {
        self.ensure_detached(id)?;
        let at = index.min(self.stack.len());
        self.stack.insert(at, id);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_container(parent)?;
        self.ensure_detached(child)?;
        self.link_child(parent, child, None);
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.ensure_container(parent)?;
        self.ensure_detached(child)?;
        self.link_child(parent, child, Some(index));
        Ok(())
    }

    /// Insert a detached element right before `anchor` in its sibling list.
    pub fn insert_before(&mut self, anchor: NodeId, id: NodeId) -> Result<()> {
        self.insert_sibling(anchor, id, 0)
    }

    /// Insert a detached element right after `anchor` in its sibling list.
    pub fn insert_after(&mut self, anchor: NodeId, id: NodeId) -> Result<()> {
        self.insert_sibling(anchor, id, 1)
    }

    fn insert_sibling(&mut self, anchor: NodeId, id: NodeId, shift: usize) -> Result<()> {
        self.ensure_detached(id)?;
        let index = self.index_in_parent(anchor).ok_or_else(|| {
            EditorError::contract(format!("anchor {} is detached", self[anchor].key))
        })?;
        match self[anchor].parent {
            Some(parent) => self.link_child(parent, id, Some(index + shift)),
            None => self.stack.insert(index + shift, id),
        }
        Ok(())
    }

    /// Unlink an element from its parent (or the stack). The subtree stays
    /// in the arena.
    pub fn detach(&mut self, id: NodeId) {
        match self[id].parent.take() {
            Some(parent) => self[parent].children.retain(|c| *c != id),
            None => self.stack.retain(|b| *b != id),
        }
    }

    /// Replace `old` with the detached `new` at the same position.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.insert_before(old, new)?;
        self.detach(old);
        Ok(())
    }

    /// Move all children of `from` to the end of `to`.
    pub(crate) fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self[from].children);
        for child in children {
            self.link_child(to, child, None);
        }
    }

    /// Position of the element in its sibling list (or the stack).
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        self.siblings(id).iter().position(|s| *s == id)
    }

    /// The sibling list containing the element.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self[id].parent {
            Some(parent) => &self[parent].children,
            None => &self.stack,
        }
    }

    // === Classification ===

    pub fn is_block(&self, id: NodeId) -> bool {
        self[id].kind == ElementKind::Block
    }

    pub fn is_inblock(&self, id: NodeId) -> bool {
        matches!(self[id].kind, ElementKind::Inblock { .. })
    }

    pub fn is_inline(&self, id: NodeId) -> bool {
        self[id].kind == ElementKind::Inline
    }

    pub fn is_closed(&self, id: NodeId) -> bool {
        self[id].kind == ElementKind::Closed
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self[id].kind == ElementKind::Text
    }

    pub fn is_break(&self, id: NodeId) -> bool {
        self.is_closed(id) && self[id].tag.eq_ignore_ascii_case(&self.config.break_tag)
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.is_closed(id) && self.config.is_void_tag(&self[id].tag)
    }

    /// Empty text, or a container whose children are all empty.
    pub fn is_empty(&self, id: NodeId) -> bool {
        let element = &self[id];
        match element.kind {
            ElementKind::Text => element.text.is_empty(),
            ElementKind::Closed => false,
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                element.children.iter().all(|c| self.is_empty(*c))
            }
        }
    }

    /// Non-empty text made only of the zero-width placeholder.
    pub fn is_space_text(&self, id: NodeId) -> bool {
        self.is_text(id) && is_placeholder_only(&self[id].text)
    }

    /// Text or non-void closed leaf that is not empty.
    pub fn is_caret_host(&self, id: NodeId) -> bool {
        match self[id].kind {
            ElementKind::Text => !self[id].text.is_empty(),
            ElementKind::Closed => !self.is_void(id),
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => false,
        }
    }

    /// Identity comparison by key.
    pub fn is_equal(&self, a: NodeId, b: NodeId) -> bool {
        self[a].key == self[b].key
    }

    /// True when `other` is `id` or a descendant of it.
    pub fn is_contains(&self, id: NodeId, other: NodeId) -> bool {
        let mut current = Some(other);
        while let Some(node) = current {
            if self.is_equal(node, id) {
                return true;
            }
            current = self[node].parent;
        }
        false
    }

    /// Containment in either direction.
    pub fn has_contains(&self, a: NodeId, b: NodeId) -> bool {
        self.is_contains(a, b) || self.is_contains(b, a)
    }

    // === Upward search ===

    /// Topmost ancestor (the element itself when it has no parent).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self[current].parent {
            current = parent;
        }
        current
    }

    /// The block containing the element (itself when it is a block).
    pub fn get_block(&self, id: NodeId) -> Option<NodeId> {
        let root = self.root_of(id);
        self.is_block(root).then_some(root)
    }

    /// Nearest inblock ancestor, not searching past the block.
    pub fn get_inblock(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|a| self.is_inblock(*a))
    }

    /// Nearest inline ancestor, not searching past the block.
    pub fn get_inline(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .take_while(|a| !self.is_block(*a))
            .find(|a| self.is_inline(*a))
    }

    /// The innermost inblock ancestor, else the block.
    pub fn get_container(&self, id: NodeId) -> Option<NodeId> {
        self.get_inblock(id).or_else(|| self.get_block(id))
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self[id].parent, move |n| self[*n].parent)
    }

    // === Flattening ===

    /// Pre-order flattening of `list` and all descendants.
    pub fn flat_elements(&self, list: &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::new();
        for id in list {
            self.flatten_into(*id, &mut out);
        }
        out
    }

    fn flatten_into(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in &self[id].children {
            self.flatten_into(*child, out);
        }
    }

    /// Every attached element in document order.
    pub fn document_order(&self) -> Vec<NodeId> {
        self.flat_elements(&self.stack)
    }

    /// Caret-host leaves under (and including) `id`, in document order.
    pub fn caret_leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.flat_elements(&[id])
            .into_iter()
            .filter(|n| self.is_caret_host(*n))
            .collect()
    }

    /// True when `id` is the first caret-host leaf of `container`.
    pub fn is_first(&self, id: NodeId, container: NodeId) -> bool {
        self.caret_leaves(container).first() == Some(&id)
    }

    /// True when `id` is the last caret-host leaf of `container`.
    pub fn is_last(&self, id: NodeId, container: NodeId) -> bool {
        self.caret_leaves(container).last() == Some(&id)
    }

    /// Find an attached element by key.
    pub fn find_by_key(&self, key: ElementKey) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|id| self[*id].key == key)
    }

    // === Cloning ===

    /// Clone an element with a fresh key. Deep clones copy the subtree with
    /// fresh keys too. The clone is detached.
    pub fn clone_element(&mut self, id: NodeId, deep: bool) -> NodeId {
        let key = self.mint_key();
        let source = &self[id];
        let mut element = Element::new(key, source.kind, source.tag.clone());
        element.marks = source.marks.clone();
        element.styles = source.styles.clone();
        element.text = source.text.clone();
        let children = if deep { source.children.clone() } else { Vec::new() };
        let clone = self.alloc(element);
        for child in children {
            let child_clone = self.clone_element(child, true);
            self.link_child(clone, child_clone, None);
        }
        clone
    }

    /// Key-preserving clone of everything reachable from the stack, into a
    /// fresh compact arena. Render handles are dropped.
    pub fn full_clone(&self) -> Tree {
        let mut clone = Tree {
            nodes: Vec::new(),
            free: Vec::new(),
            stack: Vec::new(),
            next_key: self.next_key,
            config: Arc::clone(&self.config),
        };
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        for id in self.document_order() {
            let mut element = self[id].clone();
            element.rendered = None;
            let new_id = clone.alloc(element);
            remap.insert(id, new_id);
        }
        for (old, new) in &remap {
            let element = &mut clone[*new];
            element.parent = self[*old].parent.and_then(|p| remap.get(&p).copied());
            element.children = self[*old]
                .children
                .iter()
                .filter_map(|c| remap.get(c).copied())
                .collect();
        }
        clone.stack = self
            .stack
            .iter()
            .filter_map(|b| remap.get(b).copied())
            .collect();
        clone
    }

    // === Structural conversions ===

    /// Promote a stack element to a block: its content moves one level down
    /// into a fresh element of its old kind, and the element itself becomes a
    /// paragraph block.
    pub fn convert_to_block(&mut self, id: NodeId) {
        if self.is_block(id) {
            return;
        }
        let (kind, tag) = (self[id].kind, self[id].tag.clone());
        let inner = self.create(kind, tag);
        let marks = self[id].marks.take();
        let styles = self[id].styles.take();
        let text = std::mem::take(&mut self[id].text);
        {
            let element = &mut self[inner];
            element.marks = marks;
            element.styles = styles;
            element.text = text;
        }
        self.move_children(id, inner);
        let paragraph = self.config.paragraph_tag.clone();
        let outer = &mut self[id];
        outer.kind = ElementKind::Block;
        outer.tag = paragraph;
        self.link_child(id, inner, None);
    }

    /// Clear content in place. Closed leaves become empty text so the
    /// formatting pass can prune them.
    pub fn to_empty(&mut self, id: NodeId) {
        match self[id].kind {
            ElementKind::Text => self[id].text.clear(),
            ElementKind::Closed => {
                let tag = self.config.text_tag.clone();
                let element = &mut self[id];
                element.kind = ElementKind::Text;
                element.tag = tag;
                element.text.clear();
                element.marks = None;
                element.styles = None;
            }
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                for child in self[id].children.clone() {
                    self.to_empty(child);
                }
            }
        }
    }

    /// Text content of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        self.flat_elements(&[id])
            .into_iter()
            .filter(|n| self.is_text(*n))
            .map(|n| self[n].text.as_str())
            .collect()
    }

    pub fn leaf_len(&self, id: NodeId) -> usize {
        match self[id].kind {
            ElementKind::Text => char_len(&self[id].text),
            _ => self[id].leaf_len(),
        }
    }

    /// Free every slot not reachable from the stack or listed in `keep`.
    pub fn sweep(&mut self, keep: &[NodeId]) {
        let mut live = vec![false; self.nodes.len()];
        for id in self.document_order() {
            live[id.0] = true;
        }
        for id in keep {
            if self.contains_node(*id) {
                for n in self.flat_elements(&[self.root_of(*id)]) {
                    live[n.0] = true;
                }
            }
        }
        let mut freed = 0usize;
        for (index, alive) in live.into_iter().enumerate() {
            if !alive && self.nodes[index].is_some() {
                self.nodes[index] = None;
                self.free.push(index);
                freed += 1;
            }
        }
        if freed > 0 {
            tracing::trace!(target: "quire::tree", freed, "swept detached elements");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<p>ab<span>cd</span></p><p><br></p>`
    fn sample() -> (Tree, [NodeId; 6]) {
        let mut tree = Tree::default();
        let p1 = tree.create(ElementKind::Block, "p");
        let ab = tree.create_text("ab");
        let span = tree.create(ElementKind::Inline, "a");
        let cd = tree.create_text("cd");
        let p2 = tree.create(ElementKind::Block, "p");
        let br = tree.create_break();
        tree.push_block(p1).unwrap();
        tree.append_child(p1, ab).unwrap();
        tree.append_child(p1, span).unwrap();
        tree.append_child(span, cd).unwrap();
        tree.push_block(p2).unwrap();
        tree.append_child(p2, br).unwrap();
        (tree, [p1, ab, span, cd, p2, br])
    }

    #[test]
    fn test_classification() {
        let (tree, [p1, ab, span, _, _, br]) = sample();
        assert!(tree.is_block(p1));
        assert!(tree.is_text(ab));
        assert!(tree.is_inline(span));
        assert!(tree.is_break(br));
        assert!(tree.is_caret_host(br));
        assert!(!tree.is_empty(p1));
    }

    #[test]
    fn test_emptiness_recurses() {
        let (mut tree, [p1, ab, span, cd, _, _]) = sample();
        tree.to_empty(span);
        assert!(tree.is_empty(span));
        assert!(!tree.is_empty(p1));
        tree.to_empty(ab);
        assert!(tree.is_empty(p1));
        assert!(tree.is_text(cd));
    }

    #[test]
    fn test_to_empty_turns_closed_into_empty_text() {
        let (mut tree, [.., p2, br]) = sample();
        tree.to_empty(br);
        assert!(tree.is_text(br));
        assert!(tree.is_empty(p2));
    }

    #[test]
    fn test_containment() {
        let (tree, [p1, ab, span, cd, p2, _]) = sample();
        assert!(tree.is_contains(p1, cd));
        assert!(tree.is_contains(span, cd));
        assert!(tree.is_contains(cd, cd));
        assert!(!tree.is_contains(span, ab));
        assert!(!tree.is_contains(p2, cd));
        assert!(tree.has_contains(cd, p1));
    }

    #[test]
    fn test_upward_search() {
        let (mut tree, [p1, _, span, cd, _, _]) = sample();
        assert_eq!(tree.get_block(cd), Some(p1));
        assert_eq!(tree.get_block(p1), Some(p1));
        assert_eq!(tree.get_inline(cd), Some(span));
        assert_eq!(tree.get_inblock(cd), None);

        let li = tree.create(ElementKind::Inblock { block_like: false }, "li");
        let x = tree.create_text("x");
        tree.append_child(p1, li).unwrap();
        tree.append_child(li, x).unwrap();
        assert_eq!(tree.get_inblock(x), Some(li));
        assert_eq!(tree.get_container(x), Some(li));
        assert_eq!(tree.get_container(cd), Some(p1));
    }

    #[test]
    fn test_first_and_last_leaf() {
        let (tree, [p1, ab, _, cd, _, _]) = sample();
        assert!(tree.is_first(ab, p1));
        assert!(tree.is_last(cd, p1));
        assert!(!tree.is_first(cd, p1));
    }

    #[test]
    fn test_flat_elements_preorder() {
        let (tree, [p1, ab, span, cd, p2, br]) = sample();
        assert_eq!(tree.document_order(), vec![p1, ab, span, cd, p2, br]);
    }

    #[test]
    fn test_clone_mints_fresh_keys() {
        let (mut tree, [p1, ..]) = sample();
        let shallow = tree.clone_element(p1, false);
        assert!(tree[shallow].children().is_empty());
        assert_ne!(tree[shallow].key(), tree[p1].key());

        let deep = tree.clone_element(p1, true);
        assert_eq!(tree.text_content(deep), "abcd");
        assert!(tree.is_detached(deep));
    }

    #[test]
    fn test_full_clone_preserves_keys_and_compacts() {
        let (mut tree, [p1, _, _, cd, _, _]) = sample();
        let garbage = tree.create_text("garbage");
        let clone = tree.full_clone();
        assert_eq!(clone.live_count(), 6);
        let found = clone.find_by_key(tree[cd].key()).unwrap();
        assert_eq!(clone[found].text(), "cd");
        assert_eq!(clone[clone.stack()[0]].key(), tree[p1].key());
        assert!(clone.find_by_key(tree[garbage].key()).is_none());

        // New keys in the clone never collide with existing ones.
        let mut clone = clone;
        let fresh = clone.create_text("n");
        assert!(clone[fresh].key() > tree[garbage].key());
    }

    #[test]
    fn test_convert_to_block_wraps_content() {
        let mut tree = Tree::default();
        let span = tree.create(ElementKind::Inline, "a");
        tree.set_mark(span, "href", "#x");
        let text = tree.create_text("link");
        tree.append_child(span, text).unwrap();
        tree.push_block(span).unwrap();

        tree.convert_to_block(span);
        assert!(tree.is_block(span));
        assert_eq!(tree[span].tag(), "p");
        let inner = tree[span].children()[0];
        assert_eq!(tree[inner].tag(), "a");
        assert_eq!(tree[inner].mark("href"), Some("#x"));
        assert_eq!(tree[inner].children(), &[text]);
        assert_eq!(tree[text].parent(), Some(inner));
    }

    #[test]
    fn test_attach_contracts() {
        let (mut tree, [p1, ab, ..]) = sample();
        assert!(matches!(
            tree.append_child(p1, ab),
            Err(EditorError::Contract(_))
        ));
        let orphan = tree.create_text("x");
        assert!(matches!(
            tree.append_child(ab, orphan),
            Err(EditorError::Contract(_))
        ));
        assert!(tree.set_text(p1, "nope").is_err());
    }

    #[test]
    fn test_sibling_insertion_and_detach() {
        let (mut tree, [p1, ab, span, ..]) = sample();
        let x = tree.create_text("x");
        tree.insert_after(ab, x).unwrap();
        assert_eq!(tree[p1].children(), &[ab, x, span]);
        tree.detach(x);
        assert_eq!(tree[p1].children(), &[ab, span]);
        assert!(tree.is_detached(x));

        let block = tree.create_empty_paragraph();
        tree.insert_before(p1, block).unwrap();
        assert_eq!(tree.stack()[0], block);
    }

    #[test]
    fn test_sweep_reclaims_detached() {
        let (mut tree, [_, _, span, ..]) = sample();
        tree.detach(span);
        let before = tree.live_count();
        tree.sweep(&[]);
        assert_eq!(tree.live_count(), before - 2);
        // Freed slots get reused.
        let n = tree.create_text("n");
        assert!(n.index() < 6);
    }
}
