//! Element tree → live DOM.
//!
//! `DomRenderer` keeps one native node per element, reusing it across renders
//! as long as the element's key survives (history snapshots keep keys) and the
//! node still fits the element's kind and tag. Each element's `rendered`
//! handle points at its slot here.

use std::collections::{HashMap, HashSet};

use quire_editor_core::{ElementKey, ElementKind, NodeId, PlatformError, RenderHandle, Tree};
use wasm_bindgen::JsCast;

/// Attribute carrying the element key on rendered DOM elements.
pub const KEY_ATTRIBUTE: &str = "data-quire-key";

/// Renders a [`Tree`] into a root DOM element and patches it in place.
pub struct DomRenderer {
    root: web_sys::Element,
    document: web_sys::Document,
    slots: Vec<Option<web_sys::Node>>,
    free: Vec<usize>,
    by_key: HashMap<ElementKey, RenderHandle>,
}

impl DomRenderer {
    /// Create a renderer for `root`. Existing children are replaced on the
    /// first render.
    pub fn new(root: web_sys::Element) -> Self {
        let document = root.owner_document().unwrap_or_else(gloo_utils::document);
        Self {
            root,
            document,
            slots: Vec::new(),
            free: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn root(&self) -> &web_sys::Element {
        &self.root
    }

    /// Render the whole stack, reusing native nodes where possible.
    pub fn render(&mut self, tree: &mut Tree) -> Result<(), PlatformError> {
        let stack = tree.stack().to_vec();
        let mut nodes = Vec::with_capacity(stack.len());
        for block in &stack {
            nodes.push(self.sync_element(tree, *block)?);
        }
        let root: web_sys::Node = self.root.clone().into();
        reconcile_children(&root, &nodes)?;
        self.collect_garbage(tree);
        tracing::trace!(
            target: "quire::dom",
            blocks = stack.len(),
            slots = self.slots.len() - self.free.len(),
            "rendered"
        );
        Ok(())
    }

    /// The native node last rendered for an element.
    pub fn node_of(&self, tree: &Tree, id: NodeId) -> Option<&web_sys::Node> {
        let handle = tree.get(id)?.rendered()?;
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    /// The element rendered as `node`.
    pub fn element_of(&self, tree: &Tree, node: &web_sys::Node) -> Option<NodeId> {
        tree.document_order().into_iter().find(|id| {
            self.node_of(tree, *id)
                .is_some_and(|rendered| rendered.is_same_node(Some(node)))
        })
    }

    /// The element whose native node is `node` or its nearest ancestor
    /// inside the root.
    pub fn enclosing_element(&self, tree: &Tree, node: &web_sys::Node) -> Option<NodeId> {
        let root: &web_sys::Node = self.root.as_ref();
        let mut current = Some(node.clone());
        while let Some(candidate) = current {
            if candidate.is_same_node(Some(root)) {
                return None;
            }
            if let Some(id) = self.element_of(tree, &candidate) {
                return Some(id);
            }
            current = candidate.parent_node();
        }
        None
    }

    fn sync_element(&mut self, tree: &mut Tree, id: NodeId) -> Result<web_sys::Node, PlatformError> {
        let element = &tree[id];
        let key = element.key();
        let kind = element.kind();
        let bare_text = kind == ElementKind::Text
            && element.marks().is_none()
            && element.styles().is_none();
        let tag = if kind == ElementKind::Text {
            tree.config().text_tag.to_string()
        } else {
            element.tag().to_string()
        };

        let previous = element
            .rendered()
            .or_else(|| self.by_key.get(&key).copied())
            .and_then(|h| self.slots.get(h.0 as usize).cloned().flatten().map(|n| (h, n)));

        let reusable = previous.filter(|(_, node)| {
            if bare_text {
                node.node_type() == web_sys::Node::TEXT_NODE
            } else {
                node.dyn_ref::<web_sys::Element>()
                    .is_some_and(|e| e.local_name().eq_ignore_ascii_case(&tag))
            }
        });

        let (handle, node) = match reusable {
            Some(found) => found,
            None => {
                let node: web_sys::Node = if bare_text {
                    self.document.create_text_node("").into()
                } else {
                    self.document
                        .create_element(&tag)
                        .map_err(|e| format!("create_element {tag} failed: {e:?}"))?
                        .into()
                };
                (self.allocate(node.clone()), node)
            }
        };

        if bare_text {
            let text = tree[id].text();
            if node.node_value().as_deref() != Some(text) {
                node.set_node_value(Some(text));
            }
        } else if let Some(dom) = node.dyn_ref::<web_sys::Element>() {
            patch_attributes(dom, tree, id)?;
            if kind == ElementKind::Text {
                let text = tree[id].text();
                if dom.text_content().as_deref() != Some(text) {
                    dom.set_text_content(Some(text));
                }
            } else if kind.is_container() {
                let children = tree[id].children().to_vec();
                let mut natives = Vec::with_capacity(children.len());
                for child in children {
                    natives.push(self.sync_element(tree, child)?);
                }
                reconcile_children(&node, &natives)?;
            }
        }

        tree.set_rendered(id, Some(handle));
        self.by_key.insert(key, handle);
        Ok(node)
    }

    fn allocate(&mut self, node: web_sys::Node) -> RenderHandle {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                RenderHandle(slot as u64)
            }
            None => {
                self.slots.push(Some(node));
                RenderHandle((self.slots.len() - 1) as u64)
            }
        }
    }

    /// Release slots no attached element points at any more.
    fn collect_garbage(&mut self, tree: &Tree) {
        let live: HashSet<RenderHandle> = tree
            .document_order()
            .into_iter()
            .filter_map(|id| tree[id].rendered())
            .collect();
        self.by_key.retain(|_, handle| live.contains(handle));
        for (slot, node) in self.slots.iter_mut().enumerate() {
            if node.is_some() && !live.contains(&RenderHandle(slot as u64)) {
                *node = None;
                self.free.push(slot);
            }
        }
    }
}

/// Make `parent`'s child list exactly `children`, moving nodes only when
/// they are out of place.
fn reconcile_children(parent: &web_sys::Node, children: &[web_sys::Node]) -> Result<(), PlatformError> {
    for (index, child) in children.iter().enumerate() {
        let current = parent.child_nodes().item(index as u32);
        if current.as_ref().is_some_and(|c| c.is_same_node(Some(child))) {
            continue;
        }
        parent
            .insert_before(child, current.as_ref())
            .map_err(|e| format!("insert_before failed: {e:?}"))?;
    }
    while let Some(extra) = parent.child_nodes().item(children.len() as u32) {
        parent
            .remove_child(&extra)
            .map_err(|e| format!("remove_child failed: {e:?}"))?;
    }
    Ok(())
}

fn patch_attributes(dom: &web_sys::Element, tree: &Tree, id: NodeId) -> Result<(), PlatformError> {
    let element = &tree[id];
    let mut wanted: Vec<(String, String)> = vec![(KEY_ATTRIBUTE.to_string(), element.key().to_string())];
    if let Some(marks) = element.marks() {
        wanted.extend(marks.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    }
    if let Some(styles) = element.styles() {
        let css = styles
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ");
        wanted.push(("style".to_string(), css));
    }

    let names = dom.get_attribute_names();
    for name in names.iter().filter_map(|n| n.as_string()) {
        if !wanted.iter().any(|(k, _)| *k == name) {
            dom.remove_attribute(&name)
                .map_err(|e| format!("remove_attribute {name} failed: {e:?}"))?;
        }
    }
    for (name, value) in wanted {
        if dom.get_attribute(&name).as_deref() != Some(value.as_str()) {
            dom.set_attribute(&name, &value)
                .map_err(|e| format!("set_attribute {name} failed: {e:?}"))?;
        }
    }
    Ok(())
}
