//! Element node types.
//!
//! Elements live in the arena owned by [`Tree`](crate::tree::Tree) and refer to
//! each other by [`NodeId`]. The parent link is a non-owning back reference;
//! ownership flows from containers to their child lists and from the tree to
//! its top-level stack.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

/// Attribute or style map. Ordering is irrelevant to identity; the sorted map
/// keeps serialization deterministic.
pub type Attributes = BTreeMap<SmolStr, SmolStr>;

/// Arena slot of an element inside a [`Tree`](crate::tree::Tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable element identity.
///
/// Fresh keys are minted on construction and on ordinary clones; full clones
/// (history snapshots) keep them, which is what lets a snapshot range and the
/// DOM binding find "the same" element again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to the last native node rendered for an element.
///
/// Assigned and interpreted only by the DOM binding layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Element kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Top-level container; only kind allowed in the stack.
    Block,
    /// Block-like container nested inside a block (list item, table cell).
    /// `block_like` marks inblocks that merge and split like blocks.
    Inblock { block_like: bool },
    /// Inline container (link, styled span).
    Inline,
    /// Self-closing leaf (line break, image, video).
    Closed,
    /// Leaf carrying a string.
    Text,
}

impl ElementKind {
    pub fn is_container(self) -> bool {
        match self {
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => true,
            ElementKind::Closed | ElementKind::Text => false,
        }
    }

    pub fn is_leaf(self) -> bool {
        !self.is_container()
    }

    /// Blocks and block-like inblocks.
    pub fn behaves_as_block(self) -> bool {
        match self {
            ElementKind::Block => true,
            ElementKind::Inblock { block_like } => block_like,
            ElementKind::Inline | ElementKind::Closed | ElementKind::Text => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Block => "block",
            ElementKind::Inblock { .. } => "inblock",
            ElementKind::Inline => "inline",
            ElementKind::Closed => "closed",
            ElementKind::Text => "text",
        }
    }
}

/// A node of the document tree.
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) key: ElementKey,
    pub(crate) kind: ElementKind,
    pub(crate) tag: SmolStr,
    pub(crate) marks: Option<Attributes>,
    pub(crate) styles: Option<Attributes>,
    pub(crate) text: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) rendered: Option<RenderHandle>,
}

impl Element {
    pub(crate) fn new(key: ElementKey, kind: ElementKind, tag: SmolStr) -> Self {
        Self {
            key,
            kind,
            tag,
            marks: None,
            styles: None,
            text: String::new(),
            children: Vec::new(),
            parent: None,
            rendered: None,
        }
    }

    pub fn key(&self) -> ElementKey {
        self.key
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn marks(&self) -> Option<&Attributes> {
        self.marks.as_ref()
    }

    pub fn styles(&self) -> Option<&Attributes> {
        self.styles.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn rendered(&self) -> Option<RenderHandle> {
        self.rendered
    }

    pub fn mark(&self, name: &str) -> Option<&str> {
        self.marks.as_ref()?.get(name).map(|v| v.as_str())
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.as_ref()?.get(name).map(|v| v.as_str())
    }

    /// Char length of a text element; 1 for closed leaves, 0 for containers.
    pub fn leaf_len(&self) -> usize {
        match self.kind {
            ElementKind::Text => self.text.chars().count(),
            ElementKind::Closed => 1,
            ElementKind::Block
            | ElementKind::Inblock { .. }
            | ElementKind::Inline => 0,
        }
    }

    /// Marks and styles compare equal, treating `None` and an empty map alike.
    pub fn same_attributes(&self, other: &Element) -> bool {
        attrs_eq(&self.marks, &other.marks) && attrs_eq(&self.styles, &other.styles)
    }
}

fn attrs_eq(a: &Option<Attributes>, b: &Option<Attributes>) -> bool {
    let empty = Attributes::new();
    a.as_ref().unwrap_or(&empty) == b.as_ref().unwrap_or(&empty)
}

/// Merge `overlay` on top of `base`, keeping `None` when both are empty.
pub(crate) fn merge_attributes(
    base: Option<Attributes>,
    overlay: Option<&Attributes>,
) -> Option<Attributes> {
    let mut merged = base.unwrap_or_default();
    if let Some(overlay) = overlay {
        for (k, v) in overlay {
            merged.insert(k.clone(), v.clone());
        }
    }
    if merged.is_empty() { None } else { Some(merged) }
}

/// Parse a `style` attribute value into a style map.
pub fn parse_style(value: &str) -> Attributes {
    value
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((SmolStr::new(name.to_ascii_lowercase()), SmolStr::new(value)))
        })
        .collect()
}
