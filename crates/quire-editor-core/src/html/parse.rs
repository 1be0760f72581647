//! HTML fragment → elements.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, local_name, namespace_url, ns, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::actions::InlineFormat;
use crate::element::{NodeId, parse_style};
use crate::error::{EditorError, Result};
use crate::render::ParseHook;
use crate::tree::Tree;

/// Tags whose content never becomes part of the document.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "template", "head", "meta", "link", "title", "noscript",
];

/// Parse an HTML fragment into detached top-level elements.
///
/// The result is not normalized: callers attach the elements and run a
/// formatting pass.
pub fn parse_html(tree: &mut Tree, html: &str, hook: &dyn ParseHook) -> Result<Vec<NodeId>> {
    parse_fragment_into(tree, html, hook, false)
}

/// Parse with whitespace handling already inside preformatted text.
pub(crate) fn parse_fragment_into(
    tree: &mut Tree,
    html: &str,
    hook: &dyn ParseHook,
    preformatted: bool,
) -> Result<Vec<NodeId>> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("body")),
        vec![],
    )
    .one(html);

    // The fragment parser wraps the content in a single <html> element.
    let root = dom
        .document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, NodeData::Element { name, .. } if &*name.local == "html"))
        .cloned()
        .ok_or_else(|| EditorError::Parse("fragment parser produced no root element".into()))?;

    let mut out = Vec::new();
    for child in root.children.borrow().iter() {
        parse_node(tree, child, hook, preformatted, &mut out);
    }
    tracing::debug!(
        target: "quire::parse",
        bytes = html.len(),
        elements = out.len(),
        "parsed html fragment"
    );
    Ok(out)
}

/// Convert one DOM node (and its subtree) into detached elements appended
/// to `out`.
pub fn parse_node(
    tree: &mut Tree,
    handle: &Handle,
    hook: &dyn ParseHook,
    preformatted: bool,
    out: &mut Vec<NodeId>,
) {
    match &handle.data {
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            // Indentation between tags.
            let formatting = text.contains('\n') && text.trim().is_empty();
            if text.is_empty() || (formatting && !preformatted) {
                return;
            }
            let id = tree.create_text(text);
            hook.on_element(tree, id);
            out.push(id);
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_ascii_lowercase().to_string();
            if SKIPPED_TAGS.contains(&tag.as_str()) {
                tracing::trace!(target: "quire::parse", tag = %tag, "skipped element");
                return;
            }
            let config = tree.config_arc();
            let legacy = InlineFormat::from_tag(&tag).map(InlineFormat::declaration);
            let tag = match legacy {
                Some(_) => config.text_tag.to_string(),
                None => tag,
            };
            let kind = config.classify(&tag);
            let id = tree.create(kind, tag.as_str());

            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.to_ascii_lowercase().to_string();
                let value = attr.value.to_string();
                if attr_name == "style" {
                    for (name, value) in parse_style(&value) {
                        tree.set_style(id, name, value);
                    }
                } else {
                    tree.set_mark(id, attr_name, value);
                }
            }
            if let Some((name, value)) = legacy {
                tree.set_style(id, name, value);
            }

            if kind.is_container() {
                let preformatted = preformatted || config.is_pre_tag(&tag);
                let mut children = Vec::new();
                for child in handle.children.borrow().iter() {
                    parse_node(tree, child, hook, preformatted, &mut children);
                }
                for child in children {
                    tree.link_child(id, child, None);
                }
            }
            hook.on_element(tree, id);
            out.push(id);
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => {}
    }
}
