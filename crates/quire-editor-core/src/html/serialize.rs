//! Elements → HTML.

use std::fmt::Write;

use crate::config::{NBSP, PLACEHOLDER};
use crate::element::{Element, ElementKind, NodeId};
use crate::mutation::get_elements_by_range;
use crate::tree::Tree;
use crate::types::Point;

/// Serialize every block in the stack.
pub fn render_html(tree: &Tree) -> String {
    let mut out = String::new();
    for block in tree.stack() {
        write_element(tree, *block, &mut out);
    }
    out
}

/// Serialize one element and its subtree.
pub fn element_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_element(tree, id, &mut out);
    out
}

/// Serialize a list of sibling elements back to back.
pub fn children_html(tree: &Tree, children: &[NodeId]) -> String {
    let mut out = String::new();
    for child in children {
        write_element(tree, *child, &mut out);
    }
    out
}

/// Serialize the part of the document between two points. Partially covered
/// texts contribute only their covered characters; when the range spans
/// several blocks, each block's share is wrapped in that block's tag.
pub fn range_html(tree: &Tree, start: &Point, end: &Point) -> String {
    let mut out = String::new();
    let spans_blocks = tree.get_block(start.element) != tree.get_block(end.element);
    let mut open: Option<NodeId> = None;
    for item in get_elements_by_range(tree, start, end) {
        let block = tree.get_block(item.element);
        if spans_blocks && block != open {
            if let Some(previous) = open.take() {
                close_tag(&tree[previous], &mut out);
            }
            if let Some(block) = block.filter(|b| *b != item.element) {
                open_tag(&tree[block], &mut out);
                open = Some(block);
            }
        }
        let element = &tree[item.element];
        match (item.offsets, element.kind()) {
            (Some((from, to)), ElementKind::Text) => {
                let slice: String = element.text().chars().skip(from).take(to - from).collect();
                if element.marks().is_none() && element.styles().is_none() {
                    escape_text(&slice, &mut out);
                } else {
                    open_tag(element, &mut out);
                    escape_text(&slice, &mut out);
                    close_tag(element, &mut out);
                }
            }
            _ => write_element(tree, item.element, &mut out),
        }
    }
    if let Some(block) = open {
        close_tag(&tree[block], &mut out);
    }
    out
}

/// Plain text between two points, one line per block.
pub fn range_text(tree: &Tree, start: &Point, end: &Point) -> String {
    let mut out = String::new();
    let mut last_block = None;
    for item in get_elements_by_range(tree, start, end) {
        let block = tree.get_block(item.element);
        if last_block.is_some() && block != last_block {
            out.push('\n');
        }
        last_block = block;
        let text = match item.offsets {
            Some((from, to)) => tree[item.element]
                .text()
                .chars()
                .skip(from)
                .take(to - from)
                .collect(),
            None => tree.text_content(item.element),
        };
        out.extend(text.chars().filter(|c| *c != PLACEHOLDER).map(|c| match c {
            NBSP => ' ',
            c => c,
        }));
    }
    out
}

fn write_element(tree: &Tree, id: NodeId, out: &mut String) {
    let element = &tree[id];
    match element.kind() {
        ElementKind::Text => {
            if element.marks().is_none() && element.styles().is_none() {
                escape_text(element.text(), out);
            } else {
                open_tag(element, out);
                escape_text(element.text(), out);
                close_tag(element, out);
            }
        }
        ElementKind::Closed => open_tag(element, out),
        ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
            open_tag(element, out);
            for child in element.children() {
                write_element(tree, *child, out);
            }
            close_tag(element, out);
        }
    }
}

fn open_tag(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(element.tag());
    if let Some(marks) = element.marks() {
        for (name, value) in marks {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
    }
    if let Some(styles) = element.styles() {
        let mut css = String::new();
        for (name, value) in styles {
            let _ = write!(css, "{name}: {value}; ");
        }
        out.push_str(" style=\"");
        escape_attr(css.trim_end(), out);
        out.push('"');
    }
    out.push('>');
}

fn close_tag(element: &Element, out: &mut String) {
    out.push_str("</");
    out.push_str(element.tag());
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            NBSP => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_escaping() {
        let mut tree = Tree::default();
        let p = tree.create(ElementKind::Block, "p");
        let t = tree.create_text("a<b> & c\u{00A0}d");
        tree.push_block(p).unwrap();
        tree.append_child(p, t).unwrap();
        insta::assert_snapshot!(render_html(&tree), @"<p>a&lt;b&gt; &amp; c&nbsp;d</p>");
    }

    #[test]
    fn test_attributes_sorted_and_styles_last() {
        let mut tree = Tree::default();
        let p = tree.create(ElementKind::Block, "p");
        let img = tree.create(ElementKind::Closed, "img");
        tree.set_mark(img, "src", "a.png");
        tree.set_mark(img, "alt", "say \"hi\"");
        tree.set_style(img, "width", "10px");
        tree.set_style(img, "height", "5px");
        tree.push_block(p).unwrap();
        tree.append_child(p, img).unwrap();
        insta::assert_snapshot!(
            element_html(&tree, p),
            @r#"<p><img alt="say &quot;hi&quot;" src="a.png" style="height: 5px; width: 10px;"></p>"#
        );
    }

    #[test]
    fn test_range_serialization() {
        let mut tree = Tree::default();
        let p1 = tree.create(ElementKind::Block, "p");
        let ab = tree.create_text("ab");
        tree.set_style(ab, "color", "red");
        let p2 = tree.create(ElementKind::Block, "p");
        let cd = tree.create_text("c\u{00A0}d");
        tree.push_block(p1).unwrap();
        tree.append_child(p1, ab).unwrap();
        tree.push_block(p2).unwrap();
        tree.append_child(p2, cd).unwrap();

        let start = Point { element: ab, offset: 1 };
        let end = Point { element: cd, offset: 3 };
        insta::assert_snapshot!(
            range_html(&tree, &start, &end),
            @r#"<p><span style="color: red;">b</span></p><p>c&nbsp;d</p>"#
        );
        assert_eq!(range_text(&tree, &start, &end), "b\nc d");
    }

    #[test]
    fn test_styled_text_gets_wrapper() {
        let mut tree = Tree::default();
        let t = tree.create_text("bold");
        tree.set_style(t, "font-weight", "bold");
        insta::assert_snapshot!(
            element_html(&tree, t),
            @r#"<span style="font-weight: bold;">bold</span>"#
        );
    }
}
