//! Typing, paragraph splitting, element insertion and paste.

use crate::config::{NBSP, PLACEHOLDER};
use crate::document::Editor;
use crate::element::{ElementKind, NodeId};
use crate::error::{EditorError, Result};
use crate::html::parse_html;
use crate::mutation::{
    Edge, caret_edge, delete_span, holds_only_break, is_preformatted, split_text,
};
use crate::render::ParseHook;
use crate::text_helpers::{char_len, insert_at};
use crate::tree::Tree;
use crate::types::Point;

impl Editor {
    /// Type `text` at the caret, replacing any selection.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        self.transact("insert_text", |ed| ed.insert_text_inner(text))
    }

    /// Split the enclosing container at the caret (Enter).
    pub fn insert_paragraph(&mut self) -> Result<()> {
        self.transact("insert_paragraph", |ed| ed.insert_paragraph_inner())
    }

    /// Soft line break (Shift+Enter). Inside preformatted text this is a
    /// newline; elsewhere it splits the container like Enter.
    pub fn insert_line_break(&mut self) -> Result<()> {
        self.transact("insert_line_break", |ed| {
            let Some(point) = ed.collapsed_point()? else {
                return Ok(false);
            };
            if is_preformatted(&ed.tree, point.element) {
                ed.insert_newline(point)
            } else {
                ed.insert_paragraph_inner()
            }
        })
    }

    /// Insert a detached element at the caret. With `cover`, a container
    /// holding only a line break is replaced instead of split.
    pub fn insert_element(&mut self, element: NodeId, cover: bool) -> Result<()> {
        self.transact("insert_element", |ed| ed.insert_element_inner(element, cover))
    }

    /// Paste plain text; each line after the first starts a new paragraph.
    pub fn paste_text(&mut self, text: &str) -> Result<()> {
        self.transact("paste_text", |ed| ed.paste_text_inner(text))
    }

    /// Paste an HTML fragment.
    pub fn paste_html(&mut self, html: &str) -> Result<()> {
        self.transact("paste_html", |ed| ed.paste_html_inner(html))
    }

    pub(crate) fn insert_text_inner(&mut self, text: &str) -> Result<bool> {
        if text.is_empty() {
            return Ok(false);
        }
        let Some(point) = self.collapsed_point()? else {
            return Ok(false);
        };
        let text = if is_preformatted(&self.tree, point.element) {
            text.to_string()
        } else {
            text.chars()
                .map(|c| if c.is_whitespace() && !matches!(c, '\n' | '\r') { NBSP } else { c })
                .collect()
        };
        let (host, start) = self.place_text(point, &text)?;
        self.set_caret(Point {
            element: host,
            offset: start + char_len(&text),
        });
        Ok(true)
    }

    /// Put raw text at `point`, returning the host text element and the
    /// offset where the new text starts.
    fn place_text(&mut self, point: Point, text: &str) -> Result<(NodeId, usize)> {
        let leaf = point.element;
        match self.tree[leaf].kind() {
            ElementKind::Text if self.tree.is_space_text(leaf) => {
                self.tree.set_text(leaf, text)?;
                Ok((leaf, 0))
            }
            ElementKind::Text => {
                insert_at(&mut self.tree[leaf].text, point.offset, text);
                Ok((leaf, point.offset))
            }
            ElementKind::Closed => {
                let node = self.tree.create_text(text);
                let container = self.container_of(leaf)?;
                if self.tree.is_break(leaf) && holds_only_break(&self.tree, container) {
                    self.tree.replace(leaf, node)?;
                } else if point.offset == 0 {
                    self.tree.insert_before(leaf, node)?;
                } else {
                    self.tree.insert_after(leaf, node)?;
                }
                Ok((node, 0))
            }
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                Err(EditorError::structure(format!(
                    "caret on {} element {}",
                    self.tree[leaf].kind().name(),
                    self.tree[leaf].key()
                )))
            }
        }
    }

    /// Newline inside preformatted text. A newline that ends the content
    /// gets a placeholder after it so the new line can hold the caret.
    fn insert_newline(&mut self, point: Point) -> Result<bool> {
        let container = self.container_of(point.element)?;
        let text = if caret_edge(&self.tree, container, &point) == Edge::End {
            format!("\n{PLACEHOLDER}")
        } else {
            "\n".to_string()
        };
        let (host, start) = self.place_text(point, &text)?;
        self.set_caret(Point {
            element: host,
            offset: start + 1,
        });
        Ok(true)
    }

    pub(crate) fn insert_paragraph_inner(&mut self) -> Result<bool> {
        let Some(point) = self.collapsed_point()? else {
            return Ok(false);
        };
        if is_preformatted(&self.tree, point.element) {
            return self.insert_newline(point);
        }
        let container = self.container_of(point.element)?;
        match caret_edge(&self.tree, container, &point) {
            Edge::Start => {
                let twin = self.empty_twin(container);
                self.tree.insert_before(container, twin)?;
            }
            Edge::End => {
                let twin = self.empty_twin(container);
                self.tree.insert_after(container, twin)?;
                self.set_caret(Point::start_of(&self.tree, twin)?);
            }
            Edge::Middle => {
                let tail = self.split_middle(container, point)?;
                self.set_caret(Point::start_of(&self.tree, tail)?);
            }
        }
        Ok(true)
    }

    /// Shallow clone of `container` holding a single line break.
    fn empty_twin(&mut self, container: NodeId) -> NodeId {
        let twin = self.tree.clone_element(container, false);
        let br = self.tree.create_break();
        self.tree.link_child(twin, br, None);
        twin
    }

    /// Split `container` at `point`: a deep clone goes right after it, the
    /// original loses everything after the point and the clone everything
    /// before it. Returns the clone.
    fn split_middle(&mut self, container: NodeId, point: Point) -> Result<NodeId> {
        let index = self
            .tree
            .flat_elements(&[container])
            .iter()
            .position(|n| *n == point.element)
            .ok_or_else(|| {
                EditorError::contract(format!(
                    "caret is not inside container {}",
                    self.tree[container].key()
                ))
            })?;

        let clone = self.tree.clone_element(container, true);
        self.tree.insert_after(container, clone)?;

        let tail_end = Point::end_of(&self.tree, container)?;
        delete_span(&mut self.tree, &point, &tail_end);

        let twin = self
            .tree
            .flat_elements(&[clone])
            .get(index)
            .copied()
            .ok_or_else(|| EditorError::structure("split clone lost its shape"))?;
        let head_start = Point::start_of(&self.tree, clone)?;
        delete_span(
            &mut self.tree,
            &head_start,
            &Point {
                element: twin,
                offset: point.offset,
            },
        );
        tracing::trace!(
            target: "quire::mutation",
            key = %self.tree[container].key(),
            "split container"
        );
        Ok(clone)
    }

    pub(crate) fn insert_element_inner(&mut self, element: NodeId, cover: bool) -> Result<bool> {
        if !self.tree.contains_node(element) || !self.tree.is_detached(element) {
            return Err(EditorError::contract(format!(
                "inserted element {element:?} must be detached"
            )));
        }
        if self.tree.is_empty(element) {
            return Ok(false);
        }
        let Some(point) = self.collapsed_point()? else {
            return Ok(false);
        };
        let container = self.container_of(point.element)?;

        match self.tree[element].kind() {
            ElementKind::Block => {
                let block = self.tree.get_block(point.element).ok_or_else(|| {
                    EditorError::structure("caret is not inside a block")
                })?;
                self.place_beside(block, element, point, cover)?;
            }
            ElementKind::Inblock { block_like: true }
                if self.tree[container].kind() == (ElementKind::Inblock { block_like: true }) =>
            {
                self.place_beside(container, element, point, cover)?;
            }
            ElementKind::Inblock { .. } => self.place_inside(container, element, point, cover)?,
            ElementKind::Inline | ElementKind::Closed | ElementKind::Text => {
                self.place_inline(element, point)?
            }
        }

        match Point::end_of(&self.tree, element) {
            Ok(end) => self.set_caret(end),
            Err(_) => self.settle_caret(),
        }
        Ok(true)
    }

    /// Place a container next to `anchor`: before it, after it, or between
    /// the halves of a split.
    fn place_beside(
        &mut self,
        anchor: NodeId,
        element: NodeId,
        point: Point,
        cover: bool,
    ) -> Result<()> {
        if cover && holds_only_break(&self.tree, anchor) {
            return self.tree.replace(anchor, element);
        }
        match caret_edge(&self.tree, anchor, &point) {
            Edge::Start => self.tree.insert_before(anchor, element),
            Edge::End => self.tree.insert_after(anchor, element),
            Edge::Middle => {
                self.split_middle(anchor, point)?;
                self.tree.insert_after(anchor, element)
            }
        }
    }

    /// Place an inblock as a child of `container` at the caret.
    fn place_inside(
        &mut self,
        container: NodeId,
        element: NodeId,
        point: Point,
        cover: bool,
    ) -> Result<()> {
        if cover && holds_only_break(&self.tree, container) {
            let leaves = self.tree.caret_leaves(container);
            if let Some(br) = leaves.first() {
                return self.tree.replace(*br, element);
            }
        }
        match caret_edge(&self.tree, container, &point) {
            Edge::Start => self.tree.insert_child(container, 0, element),
            Edge::End => self.tree.append_child(container, element),
            Edge::Middle => {
                let tail = self.split_middle(container, point)?;
                self.tree.append_child(container, element)?;
                self.tree.move_children(tail, container);
                self.tree.detach(tail);
                Ok(())
            }
        }
    }

    /// Place an inline, closed or text element at a leaf caret.
    pub(crate) fn place_inline(&mut self, element: NodeId, point: Point) -> Result<()> {
        let leaf = point.element;
        match self.tree[leaf].kind() {
            ElementKind::Text => {
                if self.tree.is_space_text(leaf) {
                    self.tree.replace(leaf, element)
                } else if point.offset == 0 {
                    self.tree.insert_before(leaf, element)
                } else if point.offset >= self.tree.leaf_len(leaf) {
                    self.tree.insert_after(leaf, element)
                } else {
                    split_text(&mut self.tree, leaf, point.offset)?;
                    self.tree.insert_after(leaf, element)
                }
            }
            ElementKind::Closed => {
                let container = self.container_of(leaf)?;
                if self.tree.is_break(leaf) && holds_only_break(&self.tree, container) {
                    self.tree.replace(leaf, element)
                } else if point.offset == 0 {
                    self.tree.insert_before(leaf, element)
                } else {
                    self.tree.insert_after(leaf, element)
                }
            }
            ElementKind::Block | ElementKind::Inblock { .. } | ElementKind::Inline => {
                Err(EditorError::structure(format!(
                    "caret on {} element {}",
                    self.tree[leaf].kind().name(),
                    self.tree[leaf].key()
                )))
            }
        }
    }

    fn paste_text_inner(&mut self, text: &str) -> Result<bool> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let Some(point) = self.collapsed_point()? else {
            return Ok(false);
        };
        if is_preformatted(&self.tree, point.element) {
            if text.is_empty() {
                return Ok(false);
            }
            let (host, start) = self.place_text(point, &text)?;
            self.set_caret(Point {
                element: host,
                offset: start + char_len(&text),
            });
            return Ok(true);
        }
        let mut changed = false;
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                changed |= self.insert_paragraph_inner()?;
            }
            changed |= self.insert_text_inner(line)?;
        }
        Ok(changed)
    }

    fn paste_html_inner(&mut self, html: &str) -> Result<bool> {
        let hook: &dyn ParseHook = match self.parse_hook.as_deref() {
            Some(hook) => hook,
            None => &(),
        };
        let nodes = parse_html(&mut self.tree, html, hook)?;
        let mut changed = false;
        let mut previous: Option<NodeId> = None;
        let inline_level = |tree: &Tree, id: NodeId| {
            matches!(
                tree[id].kind(),
                ElementKind::Inline | ElementKind::Closed | ElementKind::Text
            )
        };
        for (i, node) in nodes.into_iter().enumerate() {
            if self.tree.is_empty(node) {
                continue;
            }
            // Consecutive inline nodes stay siblings instead of nesting into
            // the last leaf of the one before.
            match previous {
                Some(prev)
                    if inline_level(&self.tree, node)
                        && inline_level(&self.tree, prev)
                        && self.tree.is_attached(prev) =>
                {
                    self.tree.insert_after(prev, node)?;
                    match Point::end_of(&self.tree, node) {
                        Ok(end) => self.set_caret(end),
                        Err(_) => self.settle_caret(),
                    }
                    changed = true;
                }
                _ => changed |= self.insert_element_inner(node, i == 0)?,
            }
            previous = Some(node);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EditorConfig;
    use crate::document::Editor;
    use crate::types::{Point, Range};

    fn editor(html: &str) -> Editor {
        Editor::with_html(EditorConfig::default(), html).unwrap()
    }

    fn caret_in(editor: &mut Editor, text: &str, offset: usize) {
        let leaf = editor
            .tree()
            .document_order()
            .into_iter()
            .find(|n| editor.tree()[*n].text() == text)
            .unwrap();
        editor
            .set_range(Range::collapsed(Point { element: leaf, offset }))
            .unwrap();
    }

    fn caret_text(editor: &Editor) -> (String, usize) {
        let caret = editor.range().unwrap().focus;
        (editor.tree()[caret.element].text().to_string(), caret.offset)
    }

    #[test]
    fn test_typing_replaces_lone_break() {
        let mut ed = Editor::default();
        ed.insert_text("ab").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>ab</p>");
        assert_eq!(caret_text(&ed), ("ab".to_string(), 2));
    }

    #[test]
    fn test_spaces_become_nbsp_outside_pre() {
        let mut ed = editor("<p>ab</p><pre>x</pre>");
        caret_in(&mut ed, "ab", 1);
        ed.insert_text(" ").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>a&nbsp;b</p><pre>x</pre>");

        caret_in(&mut ed, "x", 1);
        ed.insert_text(" y").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>a&nbsp;b</p><pre>x y</pre>");
    }

    #[test]
    fn test_tabs_and_wide_spaces_become_nbsp_outside_pre() {
        let mut ed = editor("<p>ab</p><pre>x</pre>");
        caret_in(&mut ed, "ab", 1);
        ed.insert_text("\t\u{3000}").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>a&nbsp;&nbsp;b</p><pre>x</pre>");

        caret_in(&mut ed, "x", 1);
        ed.insert_text("\t").unwrap();
        assert_eq!(ed.html(), "<p>a&nbsp;&nbsp;b</p><pre>x\t</pre>");
    }

    #[test]
    fn test_typing_over_selection() {
        let mut ed = editor("<p>hello</p>");
        let leaf = ed.range().unwrap().focus.element;
        ed.set_range(Range::new(
            Point { element: leaf, offset: 1 },
            Point { element: leaf, offset: 4 },
        ))
        .unwrap();
        ed.insert_text("ipp").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>hippo</p>");
        assert_eq!(caret_text(&ed), ("hippo".to_string(), 4));
    }

    #[test]
    fn test_enter_at_end_adds_empty_paragraph() {
        let mut ed = editor("<p>ab</p>");
        caret_in(&mut ed, "ab", 2);
        ed.insert_paragraph().unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>ab</p><p><br></p>");
        let caret = ed.range().unwrap().focus;
        assert!(ed.tree().is_break(caret.element));
        assert_eq!(ed.tree().get_block(caret.element), Some(ed.tree().stack()[1]));
    }

    #[test]
    fn test_enter_at_start_pushes_content_down() {
        let mut ed = editor("<h1>ab</h1>");
        caret_in(&mut ed, "ab", 0);
        ed.insert_paragraph().unwrap();
        insta::assert_snapshot!(ed.html(), @"<h1><br></h1><h1>ab</h1>");
        assert_eq!(caret_text(&ed), ("ab".to_string(), 0));
    }

    #[test]
    fn test_enter_splits_styled_content() {
        let mut ed = editor("<p>a<b>bc</b>d</p>");
        caret_in(&mut ed, "bc", 1);
        ed.insert_paragraph().unwrap();
        insta::assert_snapshot!(
            ed.html(),
            @r#"<p>a<span style="font-weight: bold;">b</span></p><p><span style="font-weight: bold;">c</span>d</p>"#
        );
        assert_eq!(caret_text(&ed), ("c".to_string(), 0));
    }

    #[test]
    fn test_enter_in_list_item_adds_item() {
        let mut ed = editor("<ul><li>one</li></ul>");
        caret_in(&mut ed, "one", 3);
        ed.insert_paragraph().unwrap();
        ed.insert_text("two").unwrap();
        insta::assert_snapshot!(ed.html(), @"<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_enter_in_pre_inserts_newline() {
        let mut ed = editor("<pre>ab</pre>");
        caret_in(&mut ed, "ab", 1);
        ed.insert_paragraph().unwrap();
        assert_eq!(ed.html(), "<pre>a\nb</pre>");
        assert_eq!(caret_text(&ed), ("a\nb".to_string(), 2));

        caret_in(&mut ed, "a\nb", 3);
        ed.insert_line_break().unwrap();
        assert_eq!(caret_text(&ed), ("a\nb\n\u{FEFF}".to_string(), 4));
    }

    #[test]
    fn test_insert_inline_element_splits_text() {
        let mut ed = editor("<p>abcd</p>");
        caret_in(&mut ed, "abcd", 2);
        let img = ed.tree_mut().create(crate::element::ElementKind::Closed, "img");
        ed.tree_mut().set_mark(img, "src", "x.png");
        ed.insert_element(img, false).unwrap();
        insta::assert_snapshot!(ed.html(), @r#"<p>ab<img src="x.png">cd</p>"#);
        assert_eq!(ed.range().unwrap().focus, Point { element: img, offset: 1 });
    }

    #[test]
    fn test_insert_block_splits_paragraph() {
        let mut ed = editor("<p>abcd</p>");
        caret_in(&mut ed, "abcd", 2);
        let rule = ed.tree_mut().create_text("rule");
        let div = ed.tree_mut().create(crate::element::ElementKind::Block, "div");
        ed.tree_mut().append_child(div, rule).unwrap();
        ed.insert_element(div, false).unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>ab</p><div>rule</div><p>cd</p>");
        assert_eq!(caret_text(&ed), ("rule".to_string(), 4));
    }

    #[test]
    fn test_insert_list_item_beside_split_item() {
        let mut ed = editor("<ul><li>one</li><li>two</li></ul>");
        caret_in(&mut ed, "one", 1);
        let text = ed.tree_mut().create_text("new");
        let li = ed
            .tree_mut()
            .create(crate::element::ElementKind::Inblock { block_like: true }, "li");
        ed.tree_mut().append_child(li, text).unwrap();
        ed.insert_element(li, false).unwrap();
        insta::assert_snapshot!(
            ed.html(),
            @"<ul><li>o</li><li>new</li><li>ne</li><li>two</li></ul>"
        );
        assert_eq!(caret_text(&ed), ("new".to_string(), 3));
    }

    #[test]
    fn test_insert_inblock_inside_split_cell() {
        let mut ed = editor("<table><tbody><tr><td>abcd</td></tr></tbody></table>");
        caret_in(&mut ed, "abcd", 2);
        let text = ed.tree_mut().create_text("fig");
        let figure = ed
            .tree_mut()
            .create(crate::element::ElementKind::Inblock { block_like: false }, "figure");
        ed.tree_mut().append_child(figure, text).unwrap();
        ed.insert_element(figure, false).unwrap();
        insta::assert_snapshot!(
            ed.html(),
            @"<table><tbody><tr><td>ab<figure>fig</figure>cd</td></tr></tbody></table>"
        );
        let cell = ed.tree().get_inblock(figure).unwrap();
        assert_eq!(ed.tree()[cell].tag(), "td");
        assert_eq!(ed.tree()[cell].children().len(), 3);
        assert_eq!(caret_text(&ed), ("fig".to_string(), 3));
    }

    #[test]
    fn test_insert_attached_element_is_contract_error() {
        let mut ed = editor("<p>ab</p>");
        let p = ed.tree().stack()[0];
        let err = ed.insert_element(p, false).unwrap_err();
        assert!(matches!(err, crate::error::EditorError::Contract(_)));
    }

    #[test]
    fn test_paste_text_lines_become_paragraphs() {
        let mut ed = Editor::default();
        ed.paste_text("one\r\ntwo").unwrap();
        insta::assert_snapshot!(ed.html(), @"<p>one</p><p>two</p>");
    }

    #[test]
    fn test_paste_html_covers_empty_paragraph() {
        let mut ed = Editor::default();
        ed.paste_html("<h2>title</h2><p>body</p>").unwrap();
        insta::assert_snapshot!(ed.html(), @"<h2>title</h2><p>body</p>");
        assert_eq!(caret_text(&ed), ("body".to_string(), 4));
    }

    #[test]
    fn test_paste_html_inline_into_text() {
        let mut ed = editor("<p>ad</p>");
        caret_in(&mut ed, "ad", 1);
        ed.paste_html("<b>b</b>c").unwrap();
        insta::assert_snapshot!(
            ed.html(),
            @r#"<p>a<span style="font-weight: bold;">b</span>cd</p>"#
        );
    }
}
