//! Inline marks and styles over the selection.

use smol_str::SmolStr;

use crate::config::PLACEHOLDER;
use crate::document::Editor;
use crate::element::{Attributes, ElementKind, NodeId};
use crate::error::Result;
use crate::mutation::{get_elements_by_range, split_texts_by_range};
use crate::tree::Tree;
use crate::types::{Point, Range};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttributeSet {
    Marks,
    Styles,
}

impl AttributeSet {
    fn read(self, tree: &Tree, id: NodeId) -> Option<Attributes> {
        match self {
            AttributeSet::Marks => tree[id].marks().cloned(),
            AttributeSet::Styles => tree[id].styles().cloned(),
        }
    }

    fn write(self, tree: &mut Tree, id: NodeId, attributes: Attributes) {
        match self {
            AttributeSet::Marks => tree.set_marks(id, Some(attributes)),
            AttributeSet::Styles => tree.set_styles(id, Some(attributes)),
        }
    }

    fn lookup(self, tree: &Tree, id: NodeId, name: &str) -> Option<SmolStr> {
        let value = match self {
            AttributeSet::Marks => tree[id].mark(name),
            AttributeSet::Styles => tree[id].style(name),
        };
        value.map(SmolStr::new)
    }
}

fn to_attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
        .collect()
}

impl Editor {
    /// Apply style declarations to the selected text. A collapsed caret gets
    /// a styled placeholder so the next typed text picks the style up.
    pub fn set_text_style(&mut self, styles: &[(&str, &str)]) -> Result<()> {
        let styles = to_attributes(styles);
        self.transact("set_text_style", |ed| {
            ed.restyle_texts(AttributeSet::Styles, |attrs| attrs.extend(styles.clone()))
        })
    }

    /// Remove the named style declarations; an empty list removes all.
    pub fn remove_text_style(&mut self, names: &[&str]) -> Result<()> {
        self.transact("remove_text_style", |ed| {
            ed.restyle_texts(AttributeSet::Styles, |attrs| strip(attrs, names))
        })
    }

    pub fn set_text_mark(&mut self, marks: &[(&str, &str)]) -> Result<()> {
        let marks = to_attributes(marks);
        self.transact("set_text_mark", |ed| {
            ed.restyle_texts(AttributeSet::Marks, |attrs| attrs.extend(marks.clone()))
        })
    }

    pub fn remove_text_mark(&mut self, names: &[&str]) -> Result<()> {
        self.transact("remove_text_mark", |ed| {
            ed.restyle_texts(AttributeSet::Marks, |attrs| strip(attrs, names))
        })
    }

    /// True when every selected text carries the style, on itself or an
    /// ancestor. With `value`, the declaration must also match it.
    pub fn query_text_style(&self, name: &str, value: Option<&str>) -> bool {
        self.query(AttributeSet::Styles, name, value)
    }

    pub fn query_text_mark(&self, name: &str, value: Option<&str>) -> bool {
        self.query(AttributeSet::Marks, name, value)
    }

    /// Split the texts at the selection boundaries so the selection covers
    /// whole text elements, and return them. The tree is not formatted (that
    /// would merge the pieces back); call [`Editor::commit`] once the caller
    /// has finished with them.
    pub fn split_elements_by_range(&mut self) -> Result<Vec<NodeId>> {
        if self.disabled {
            return Ok(Vec::new());
        }
        let Some(range) = self.range else {
            return Ok(Vec::new());
        };
        self.ensure_attached(&range.anchor)?;
        self.ensure_attached(&range.focus)?;
        let backwards = range.is_backwards(&self.tree);
        let (start, end) = range.ordered(&self.tree);

        let saved_tree = self.tree.clone();
        match split_texts_by_range(&mut self.tree, start, end) {
            Ok((texts, start, end)) => {
                if !texts.is_empty() {
                    self.range = Some(directed(start, end, backwards));
                }
                self.generation += 1;
                tracing::debug!(
                    target: "quire::mutation",
                    texts = texts.len(),
                    "split elements by range"
                );
                Ok(texts)
            }
            Err(err) => {
                tracing::warn!(target: "quire::mutation", %err, "split rolled back");
                self.tree = saved_tree;
                self.range = Some(range);
                Err(err)
            }
        }
    }

    fn restyle_texts(
        &mut self,
        set: AttributeSet,
        edit: impl Fn(&mut Attributes),
    ) -> Result<bool> {
        let Some(range) = self.range else {
            return Ok(false);
        };
        self.ensure_attached(&range.anchor)?;
        self.ensure_attached(&range.focus)?;

        if range.is_collapsed() {
            let point = range.focus;
            if self.tree.is_space_text(point.element) {
                let mut attrs = set.read(&self.tree, point.element).unwrap_or_default();
                edit(&mut attrs);
                set.write(&mut self.tree, point.element, attrs);
                return Ok(true);
            }
            let holder = self.tree.create_text(PLACEHOLDER.to_string());
            if self.tree.is_text(point.element) {
                let marks = self.tree[point.element].marks().cloned();
                let styles = self.tree[point.element].styles().cloned();
                self.tree.set_marks(holder, marks);
                self.tree.set_styles(holder, styles);
            }
            let mut attrs = set.read(&self.tree, holder).unwrap_or_default();
            edit(&mut attrs);
            set.write(&mut self.tree, holder, attrs);
            self.place_inline(holder, point)?;
            self.set_caret(Point {
                element: holder,
                offset: 1,
            });
            return Ok(true);
        }

        let backwards = range.is_backwards(&self.tree);
        let (start, end) = range.ordered(&self.tree);
        let (texts, start, end) = split_texts_by_range(&mut self.tree, start, end)?;
        if texts.is_empty() {
            return Ok(false);
        }
        for text in &texts {
            let mut attrs = set.read(&self.tree, *text).unwrap_or_default();
            edit(&mut attrs);
            set.write(&mut self.tree, *text, attrs);
        }
        tracing::trace!(target: "quire::mutation", texts = texts.len(), ?set, "restyled");
        self.range = Some(directed(start, end, backwards));
        Ok(true)
    }

    fn query(&self, set: AttributeSet, name: &str, value: Option<&str>) -> bool {
        let texts = self.covered_texts();
        !texts.is_empty()
            && texts.iter().all(|text| {
                std::iter::once(*text)
                    .chain(self.tree.ancestors(*text))
                    .find_map(|id| set.lookup(&self.tree, id, name))
                    .is_some_and(|found| value.is_none_or(|v| found.as_str() == v))
            })
    }

    /// Texts with at least one selected character, or the caret's text.
    fn covered_texts(&self) -> Vec<NodeId> {
        let Some(range) = self.range else {
            return Vec::new();
        };
        let tree = &self.tree;
        if !tree.contains_node(range.focus.element) || !tree.is_attached(range.focus.element) {
            return Vec::new();
        }
        if range.is_collapsed() {
            return if tree.is_text(range.focus.element) {
                vec![range.focus.element]
            } else {
                Vec::new()
            };
        }
        let (start, end) = range.ordered(tree);
        get_elements_by_range(tree, &start, &end)
            .into_iter()
            .flat_map(|item| match item.offsets {
                Some((from, to)) if from < to => vec![item.element],
                Some(_) => Vec::new(),
                None => tree.flat_elements(&[item.element]),
            })
            .filter(|id| tree[*id].kind() == ElementKind::Text && !tree[*id].text().is_empty())
            .collect()
    }
}

fn strip(attrs: &mut Attributes, names: &[&str]) {
    if names.is_empty() {
        attrs.clear();
    } else {
        attrs.retain(|k, _| !names.contains(&k.as_str()));
    }
}

fn directed(start: Point, end: Point, backwards: bool) -> Range {
    if backwards {
        Range::new(end, start)
    } else {
        Range::new(start, end)
    }
}
