//! The editor facade.
//!
//! `Editor` owns the tree, the range, the history and the consumer hooks.
//! Every public structural operation runs through [`Editor::transact`]:
//! the operation mutates the tree, then the tree is highlighted, formatted
//! and swept, and the result is committed to history. An operation that
//! fails leaves the tree and range exactly as they were before it started.

use std::sync::Arc;

use crate::config::EditorConfig;
use crate::element::NodeId;
use crate::error::{EditorError, Result};
use crate::format::{FormatRule, Formatter};
use crate::html::{highlight_code_blocks, parse_html, range_html, range_text, render_html};
use crate::render::{Highlighter, MergeHook, ParseHook};
use crate::tree::Tree;
use crate::types::{Point, Range};
use crate::undo::{Direction, History, Snapshot, UndoManager};

/// Notifications queued by editor operations. Drain them with
/// [`Editor::drain_events`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// A structural operation changed the document.
    Change,
    /// The range was set from outside.
    RangeUpdate,
    /// Backspace at the very start of the document.
    DeleteInStart,
    Undo,
    Redo,
}

/// Captured edit generation, used to drop stale async results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GenerationTicket(u64);

/// A rich-text document with a selection and undo history.
pub struct Editor {
    pub(crate) tree: Tree,
    pub(crate) range: Option<Range>,
    pub(crate) history: History,
    pub(crate) rules: Vec<Box<dyn FormatRule>>,
    pub(crate) merge_hook: Option<Box<dyn MergeHook>>,
    pub(crate) parse_hook: Option<Box<dyn ParseHook>>,
    pub(crate) highlighter: Option<Box<dyn Highlighter>>,
    pub(crate) events: Vec<EditorEvent>,
    pub(crate) disabled: bool,
    pub(crate) generation: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("html", &self.html())
            .field("range", &self.range)
            .field("history", &self.history.len())
            .field("generation", &self.generation)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor holding a single empty paragraph with the caret in it.
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(config.history_limit);
        let disabled = config.disabled;
        let mut tree = Tree::new(Arc::new(config));
        let mut range = None;
        // The stack guard seeds the empty paragraph.
        Formatter::new(&[]).run(&mut tree, &mut range);
        let range = tree
            .stack()
            .first()
            .and_then(|b| Point::start_of(&tree, *b).ok())
            .map(Range::collapsed);

        let mut editor = Self {
            tree,
            range,
            history,
            rules: Vec::new(),
            merge_hook: None,
            parse_hook: None,
            highlighter: None,
            events: Vec::new(),
            disabled,
            generation: 0,
        };
        editor.history.push(&editor.tree, editor.range.as_ref());
        editor
    }

    /// Create an editor seeded from an HTML fragment.
    pub fn with_html(config: EditorConfig, html: &str) -> Result<Self> {
        let mut editor = Self::new(config);
        editor.load(html)?;
        editor.history.clear();
        editor.history.push(&editor.tree, editor.range.as_ref());
        Ok(editor)
    }

    // === Accessors ===

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Direct tree access. Call [`Editor::format`] and [`Editor::commit`]
    /// after editing through it.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        self.tree.config()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Serialized document.
    pub fn html(&self) -> String {
        render_html(&self.tree)
    }

    /// Serialized selection, empty for a caret.
    pub fn selected_html(&self) -> String {
        match self.live_range() {
            Some(range) if !range.is_collapsed() => {
                let (start, end) = range.ordered(&self.tree);
                range_html(&self.tree, &start, &end)
            }
            _ => String::new(),
        }
    }

    /// Plain text of the selection, empty for a caret.
    pub fn selected_text(&self) -> String {
        match self.live_range() {
            Some(range) if !range.is_collapsed() => {
                let (start, end) = range.ordered(&self.tree);
                range_text(&self.tree, &start, &end)
            }
            _ => String::new(),
        }
    }

    fn live_range(&self) -> Option<Range> {
        self.range.filter(|r| {
            self.tree.contains_node(r.anchor.element) && self.tree.contains_node(r.focus.element)
        })
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Number of structural edits applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticket(&self) -> GenerationTicket {
        GenerationTicket(self.generation)
    }

    /// True when no structural edit happened since `ticket` was taken.
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        ticket.0 == self.generation
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // === Hooks ===

    /// Register an extra formatting rule, run after the built-in ones.
    pub fn add_rule(&mut self, rule: impl FormatRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn set_merge_hook(&mut self, hook: impl MergeHook + 'static) {
        self.merge_hook = Some(Box::new(hook));
    }

    pub fn set_parse_hook(&mut self, hook: impl ParseHook + 'static) {
        self.parse_hook = Some(Box::new(hook));
    }

    pub fn set_highlighter(&mut self, highlighter: impl Highlighter + 'static) {
        self.highlighter = Some(Box::new(highlighter));
    }

    // === Value and range ===

    /// Replace the whole document with a parsed HTML fragment.
    pub fn set_value(&mut self, html: &str) -> Result<()> {
        if self.disabled {
            return Ok(());
        }
        self.load(html)?;
        self.generation += 1;
        self.commit();
        Ok(())
    }

    fn load(&mut self, html: &str) -> Result<()> {
        let mut tree = Tree::new(self.tree.config_arc());
        tree.adopt_key_counter(&self.tree);
        let hook: &dyn ParseHook = match self.parse_hook.as_deref() {
            Some(hook) => hook,
            None => &(),
        };
        for node in parse_html(&mut tree, html, hook)? {
            tree.push_block(node)?;
        }

        let mut range = None;
        if let Some(highlighter) = self.highlighter.as_deref() {
            highlight_code_blocks(&mut tree, &mut range, highlighter)?;
        }
        Formatter::new(&self.rules).run(&mut tree, &mut range);
        tree.sweep(&[]);

        self.range = tree
            .stack()
            .first()
            .and_then(|b| Point::start_of(&tree, *b).ok())
            .map(Range::collapsed);
        self.tree = tree;
        tracing::debug!(
            target: "quire::editor",
            blocks = self.tree.stack().len(),
            "loaded document"
        );
        Ok(())
    }

    /// Set the selection. Endpoints on containers descend to their first or
    /// last caret host.
    pub fn set_range(&mut self, range: Range) -> Result<()> {
        let resolve = |p: &Point| -> Result<Point> {
            if !self.tree.contains_node(p.element) || !self.tree.is_attached(p.element) {
                return Err(EditorError::contract(format!(
                    "range endpoint {:?} is not attached",
                    p.element
                )));
            }
            Point::new(&self.tree, p.element, p.offset)
        };
        let range = Range::new(resolve(&range.anchor)?, resolve(&range.focus)?);
        self.range = Some(range);
        self.history.update_current_range(&self.tree, &range);
        self.events.push(EditorEvent::RangeUpdate);
        Ok(())
    }

    /// Collapse the selection onto an element: its start, or its end when
    /// `at_end` is set.
    pub fn select_element(&mut self, element: NodeId, at_end: bool) -> Result<()> {
        let point = if at_end {
            Point::end_of(&self.tree, element)?
        } else {
            Point::start_of(&self.tree, element)?
        };
        self.set_range(Range::collapsed(point))
    }

    pub fn select_all(&mut self) -> Result<()> {
        let (Some(first), Some(last)) = (self.tree.stack().first(), self.tree.stack().last())
        else {
            return Ok(());
        };
        let start = Point::start_of(&self.tree, *first)?;
        let end = Point::end_of(&self.tree, *last)?;
        self.set_range(Range::new(start, end))
    }

    /// Clear the selection.
    pub fn blur(&mut self) {
        self.range = None;
    }

    // === Transactions ===

    /// Run a structural operation. `op` returns whether it changed the tree.
    /// On success the tree is settled and committed; on error the tree and
    /// range are rolled back.
    pub(crate) fn transact(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Self) -> Result<bool>,
    ) -> Result<()> {
        if self.disabled {
            tracing::trace!(target: "quire::mutation", op = name, "editor disabled, skipping");
            return Ok(());
        }
        let saved_tree = self.tree.clone();
        let saved_range = self.range;
        let saved_events = self.events.len();

        let outcome = op(self).and_then(|changed| {
            if changed {
                self.settle()?;
            }
            Ok(changed)
        });

        match outcome {
            Ok(true) => {
                self.generation += 1;
                self.commit();
                tracing::debug!(
                    target: "quire::mutation",
                    op = name,
                    generation = self.generation,
                    "applied"
                );
                Ok(())
            }
            Ok(false) => {
                tracing::trace!(target: "quire::mutation", op = name, "nothing to do");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: "quire::mutation", op = name, %err, "rolled back");
                self.tree = saved_tree;
                self.range = saved_range;
                self.events.truncate(saved_events);
                Err(err)
            }
        }
    }

    /// Highlight, format and sweep.
    fn settle(&mut self) -> Result<()> {
        if let Some(highlighter) = self.highlighter.as_deref() {
            highlight_code_blocks(&mut self.tree, &mut self.range, highlighter)?;
        }
        Formatter::new(&self.rules).run(&mut self.tree, &mut self.range);
        self.tree.sweep(&[]);
        Ok(())
    }

    /// Run the formatting pass (built-in and registered rules) over the
    /// current tree.
    pub fn format(&mut self) {
        Formatter::new(&self.rules).run(&mut self.tree, &mut self.range);
    }

    /// Record the current state in history and queue a change event.
    pub fn commit(&mut self) {
        self.history.push(&self.tree, self.range.as_ref());
        self.events.push(EditorEvent::Change);
    }

    fn step(&mut self, direction: Direction) -> bool {
        if self.disabled {
            return false;
        }
        let Some(snapshot) = self.history.get(direction) else {
            return false;
        };
        self.restore(snapshot);
        self.events.push(match direction {
            Direction::Undo => EditorEvent::Undo,
            Direction::Redo => EditorEvent::Redo,
        });
        tracing::debug!(target: "quire::history", ?direction, "restored snapshot");
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot { mut tree, range } = snapshot;
        tree.adopt_key_counter(&self.tree);
        self.tree = tree;
        self.range = range;
        self.generation += 1;
    }
}

impl UndoManager for Editor {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        self.step(Direction::Undo)
    }

    fn redo(&mut self) -> bool {
        self.step(Direction::Redo)
    }

    fn clear_history(&mut self) {
        self.history.clear();
        self.history.push(&self.tree, self.range.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_editor_holds_empty_paragraph() {
        let editor = Editor::default();
        insta::assert_snapshot!(editor.html(), @"<p><br></p>");
        let caret = editor.range().unwrap().focus;
        assert!(editor.tree().is_break(caret.element));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_with_html_formats_the_seed() {
        let editor =
            Editor::with_html(EditorConfig::default(), "<p>foo<span>bar</span></p>hello").unwrap();
        insta::assert_snapshot!(editor.html(), @"<p>foobar</p><p>hello</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_set_range_validates_endpoints() {
        let mut editor = Editor::with_html(EditorConfig::default(), "<p>abc</p>").unwrap();
        let p = editor.tree().stack()[0];
        editor
            .set_range(Range::collapsed(Point { element: p, offset: 1 }))
            .unwrap();
        let caret = editor.range().unwrap().focus;
        assert_eq!(editor.tree()[caret.element].text(), "abc");
        assert_eq!(caret.offset, 3);
        assert_eq!(editor.drain_events(), vec![EditorEvent::RangeUpdate]);

        let text = caret.element;
        let err = editor
            .set_range(Range::collapsed(Point { element: text, offset: 9 }))
            .unwrap_err();
        assert!(matches!(err, EditorError::Contract(_)));
    }

    #[test]
    fn test_select_all_spans_document() {
        let mut editor = Editor::with_html(EditorConfig::default(), "<p>ab</p><p>cd</p>").unwrap();
        editor.select_all().unwrap();
        assert_eq!(editor.selected_text(), "ab\ncd");
        assert_eq!(editor.selected_html(), "<p>ab</p><p>cd</p>");
    }

    #[test]
    fn test_tickets_go_stale_after_edits() {
        let mut editor = Editor::default();
        let ticket = editor.ticket();
        assert!(editor.is_current(ticket));
        editor.set_value("<p>x</p>").unwrap();
        assert!(!editor.is_current(ticket));
    }

    #[test]
    fn test_disabled_editor_ignores_edits() {
        let mut editor = Editor::new(EditorConfig {
            disabled: true,
            ..EditorConfig::default()
        });
        editor.set_value("<p>x</p>").unwrap();
        insta::assert_snapshot!(editor.html(), @"<p><br></p>");
        assert!(editor.drain_events().is_empty());
    }

    #[test]
    fn test_undo_restores_previous_value() {
        let mut editor = Editor::with_html(EditorConfig::default(), "<p>one</p>").unwrap();
        editor.set_value("<p>two</p>").unwrap();
        assert!(editor.undo());
        insta::assert_snapshot!(editor.html(), @"<p>one</p>");
        assert!(editor.redo());
        insta::assert_snapshot!(editor.html(), @"<p>two</p>");
        assert!(!editor.redo());
        assert_eq!(
            editor.drain_events(),
            vec![EditorEvent::Change, EditorEvent::Undo, EditorEvent::Redo]
        );
    }
}
