//! Action execution for the editor.
//!
//! `execute_action` is the central dispatch point: platform layers turn
//! input events into [`EditorAction`]s and hand them here. Clipboard actions
//! need platform access and go through the `clipboard_*` functions instead.

use crate::actions::{EditorAction, InlineFormat};
use crate::document::Editor;
use crate::error::Result;
use crate::platform::ClipboardPlatform;
use crate::undo::UndoManager;

/// Execute an editor action against the editor's current range.
///
/// Returns true if the document or its range changed.
pub fn execute_action(editor: &mut Editor, action: &EditorAction) -> Result<bool> {
    let before = editor.generation();
    match action {
        EditorAction::InsertText(text) => editor.insert_text(text)?,
        EditorAction::InsertLineBreak => editor.insert_line_break()?,
        EditorAction::InsertParagraph => editor.insert_paragraph()?,
        EditorAction::DeleteBackward => editor.delete()?,
        EditorAction::DeleteForward => editor.delete_forward()?,
        EditorAction::Undo => return Ok(editor.undo()),
        EditorAction::Redo => return Ok(editor.redo()),
        EditorAction::Toggle(format) => toggle_format(editor, *format)?,
        EditorAction::PasteText(text) => editor.paste_text(text)?,
        EditorAction::PasteHtml(html) => editor.paste_html(html)?,
        EditorAction::SelectAll => {
            editor.select_all()?;
            return Ok(true);
        }
        EditorAction::Cut | EditorAction::Copy => {
            tracing::trace!(
                target: "quire::mutation",
                ?action,
                "clipboard action needs a platform clipboard"
            );
            return Ok(false);
        }
    }
    Ok(editor.generation() != before)
}

/// Remove the format's declaration when the whole selection already has it,
/// apply it otherwise.
pub fn toggle_format(editor: &mut Editor, format: InlineFormat) -> Result<()> {
    let (name, value) = format.declaration();
    if editor.query_text_style(name, Some(value)) {
        editor.remove_text_style(&[name])
    } else {
        editor.set_text_style(&[(name, value)])
    }
}

/// Copy the selection. Returns false when nothing is selected.
pub fn clipboard_copy(editor: &Editor, clipboard: &impl ClipboardPlatform) -> bool {
    match editor.range() {
        Some(range) if !range.is_collapsed() => {
            let html = editor.selected_html();
            let text = editor.selected_text();
            tracing::debug!(target: "quire::clipboard", bytes = html.len(), "copy");
            clipboard.write_html(&html, &text);
            true
        }
        _ => false,
    }
}

/// Copy the selection, then delete it.
pub fn clipboard_cut(editor: &mut Editor, clipboard: &impl ClipboardPlatform) -> Result<bool> {
    if !clipboard_copy(editor, clipboard) {
        return Ok(false);
    }
    editor.delete()?;
    Ok(true)
}

/// Paste clipboard content, preferring HTML over plain text.
pub fn clipboard_paste(editor: &mut Editor, clipboard: &impl ClipboardPlatform) -> Result<bool> {
    let before = editor.generation();
    if let Some(html) = clipboard.read_html().filter(|h| !h.trim().is_empty()) {
        editor.paste_html(&html)?;
    } else if let Some(text) = clipboard.read_text().filter(|t| !t.is_empty()) {
        editor.paste_text(&text)?;
    } else {
        tracing::debug!(target: "quire::clipboard", "nothing to paste");
        return Ok(false);
    }
    Ok(editor.generation() != before)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::EditorConfig;
    use crate::types::{Point, Range};

    #[derive(Default)]
    struct MemoryClipboard {
        html: RefCell<Option<String>>,
        text: RefCell<Option<String>>,
    }

    impl ClipboardPlatform for MemoryClipboard {
        fn write_html(&self, html: &str, plain_text: &str) {
            *self.html.borrow_mut() = Some(html.to_string());
            *self.text.borrow_mut() = Some(plain_text.to_string());
        }

        fn read_html(&self) -> Option<String> {
            self.html.borrow().clone()
        }

        fn read_text(&self) -> Option<String> {
            self.text.borrow().clone()
        }
    }

    fn make_editor(html: &str) -> Editor {
        Editor::with_html(EditorConfig::default(), html).unwrap()
    }

    #[test]
    fn test_insert_and_delete() {
        let mut editor = make_editor("<p>hello</p>");
        let leaf = editor.range().unwrap().focus.element;
        editor
            .set_range(Range::collapsed(Point { element: leaf, offset: 5 }))
            .unwrap();

        let action = EditorAction::InsertText("!".to_string());
        assert!(execute_action(&mut editor, &action).unwrap());
        insta::assert_snapshot!(editor.html(), @"<p>hello!</p>");

        assert!(execute_action(&mut editor, &EditorAction::DeleteBackward).unwrap());
        insta::assert_snapshot!(editor.html(), @"<p>hello</p>");
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = Editor::default();
        execute_action(&mut editor, &EditorAction::InsertText("hi".to_string())).unwrap();
        assert!(execute_action(&mut editor, &EditorAction::Undo).unwrap());
        insta::assert_snapshot!(editor.html(), @"<p><br></p>");
        assert!(execute_action(&mut editor, &EditorAction::Redo).unwrap());
        insta::assert_snapshot!(editor.html(), @"<p>hi</p>");
        assert!(!execute_action(&mut editor, &EditorAction::Redo).unwrap());
    }

    #[test]
    fn test_toggle_bold() {
        let mut editor = make_editor("<p>hello</p>");
        execute_action(&mut editor, &EditorAction::SelectAll).unwrap();
        let bold = EditorAction::Toggle(InlineFormat::Bold);

        assert!(execute_action(&mut editor, &bold).unwrap());
        insta::assert_snapshot!(
            editor.html(),
            @r#"<p><span style="font-weight: bold;">hello</span></p>"#
        );
        assert!(execute_action(&mut editor, &bold).unwrap());
        insta::assert_snapshot!(editor.html(), @"<p>hello</p>");
    }

    #[test]
    fn test_clipboard_actions_need_platform() {
        let mut editor = make_editor("<p>hello</p>");
        assert!(!execute_action(&mut editor, &EditorAction::Copy).unwrap());
    }

    #[test]
    fn test_cut_then_paste() {
        let clipboard = MemoryClipboard::default();
        let mut editor = make_editor("<p>ab<b>cd</b></p>");
        let leaf = editor.range().unwrap().focus.element;
        let bold = editor.tree().caret_leaves(editor.tree().stack()[0])[1];
        editor
            .set_range(Range::new(
                Point { element: leaf, offset: 1 },
                Point { element: bold, offset: 2 },
            ))
            .unwrap();

        assert!(clipboard_cut(&mut editor, &clipboard).unwrap());
        assert_eq!(clipboard.read_text().as_deref(), Some("bcd"));
        insta::assert_snapshot!(editor.html(), @"<p>a</p>");

        assert!(clipboard_paste(&mut editor, &clipboard).unwrap());
        insta::assert_snapshot!(
            editor.html(),
            @r#"<p>ab<span style="font-weight: bold;">cd</span></p>"#
        );
    }

    #[test]
    fn test_copy_without_selection() {
        let clipboard = MemoryClipboard::default();
        let editor = make_editor("<p>hello</p>");
        assert!(!clipboard_copy(&editor, &clipboard));
        assert!(clipboard.read_html().is_none());
    }
}
