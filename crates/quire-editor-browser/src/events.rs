//! Browser event handling for the editor.
//!
//! `beforeinput` is the single entry point for edits: the event's input type
//! and payload become an [`EditorAction`], its target range (when the
//! browser supplies one) becomes the editor range, and the default action is
//! prevented so the browser never mutates the rendered DOM itself.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use quire_editor_core::{Editor, EditorAction, InputType, Range, Tree, execute_action};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom_render::DomRenderer;
use crate::dom_sync::dom_point_to_point;

// === StaticRange binding ===
//
// web-sys doesn't expose StaticRange, which InputEvent.getTargetRanges()
// returns.

#[wasm_bindgen]
extern "C" {
    /// A fixed DOM range that doesn't track later mutations.
    pub type StaticRange;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startOffset(this: &StaticRange) -> u32;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endOffset(this: &StaticRange) -> u32;

    #[wasm_bindgen(method, getter, structural)]
    pub fn collapsed(this: &StaticRange) -> bool;
}

/// Result of handling a beforeinput event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeInputResult {
    /// Event was handled, prevent default browser behavior.
    Handled,
    /// Event should be handled by the browser (composition, drops, unknown
    /// input types).
    PassThrough,
}

/// What a beforeinput event asks for, extracted from the native event.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeInputContext {
    pub input_type: InputType,
    /// Text to insert, if any.
    pub data: Option<String>,
    /// Range the browser wants to modify, from getTargetRanges().
    pub target_range: Option<Range>,
    pub is_composing: bool,
}

impl BeforeInputContext {
    /// Read an input event against the rendered tree.
    pub fn from_event(event: &web_sys::InputEvent, renderer: &DomRenderer, tree: &Tree) -> Self {
        Self {
            input_type: InputType::parse(&event.input_type()),
            data: get_data_from_event(event),
            target_range: get_target_range_from_event(event, renderer, tree),
            is_composing: event.is_composing(),
        }
    }
}

/// Resolve the event's first target range, if the browser supplied one.
pub fn get_target_range_from_event(
    event: &web_sys::InputEvent,
    renderer: &DomRenderer,
    tree: &Tree,
) -> Option<Range> {
    let ranges = event.get_target_ranges();
    if ranges.length() == 0 {
        return None;
    }
    let static_range: StaticRange = ranges.get(0).unchecked_into();

    let start = dom_point_to_point(
        renderer,
        tree,
        &static_range.startContainer(),
        static_range.startOffset(),
    )?;
    let end = dom_point_to_point(
        renderer,
        tree,
        &static_range.endContainer(),
        static_range.endOffset(),
    )?;
    Some(Range::new(start, end))
}

/// Get data from a beforeinput event, falling back to the data transfer for
/// paste and drop.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> Option<String> {
    if let Some(data) = event.data() {
        if !data.is_empty() {
            return Some(data);
        }
    }

    if let Some(data_transfer) = event.data_transfer() {
        if let Ok(text) = data_transfer.get_data("text/plain") {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

/// Handle a beforeinput event, dispatching to the matching action.
///
/// The target range, when present, replaces the editor range first.
pub fn handle_beforeinput(editor: &mut Editor, ctx: &BeforeInputContext) -> BeforeInputResult {
    // Undo/redo still go through during composition.
    if ctx.is_composing
        && !matches!(ctx.input_type, InputType::HistoryUndo | InputType::HistoryRedo)
    {
        return BeforeInputResult::PassThrough;
    }

    let Some(action) = ctx.input_type.to_action(ctx.data.as_deref()) else {
        tracing::trace!(target: "quire::dom", input_type = ?ctx.input_type, "passing through");
        return BeforeInputResult::PassThrough;
    };

    if let Some(range) = ctx.target_range {
        if let Err(err) = editor.set_range(range) {
            tracing::debug!(target: "quire::dom", %err, "ignoring target range");
        }
    }

    match execute_action(editor, &action) {
        Ok(changed) => {
            tracing::trace!(target: "quire::dom", ?action, changed, "beforeinput");
        }
        Err(err) => {
            tracing::warn!(target: "quire::dom", ?action, %err, "action failed");
        }
    }
    BeforeInputResult::Handled
}

/// Shared state for the event listeners of one editable root.
pub struct EditorSession {
    pub editor: Editor,
    pub renderer: DomRenderer,
}

impl EditorSession {
    pub fn new(editor: Editor, root: web_sys::Element) -> Self {
        Self {
            editor,
            renderer: DomRenderer::new(root),
        }
    }

    /// Render the document and show its range.
    pub fn refresh(&mut self) {
        if let Err(err) = self.renderer.render(self.editor.tree_mut()) {
            tracing::warn!(target: "quire::dom", %err, "render failed");
            return;
        }
        if let Err(err) =
            crate::cursor::range_render(&self.renderer, self.editor.tree(), self.editor.range())
        {
            tracing::debug!(target: "quire::dom", %err, "selection not restored");
        }
    }

    /// Run one action, re-rendering if it changed anything.
    pub fn dispatch(&mut self, action: &EditorAction) -> bool {
        match execute_action(&mut self.editor, action) {
            Ok(true) => {
                self.refresh();
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(target: "quire::dom", ?action, %err, "action failed");
                false
            }
        }
    }
}

/// Attach a non-passive beforeinput listener to the session's root.
///
/// The returned listener detaches when dropped.
pub fn listen_beforeinput(session: Rc<RefCell<EditorSession>>) -> EventListener {
    let target = session.borrow().renderer.root().clone();
    let options = EventListenerOptions::enable_prevent_default();
    EventListener::new_with_options(&target, "beforeinput", options, move |event| {
        let Some(event) = event.dyn_ref::<web_sys::InputEvent>() else {
            return;
        };
        let Ok(mut session) = session.try_borrow_mut() else {
            tracing::warn!(target: "quire::dom", "re-entrant beforeinput ignored");
            return;
        };
        let session = &mut *session;
        crate::dom_sync::sync_range_from_dom(&session.renderer, &mut session.editor);
        let ctx = BeforeInputContext::from_event(event, &session.renderer, session.editor.tree());
        if handle_beforeinput(&mut session.editor, &ctx) == BeforeInputResult::Handled {
            event.prevent_default();
            session.refresh();
        }
    })
}

/// Keep the editor range in step with the native selection.
pub fn listen_selectionchange(session: Rc<RefCell<EditorSession>>) -> EventListener {
    let document = gloo_utils::document();
    EventListener::new(&document, "selectionchange", move |_| {
        if let Ok(mut session) = session.try_borrow_mut() {
            let session = &mut *session;
            crate::dom_sync::sync_range_from_dom(&session.renderer, &mut session.editor);
        }
    })
}
