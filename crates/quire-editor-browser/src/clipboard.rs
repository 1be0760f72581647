//! Browser clipboard implementation.
//!
//! Copy, cut and paste events go through the event's `DataTransfer`
//! synchronously. The async Clipboard API is used for writes outside a
//! clipboard event and for toolbar-driven paste, where the result arrives
//! after the document may have moved on.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use js_sys::{Array, Object, Reflect};
use quire_editor_core::{ClipboardPlatform, clipboard_copy, clipboard_cut, clipboard_paste};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, ClipboardItem};

use crate::events::EditorSession;

const HTML_MIME: &str = "text/html";
const TEXT_MIME: &str = "text/plain";

/// Clipboard access backed by a clipboard event's `DataTransfer`.
pub struct BrowserClipboard {
    data_transfer: Option<web_sys::DataTransfer>,
}

impl BrowserClipboard {
    /// Call this in a copy/cut/paste handler.
    pub fn from_event(evt: &web_sys::ClipboardEvent) -> Self {
        Self {
            data_transfer: evt.clipboard_data(),
        }
    }

    /// A context without an event. Writes go to the async API only.
    pub fn empty() -> Self {
        Self {
            data_transfer: None,
        }
    }

    fn get(&self, mime: &str) -> Option<String> {
        let dt = self.data_transfer.as_ref()?;
        dt.get_data(mime).ok().filter(|s| !s.is_empty())
    }
}

impl ClipboardPlatform for BrowserClipboard {
    fn write_html(&self, html: &str, plain_text: &str) {
        if let Some(dt) = &self.data_transfer {
            for (mime, payload) in [(HTML_MIME, html), (TEXT_MIME, plain_text)] {
                if let Err(e) = dt.set_data(mime, payload) {
                    tracing::warn!(target: "quire::clipboard", ?e, mime, "sync write failed");
                }
            }
            return;
        }

        let html = html.to_string();
        let plain = plain_text.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = write_html_to_clipboard(&html, &plain).await {
                tracing::warn!(target: "quire::clipboard", ?e, "async write failed");
            }
        });
    }

    fn read_html(&self) -> Option<String> {
        self.get(HTML_MIME)
    }

    fn read_text(&self) -> Option<String> {
        self.get(TEXT_MIME)
    }
}

/// Clipboard contents already fetched through the async API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub html: Option<String>,
    pub text: Option<String>,
}

impl ClipboardPlatform for ClipboardSnapshot {
    fn write_html(&self, _html: &str, _plain_text: &str) {
        tracing::debug!(target: "quire::clipboard", "snapshot is read-only");
    }

    fn read_html(&self) -> Option<String> {
        self.html.clone().filter(|s| !s.is_empty())
    }

    fn read_text(&self) -> Option<String> {
        self.text.clone().filter(|s| !s.is_empty())
    }
}

/// Write HTML and plain text through `navigator.clipboard`.
pub async fn write_html_to_clipboard(html: &str, plain_text: &str) -> Result<(), JsValue> {
    let clipboard = gloo_utils::window().navigator().clipboard();

    let item_data = Object::new();
    for (mime, payload) in [(HTML_MIME, html), (TEXT_MIME, plain_text)] {
        let parts = Array::new();
        parts.push(&JsValue::from_str(payload));
        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
        Reflect::set(&item_data, &JsValue::from_str(mime), &blob)?;
    }

    let clipboard_item = ClipboardItem::new_with_record_from_str_to_blob_promise(&item_data)?;
    let items = Array::new();
    items.push(&clipboard_item);

    JsFuture::from(clipboard.write(&items)).await?;
    tracing::debug!(target: "quire::clipboard", bytes = html.len(), "wrote html");
    Ok(())
}

/// Read HTML and plain text through `navigator.clipboard`.
pub async fn read_clipboard() -> Result<ClipboardSnapshot, JsValue> {
    let clipboard = gloo_utils::window().navigator().clipboard();
    let items: Array = JsFuture::from(clipboard.read()).await?.unchecked_into();

    let mut snapshot = ClipboardSnapshot::default();
    for item in items.iter() {
        let item: ClipboardItem = item.unchecked_into();
        let types = item.types();
        for mime in types.iter().filter_map(|t| t.as_string()) {
            let slot = match mime.as_str() {
                HTML_MIME if snapshot.html.is_none() => &mut snapshot.html,
                TEXT_MIME if snapshot.text.is_none() => &mut snapshot.text,
                _ => continue,
            };
            let blob: Blob = JsFuture::from(item.get_type(&mime)).await?.unchecked_into();
            *slot = JsFuture::from(blob.text()).await?.as_string();
        }
    }
    Ok(snapshot)
}

/// Paste from the async clipboard into the session's editor.
///
/// The read is tied to the document generation at the time of the call; if
/// the document changed while the read was pending, the result is dropped.
pub async fn paste_async(session: Rc<RefCell<EditorSession>>) -> bool {
    let ticket = session.borrow().editor.ticket();
    let snapshot = match read_clipboard().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(target: "quire::clipboard", ?e, "clipboard read failed");
            return false;
        }
    };

    let mut session = session.borrow_mut();
    if !session.editor.is_current(ticket) {
        tracing::warn!(target: "quire::clipboard", "document changed during paste, dropping result");
        return false;
    }
    match clipboard_paste(&mut session.editor, &snapshot) {
        Ok(true) => {
            session.refresh();
            true
        }
        Ok(false) => false,
        Err(err) => {
            tracing::warn!(target: "quire::clipboard", %err, "paste failed");
            false
        }
    }
}

/// Attach copy, cut and paste listeners to the session's root.
pub fn listen_clipboard(session: Rc<RefCell<EditorSession>>) -> Vec<EventListener> {
    let target = session.borrow().renderer.root().clone();
    ["copy", "cut", "paste"]
        .into_iter()
        .map(|name| {
            let session = session.clone();
            EventListener::new_with_options(
                &target,
                name,
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<web_sys::ClipboardEvent>() else {
                        return;
                    };
                    let Ok(mut session) = session.try_borrow_mut() else {
                        return;
                    };
                    let clipboard = BrowserClipboard::from_event(event);
                    let handled = match name {
                        "copy" => clipboard_copy(&session.editor, &clipboard),
                        "cut" => clipboard_cut(&mut session.editor, &clipboard).unwrap_or_else(|err| {
                            tracing::warn!(target: "quire::clipboard", %err, "cut failed");
                            false
                        }),
                        _ => {
                            // Paste is always ours, even when nothing usable arrived.
                            event.prevent_default();
                            clipboard_paste(&mut session.editor, &clipboard).unwrap_or_else(|err| {
                                tracing::warn!(target: "quire::clipboard", %err, "paste failed");
                                false
                            })
                        }
                    };
                    if handled {
                        event.prevent_default();
                        if name != "copy" {
                            session.refresh();
                        }
                    }
                },
            )
        })
        .collect()
}
