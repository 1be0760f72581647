//! Browser DOM layer for the quire rich-text editor.
//!
//! Renders a `quire-editor-core` element tree into a contenteditable root,
//! maps ranges to and from the native selection, and turns `beforeinput`
//! and clipboard events into editor actions. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom_render`: element tree → DOM, reusing nodes by element key
//! - `cursor`: range → native selection
//! - `dom_sync`: native selection → range
//! - `events`: beforeinput handling and the per-root session
//! - `clipboard`: copy/cut/paste through DataTransfer and the async API
//!
//! # Re-exports
//!
//! This crate re-exports `quire-editor-core` for convenience, so consumers
//! only need to depend on `quire-editor-browser`.

pub use quire_editor_core;
pub use quire_editor_core::*;

pub mod clipboard;
pub mod cursor;
pub mod dom_render;
pub mod dom_sync;
pub mod events;

pub use clipboard::{BrowserClipboard, ClipboardSnapshot, paste_async};
pub use cursor::{point_to_dom, range_render};
pub use dom_render::{DomRenderer, KEY_ATTRIBUTE};
pub use dom_sync::{dom_point_to_point, selection_to_range, sync_range_from_dom};
pub use events::{
    BeforeInputContext, BeforeInputResult, EditorSession, handle_beforeinput, listen_beforeinput,
    listen_selectionchange,
};
