//! quire-editor-core: rich-text document engine without DOM dependencies.
//!
//! This crate provides:
//! - `Tree` - arena of typed elements (block, inblock, inline, closed, text)
//! - `Point`/`Range` - caret and selection over the tree
//! - `format` - structural normalization to a fixpoint
//! - `Editor` - the document with its range, history and editing operations
//! - `html` - HTML fragment parsing and serialization
//! - Actions and platform traits consumed by the browser layer

pub mod actions;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod execute;
pub mod format;
pub mod html;
pub mod mutation;
pub mod platform;
pub mod render;
pub mod text_helpers;
pub mod tree;
pub mod types;
pub mod undo;

pub use actions::{EditorAction, InlineFormat, InputType};
pub use config::{EditorConfig, NBSP, PLACEHOLDER};
pub use document::{Editor, EditorEvent, GenerationTicket};
pub use element::{Attributes, Element, ElementKey, ElementKind, NodeId, RenderHandle};
pub use error::{EditorError, Result};
pub use execute::{clipboard_copy, clipboard_cut, clipboard_paste, execute_action, toggle_format};
pub use format::{FormatContext, FormatRule, Formatter, format};
pub use html::{parse_html, render_html};
pub use mutation::{RangeItem, get_elements_by_range};
pub use platform::{ClipboardPlatform, PlatformError, SelectionPlatform};
pub use render::{Highlighter, MergeHook, ParseHook};
pub use smol_str::SmolStr;
pub use tree::Tree;
pub use types::{Point, Range, compare_points};
pub use undo::{History, Snapshot, UndoManager};
