//! Editor configuration.
//!
//! Tag classification tables and engine limits. Hosts usually start from
//! `EditorConfig::default()` and override fields, or deserialize the whole
//! struct (every field has a default).

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::element::ElementKind;

/// Zero-width caret-host placeholder (ZERO WIDTH NO-BREAK SPACE).
pub const PLACEHOLDER: char = '\u{FEFF}';

/// Non-breaking space substituted for typed spaces outside preformatted text.
pub const NBSP: char = '\u{00A0}';

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tags parsed as top-level `Block` containers.
    pub block_tags: Vec<SmolStr>,
    /// Tags parsed as nested `Inblock` containers.
    pub inblock_tags: Vec<SmolStr>,
    /// Inblock tags that merge and split like blocks (list items).
    pub block_like_tags: Vec<SmolStr>,
    /// Tags parsed as `Inline` containers. Checked before `closed_tags`, so
    /// listing a closed tag here makes it a container. Unknown tags also
    /// become inline.
    pub inline_tags: Vec<SmolStr>,
    /// Self-closing leaf tags.
    pub closed_tags: Vec<SmolStr>,
    /// Tags that can never host a caret.
    pub void_tags: Vec<SmolStr>,
    /// Tags whose content is preformatted (whitespace preserved, Enter
    /// inserts a newline instead of splitting).
    pub pre_tags: Vec<SmolStr>,
    /// Tag used for synthesized paragraphs and stack promotion.
    pub paragraph_tag: SmolStr,
    /// Tag carried by `Text` elements; an inline of this tag holding a single
    /// text child folds into it.
    pub text_tag: SmolStr,
    /// Tag of the line-break closed element.
    pub break_tag: SmolStr,
    /// Maximum number of history snapshots kept.
    pub history_limit: usize,
    /// Maximum number of full rule rounds per formatting pass.
    pub format_round_limit: usize,
    /// When set, every editing operation is a silent no-op.
    pub disabled: bool,
}

fn tags(list: &[&str]) -> Vec<SmolStr> {
    list.iter().map(|t| SmolStr::new(t)).collect()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            block_tags: tags(&[
                "p", "div", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "table",
                "blockquote", "pre", "address", "article", "aside", "nav", "section",
                "header", "footer",
            ]),
            inblock_tags: tags(&[
                "li", "tr", "td", "th", "thead", "tbody", "tfoot", "caption", "colgroup", "dl",
                "dt", "dd", "figure", "figcaption",
            ]),
            block_like_tags: tags(&["li", "dt", "dd"]),
            inline_tags: tags(&[
                "span", "a", "label", "code", "small", "mark", "abbr", "kbd", "q", "cite", "time",
            ]),
            closed_tags: tags(&[
                "br", "img", "video", "audio", "hr", "input", "iframe", "col", "source", "embed",
            ]),
            void_tags: tags(&["col", "source"]),
            pre_tags: tags(&["pre"]),
            paragraph_tag: SmolStr::new_static("p"),
            text_tag: SmolStr::new_static("span"),
            break_tag: SmolStr::new_static("br"),
            history_limit: 100,
            format_round_limit: 32,
            disabled: false,
        }
    }
}

impl EditorConfig {
    /// Classify an HTML tag name. Unknown tags fall back to `Inline`.
    pub fn classify(&self, tag: &str) -> ElementKind {
        let has = |list: &[SmolStr]| list.iter().any(|t| t.eq_ignore_ascii_case(tag));
        if has(&self.block_tags) {
            ElementKind::Block
        } else if has(&self.inblock_tags) {
            ElementKind::Inblock {
                block_like: has(&self.block_like_tags),
            }
        } else if has(&self.inline_tags) {
            ElementKind::Inline
        } else if has(&self.closed_tags) {
            ElementKind::Closed
        } else {
            tracing::trace!(target: "quire::parse", tag, "unknown tag, falling back to inline");
            ElementKind::Inline
        }
    }

    pub fn is_void_tag(&self, tag: &str) -> bool {
        self.void_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_pre_tag(&self, tag: &str) -> bool {
        self.pre_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
