//! Editor actions and input types.
//!
//! `EditorAction` is a semantic editing operation applied to the editor's
//! current range; `InputType` is the intent carried by an input event
//! (browser `beforeinput`, programmatic input). Hosts translate the latter
//! into the former with [`InputType::to_action`].

/// Semantic input types from input events.
///
/// Based on the W3C Input Events `inputType` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    // === Insertion ===
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Insert replacement text (e.g. spell check correction).
    InsertReplacementText,

    // === Deletion ===
    /// Delete content backward (Backspace).
    DeleteContentBackward,
    /// Delete content forward (Delete key).
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    /// Delete by cut operation.
    DeleteByCut,
    /// Delete by drag operation.
    DeleteByDrag,
    /// Generic content deletion.
    DeleteContent,

    // === History ===
    HistoryUndo,
    HistoryRedo,

    // === Formatting ===
    FormatBold,
    FormatItalic,
    FormatUnderline,
    FormatStrikethrough,
    FormatSuperscript,
    FormatSubscript,

    /// Unrecognized input type.
    Unknown(String),
}

impl InputType {
    /// Parse an `inputType` string.
    pub fn parse(s: &str) -> Self {
        match s {
            "insertText" => Self::InsertText,
            "insertCompositionText" => Self::InsertCompositionText,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertParagraph" => Self::InsertParagraph,
            "insertFromPaste" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "insertReplacementText" => Self::InsertReplacementText,

            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "deleteWordBackward" | "deleteEntireWordBackward" => Self::DeleteWordBackward,
            "deleteWordForward" | "deleteEntireWordForward" => Self::DeleteWordForward,
            "deleteByCut" => Self::DeleteByCut,
            "deleteByDrag" => Self::DeleteByDrag,
            "deleteContent" => Self::DeleteContent,

            "historyUndo" => Self::HistoryUndo,
            "historyRedo" => Self::HistoryRedo,

            "formatBold" => Self::FormatBold,
            "formatItalic" => Self::FormatItalic,
            "formatUnderline" => Self::FormatUnderline,
            "formatStrikethrough" => Self::FormatStrikethrough,
            "formatSuperscript" => Self::FormatSuperscript,
            "formatSubscript" => Self::FormatSubscript,

            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether this input type is a deletion operation.
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            Self::DeleteContentBackward
                | Self::DeleteContentForward
                | Self::DeleteWordBackward
                | Self::DeleteWordForward
                | Self::DeleteByCut
                | Self::DeleteByDrag
                | Self::DeleteContent
        )
    }

    /// Whether this input type is an insertion operation.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            Self::InsertText
                | Self::InsertCompositionText
                | Self::InsertLineBreak
                | Self::InsertParagraph
                | Self::InsertFromPaste
                | Self::InsertFromDrop
                | Self::InsertReplacementText
        )
    }

    /// The action for this input, given the event's text payload.
    ///
    /// `None` means the host should let the platform handle the event
    /// (composition, drops, unknown types, or text input without data).
    /// Word deletion is treated as a single-character delete.
    pub fn to_action(&self, data: Option<&str>) -> Option<EditorAction> {
        let action = match self {
            Self::InsertText | Self::InsertReplacementText => {
                EditorAction::InsertText(data.filter(|d| !d.is_empty())?.to_string())
            }
            Self::InsertFromPaste => {
                EditorAction::PasteText(data.filter(|d| !d.is_empty())?.to_string())
            }
            Self::InsertLineBreak => EditorAction::InsertLineBreak,
            Self::InsertParagraph => EditorAction::InsertParagraph,
            Self::DeleteContentBackward
            | Self::DeleteWordBackward
            | Self::DeleteByCut
            | Self::DeleteByDrag
            | Self::DeleteContent => EditorAction::DeleteBackward,
            Self::DeleteContentForward | Self::DeleteWordForward => EditorAction::DeleteForward,
            Self::HistoryUndo => EditorAction::Undo,
            Self::HistoryRedo => EditorAction::Redo,
            Self::FormatBold => EditorAction::Toggle(InlineFormat::Bold),
            Self::FormatItalic => EditorAction::Toggle(InlineFormat::Italic),
            Self::FormatUnderline => EditorAction::Toggle(InlineFormat::Underline),
            Self::FormatStrikethrough => EditorAction::Toggle(InlineFormat::Strikethrough),
            Self::FormatSuperscript => EditorAction::Toggle(InlineFormat::Superscript),
            Self::FormatSubscript => EditorAction::Toggle(InlineFormat::Subscript),
            Self::InsertCompositionText | Self::InsertFromDrop | Self::Unknown(_) => {
                return None;
            }
        };
        Some(action)
    }
}

/// Character formats that toggle a single style declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
}

impl InlineFormat {
    /// The `(property, value)` style declaration for this format.
    pub fn declaration(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("font-weight", "bold"),
            Self::Italic => ("font-style", "italic"),
            Self::Underline => ("text-decoration", "underline"),
            Self::Strikethrough => ("text-decoration", "line-through"),
            Self::Superscript => ("vertical-align", "super"),
            Self::Subscript => ("vertical-align", "sub"),
        }
    }

    /// The format a presentational HTML tag stands for.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "b" | "strong" => Some(Self::Bold),
            "i" | "em" => Some(Self::Italic),
            "u" => Some(Self::Underline),
            "s" | "strike" | "del" => Some(Self::Strikethrough),
            "sup" => Some(Self::Superscript),
            "sub" => Some(Self::Subscript),
            _ => None,
        }
    }
}

/// All possible editor actions.
///
/// These represent semantic operations on the document, decoupled from
/// how they're triggered. Each one applies to the editor's current range.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // === Text Insertion ===
    /// Insert text at the caret, replacing any selected content.
    InsertText(String),

    /// Insert a soft line break (Shift+Enter).
    InsertLineBreak,

    /// Insert a paragraph break (Enter).
    InsertParagraph,

    // === Deletion ===
    /// Delete content backward (Backspace).
    DeleteBackward,

    /// Delete content forward (Delete key).
    DeleteForward,

    // === History ===
    Undo,
    Redo,

    // === Formatting ===
    /// Toggle a character format on the selection.
    Toggle(InlineFormat),

    // === Clipboard ===
    /// Paste plain text at the range.
    PasteText(String),

    /// Paste an HTML fragment at the range.
    PasteHtml(String),

    /// Copy the selection to the clipboard, then delete it.
    Cut,

    /// Copy the selection to the clipboard.
    Copy,

    // === Selection ===
    SelectAll,
}

impl EditorAction {
    /// Whether the action can change the document.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Copy | Self::SelectAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_types() {
        assert_eq!(InputType::parse("insertText"), InputType::InsertText);
        assert_eq!(
            InputType::parse("deleteEntireWordBackward"),
            InputType::DeleteWordBackward
        );
        assert_eq!(
            InputType::parse("insertFromYank"),
            InputType::Unknown("insertFromYank".to_string())
        );
        assert!(InputType::parse("deleteByCut").is_deletion());
        assert!(InputType::parse("insertFromPaste").is_insertion());
    }

    #[test]
    fn test_input_to_action() {
        assert_eq!(
            InputType::InsertText.to_action(Some("a")),
            Some(EditorAction::InsertText("a".to_string()))
        );
        assert_eq!(InputType::InsertText.to_action(None), None);
        assert_eq!(InputType::InsertText.to_action(Some("")), None);
        assert_eq!(
            InputType::FormatBold.to_action(None),
            Some(EditorAction::Toggle(InlineFormat::Bold))
        );
        assert_eq!(InputType::InsertCompositionText.to_action(Some("k")), None);
    }

    #[test]
    fn test_legacy_tags_map_to_formats() {
        assert_eq!(InlineFormat::from_tag("strong"), Some(InlineFormat::Bold));
        assert_eq!(
            InlineFormat::from_tag("del").map(InlineFormat::declaration),
            Some(("text-decoration", "line-through"))
        );
        assert_eq!(InlineFormat::from_tag("span"), None);
    }
}
