//! Message types for the editing core.

use super::cursor::Position;

/// Target for cursor movement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Move one character left
    Left,
    /// Move one character right
    Right,
    /// Move one line up
    Up,
    /// Move one line down
    Down,
    /// Move to column 0
    LineStart,
    /// Smart line start (toggle between first non-whitespace and column 0)
    LineStartSmart,
    /// Move to end of line
    LineEnd,
    /// Move to the previous token boundary
    WordLeft,
    /// Move to the next token boundary
    WordRight,
    /// Move to start of document
    DocumentStart,
    /// Move to end of document
    DocumentEnd,
}

impl MoveTarget {
    /// True for moves that change the line and keep the remembered column
    pub fn is_vertical(&self) -> bool {
        matches!(self, MoveTarget::Up | MoveTarget::Down)
    }
}

/// Command vocabulary understood by [`SourceCode::update`](super::SourceCode::update).
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    // === Movement ===
    /// Move cursor without affecting selection
    Move(MoveTarget),
    /// Move cursor and extend selection
    MoveWithSelection(MoveTarget),

    // === Insertion ===
    /// Insert a single character
    InsertChar(char),
    /// Insert a string (paste)
    InsertText(String),
    /// Insert a line break
    InsertNewline,

    // === Deletion ===
    /// Delete character before cursor (Backspace)
    DeleteBackward,
    /// Delete character after cursor (Delete)
    DeleteForward,
    /// Delete to the previous token boundary
    DeleteWordBackward,
    /// Delete to the next token boundary
    DeleteWordForward,
    /// Delete every line touched by a caret
    DeleteLine,

    // === Selection ===
    /// Select all text
    SelectAll,
    /// Select the token under each caret
    SelectWord,
    /// Select the lines under each caret
    SelectLine,
    /// Collapse selection to cursor position
    CollapseSelection,

    // === Multi-cursor ===
    /// Add a caret at an explicit position
    AddCursorAt(Position),
    /// Add cursor above the primary cursor
    AddCursorAbove,
    /// Add cursor below the primary cursor
    AddCursorBelow,
    /// Collapse to single cursor
    CollapseCursors,

    // === Clipboard ===
    /// Remove the selection (the caller reads `selected_text` first)
    Cut,

    // === Undo/Redo ===
    Undo,
    Redo,

    // === Indentation and line operations ===
    Indent,
    Unindent,
    Duplicate,
    ToUpperCase,
    ToLowerCase,
    MoveLineUp,
    MoveLineDown,
}

impl EditMsg {
    /// Check if this message modifies the buffer
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            EditMsg::InsertChar(_)
                | EditMsg::InsertText(_)
                | EditMsg::InsertNewline
                | EditMsg::DeleteBackward
                | EditMsg::DeleteForward
                | EditMsg::DeleteWordBackward
                | EditMsg::DeleteWordForward
                | EditMsg::DeleteLine
                | EditMsg::Cut
                | EditMsg::Undo
                | EditMsg::Redo
                | EditMsg::Indent
                | EditMsg::Unindent
                | EditMsg::Duplicate
                | EditMsg::ToUpperCase
                | EditMsg::ToLowerCase
                | EditMsg::MoveLineUp
                | EditMsg::MoveLineDown
        )
    }

    /// Check if this message is a movement operation
    pub fn is_movement(&self) -> bool {
        matches!(self, EditMsg::Move(_) | EditMsg::MoveWithSelection(_))
    }

    /// Check if this message is a selection operation
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            EditMsg::MoveWithSelection(_)
                | EditMsg::SelectAll
                | EditMsg::SelectWord
                | EditMsg::SelectLine
                | EditMsg::CollapseSelection
        )
    }

    /// Check if this message changes the number of carets
    pub fn is_caret_management(&self) -> bool {
        matches!(
            self,
            EditMsg::AddCursorAt(_)
                | EditMsg::AddCursorAbove
                | EditMsg::AddCursorBelow
                | EditMsg::CollapseCursors
        )
    }
}
