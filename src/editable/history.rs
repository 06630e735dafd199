//! Edit history (undo/redo) for the editing core.
//!
//! Every text mutation is recorded as an [`EditAction`]: one primitive
//! [`Change`] plus the acting cursor's position before and after. Actions of
//! one caret form a [`RangeEdit`]; the range edits of one user command form an
//! [`EditBatch`], the unit of undo and redo.
//!
//! All positions in here are (line ordinal, column) pairs taken at the moment
//! the change happened, so replaying a batch in reverse restores the buffer
//! exactly regardless of which line identities exist at replay time.

use serde::Serialize;

use super::buffer::{LineBuffer, LineId};
use super::cursor::{Cursor, Position, Removed};
use crate::util::text::is_line_break;

/// A primitive buffer change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    CharInserted { at: Position, ch: char },
    /// `at` is where the removed character used to start
    CharRemoved { at: Position, ch: char },
    /// Line split at `at`; the tail moved to `at.line + 1`
    LineBreakInserted { at: Position },
    /// Line `at.line + 1` was appended to `at.line`, whose old length is `at.column`
    LineBreakRemoved { at: Position },
    IndentInserted { at: Position, text: String },
    IndentRemoved { at: Position, text: String },
    /// Lines `upper` and `upper + 1` traded places
    LinesSwapped { upper: usize },
}

/// Resolves line ordinals by walking from the line of the previous change.
///
/// Replaying a batch touches lines close to each other, so each lookup costs
/// the distance to the last change instead of a scan from the first line.
struct LineSeek {
    line: usize,
    id: LineId,
}

impl LineSeek {
    fn new(buffer: &LineBuffer) -> Self {
        Self {
            line: 0,
            id: buffer.first(),
        }
    }

    fn seek(&mut self, buffer: &LineBuffer, line: usize) -> LineId {
        while self.line < line {
            match buffer.next(self.id) {
                Some(next) => {
                    self.id = next;
                    self.line += 1;
                }
                None => panic!("history refers to line {} but the buffer has {}", line, buffer.len()),
            }
        }
        while self.line > line {
            match buffer.prev(self.id) {
                Some(prev) => {
                    self.id = prev;
                    self.line -= 1;
                }
                None => unreachable!("line ordinal {} has no predecessor", self.line),
            }
        }
        self.id
    }

    /// `id` now sits at `line`
    fn moved(&mut self, line: usize, id: LineId) {
        self.line = line;
        self.id = id;
    }
}

fn char_str(ch: char, storage: &mut [u8; 4]) -> &str {
    ch.encode_utf8(storage)
}

impl Change {
    /// Perform the change against `buffer`
    pub fn apply(&self, buffer: &mut LineBuffer) {
        let mut seek = LineSeek::new(buffer);
        self.apply_with(buffer, &mut seek);
    }

    /// Undo the change against `buffer`
    pub fn revert(&self, buffer: &mut LineBuffer) {
        let mut seek = LineSeek::new(buffer);
        self.revert_with(buffer, &mut seek);
    }

    fn apply_with(&self, buffer: &mut LineBuffer, seek: &mut LineSeek) {
        let mut storage = [0u8; 4];
        match self {
            Change::CharInserted { at, ch } => {
                let id = seek.seek(buffer, at.line);
                buffer.insert_text(id, at.column, char_str(*ch, &mut storage));
            }
            Change::CharRemoved { at, .. } => {
                let id = seek.seek(buffer, at.line);
                buffer.remove_text(id, at.column..at.column + 1);
            }
            Change::LineBreakInserted { at } => {
                let id = seek.seek(buffer, at.line);
                buffer.split(id, at.column);
            }
            Change::LineBreakRemoved { at } => {
                let id = seek.seek(buffer, at.line);
                buffer.join_next(id);
            }
            Change::IndentInserted { at, text } => {
                let id = seek.seek(buffer, at.line);
                buffer.insert_text(id, at.column, text);
            }
            Change::IndentRemoved { at, text } => {
                let id = seek.seek(buffer, at.line);
                buffer.remove_text(id, at.column..at.column + text.chars().count());
            }
            Change::LinesSwapped { upper } => {
                let id = seek.seek(buffer, *upper);
                buffer.swap_with_next(id);
                seek.moved(upper + 1, id);
            }
        }
    }

    fn revert_with(&self, buffer: &mut LineBuffer, seek: &mut LineSeek) {
        let mut storage = [0u8; 4];
        match self {
            Change::CharInserted { at, .. } => {
                let id = seek.seek(buffer, at.line);
                buffer.remove_text(id, at.column..at.column + 1);
            }
            Change::CharRemoved { at, ch } => {
                let id = seek.seek(buffer, at.line);
                buffer.insert_text(id, at.column, char_str(*ch, &mut storage));
            }
            Change::LineBreakInserted { at } => {
                let id = seek.seek(buffer, at.line);
                buffer.join_next(id);
            }
            Change::LineBreakRemoved { at } => {
                let id = seek.seek(buffer, at.line);
                buffer.split(id, at.column);
            }
            Change::IndentInserted { at, text } => {
                let id = seek.seek(buffer, at.line);
                buffer.remove_text(id, at.column..at.column + text.chars().count());
            }
            Change::IndentRemoved { at, text } => {
                let id = seek.seek(buffer, at.line);
                buffer.insert_text(id, at.column, text);
            }
            Change::LinesSwapped { upper } => {
                let id = seek.seek(buffer, *upper);
                buffer.swap_with_next(id);
                seek.moved(upper + 1, id);
            }
        }
    }

    /// Where a position recorded before this change ends up after it.
    ///
    /// This is what keeps the other carets of a multi-caret edit in place
    /// while one caret mutates the text under them.
    pub fn transform(&self, pos: Position) -> Position {
        match self {
            Change::CharInserted { at, .. } => {
                if pos.line == at.line && pos.column >= at.column {
                    Position::new(pos.line, pos.column + 1)
                } else {
                    pos
                }
            }
            Change::CharRemoved { at, .. } => {
                if pos.line == at.line && pos.column > at.column {
                    Position::new(pos.line, pos.column - 1)
                } else {
                    pos
                }
            }
            Change::LineBreakInserted { at } => {
                if pos.line > at.line {
                    Position::new(pos.line + 1, pos.column)
                } else if pos.line == at.line && pos.column >= at.column {
                    Position::new(pos.line + 1, pos.column - at.column)
                } else {
                    pos
                }
            }
            Change::LineBreakRemoved { at } => {
                if pos.line == at.line + 1 {
                    Position::new(at.line, at.column + pos.column)
                } else if pos.line > at.line + 1 {
                    Position::new(pos.line - 1, pos.column)
                } else {
                    pos
                }
            }
            Change::IndentInserted { at, text } => {
                if pos.line == at.line && pos.column >= at.column {
                    Position::new(pos.line, pos.column + text.chars().count())
                } else {
                    pos
                }
            }
            Change::IndentRemoved { at, text } => {
                let len = text.chars().count();
                if pos.line != at.line || pos.column <= at.column {
                    pos
                } else if pos.column >= at.column + len {
                    Position::new(pos.line, pos.column - len)
                } else {
                    Position::new(pos.line, at.column)
                }
            }
            Change::LinesSwapped { upper } => {
                if pos.line == *upper {
                    Position::new(upper + 1, pos.column)
                } else if pos.line == upper + 1 {
                    Position::new(*upper, pos.column)
                } else {
                    pos
                }
            }
        }
    }
}

/// One recorded change with the acting cursor's position around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditAction {
    pub change: Change,
    pub before: Position,
    pub after: Position,
}

/// Run a position through a sequence of actions
pub fn transform_position(pos: Position, actions: &[EditAction]) -> Position {
    actions
        .iter()
        .fold(pos, |pos, action| action.change.transform(pos))
}

/// Position-based copy of a selection range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeSnapshot {
    pub tail: Option<Position>,
    pub head: Position,
    pub desired_column: Option<usize>,
}

impl RangeSnapshot {
    pub fn caret(head: Position) -> Self {
        Self {
            tail: None,
            head,
            desired_column: None,
        }
    }

    pub fn selection(tail: Position, head: Position) -> Self {
        Self {
            tail: (tail != head).then_some(tail),
            head,
            desired_column: None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.tail.is_some()
    }

    pub fn start(&self) -> Position {
        self.tail.map_or(self.head, |tail| tail.min(self.head))
    }

    pub fn end(&self) -> Position {
        self.tail.map_or(self.head, |tail| tail.max(self.head))
    }

    /// Follow the edits another caret made
    pub fn transform(&mut self, actions: &[EditAction]) {
        if actions.is_empty() {
            return;
        }
        self.head = transform_position(self.head, actions);
        self.tail = self
            .tail
            .map(|tail| transform_position(tail, actions))
            .filter(|tail| *tail != self.head);
    }

    /// Union of two touching spans; `later`'s head survives when it sits on
    /// an edge of the union
    pub fn merge(&self, later: &RangeSnapshot) -> RangeSnapshot {
        let start = self.start().min(later.start());
        let end = self.end().max(later.end());
        let (head, desired_column) = if later.head == start || later.head == end {
            (later.head, later.desired_column)
        } else {
            (self.head, self.desired_column)
        };
        let tail = if head == end { start } else { end };
        RangeSnapshot {
            tail: (tail != head).then_some(tail),
            head,
            desired_column,
        }
    }
}

/// All carets of a collection, by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaretState {
    pub ranges: Vec<RangeSnapshot>,
    pub primary: usize,
}

/// Everything one caret did during a batch
#[derive(Debug, Clone)]
pub struct RangeEdit {
    pub before: RangeSnapshot,
    pub after: RangeSnapshot,
    pub actions: Vec<EditAction>,
}

/// One undoable user command across all carets
#[derive(Debug, Clone)]
pub struct EditBatch {
    pub name: String,
    pub entries: Vec<RangeEdit>,
    pub before: CaretState,
    pub after: CaretState,
}

impl EditBatch {
    pub fn action_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.actions.len()).sum()
    }

    /// Replay the inverse of every action, last first
    pub fn revert(&self, buffer: &mut LineBuffer) {
        let mut seek = LineSeek::new(buffer);
        for entry in self.entries.iter().rev() {
            for action in entry.actions.iter().rev() {
                action.change.revert_with(buffer, &mut seek);
            }
        }
    }

    /// Replay every action in recording order
    pub fn apply(&self, buffer: &mut LineBuffer) {
        let mut seek = LineSeek::new(buffer);
        for entry in &self.entries {
            for action in &entry.actions {
                action.change.apply_with(buffer, &mut seek);
            }
        }
    }
}

/// Undo/redo stacks of edit batches.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo_stack: Vec<EditBatch>,
    redo_stack: Vec<EditBatch>,
    max_size: usize,
}

impl HistoryManager {
    /// Create a new history with the default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    /// Create a new history keeping at most `max_size` undo batches
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Push a batch onto the undo stack (clears redo stack)
    pub fn add_batch(&mut self, batch: EditBatch) {
        self.redo_stack.clear();
        self.undo_stack.push(batch);

        // Trim if exceeded max size
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Revert the newest batch and move it to the redo stack
    pub fn undo(&mut self, buffer: &mut LineBuffer) -> Option<&EditBatch> {
        let batch = self.undo_stack.pop()?;
        batch.revert(buffer);
        self.redo_stack.push(batch);
        self.redo_stack.last()
    }

    /// Re-apply the newest undone batch and move it back to the undo stack
    pub fn redo(&mut self, buffer: &mut LineBuffer) -> Option<&EditBatch> {
        let batch = self.redo_stack.pop()?;
        batch.apply(buffer);
        self.undo_stack.push(batch);
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Display name of the batch `undo` would revert
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|batch| batch.name.as_str())
    }

    /// Display name of the batch `redo` would re-apply
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|batch| batch.name.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Edit transaction for one caret: performs cursor primitives and records
/// each one as an [`EditAction`].
///
/// Tracks the ordinal of the line the focused cursor sits on, so recording
/// stays O(1) per primitive after the initial `focus`.
pub(crate) struct Recorder<'a> {
    buffer: &'a mut LineBuffer,
    line: usize,
    actions: Vec<EditAction>,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(buffer: &'a mut LineBuffer) -> Self {
        Self {
            buffer,
            line: 0,
            actions: Vec::new(),
        }
    }

    pub(crate) fn buffer(&self) -> &LineBuffer {
        &*self.buffer
    }

    /// Switch to `cursor`, computing its line ordinal
    pub(crate) fn focus(&mut self, cursor: &Cursor) {
        self.line = self.buffer.index_of(cursor.line());
    }

    /// Switch to a cursor whose line ordinal is already known
    pub(crate) fn focus_at(&mut self, line: usize) {
        self.line = line;
    }

    fn here(&self, cursor: &Cursor) -> Position {
        Position::new(self.line, cursor.column())
    }

    fn push(&mut self, change: Change, before: Position, after: Position) {
        self.actions.push(EditAction {
            change,
            before,
            after,
        });
    }

    pub(crate) fn insert_char(&mut self, cursor: &mut Cursor, ch: char) {
        let before = self.here(cursor);
        cursor.insert_character(self.buffer, ch);
        let after = self.here(cursor);
        self.push(Change::CharInserted { at: before, ch }, before, after);
    }

    pub(crate) fn insert_line_break(&mut self, cursor: &mut Cursor) {
        let before = self.here(cursor);
        cursor.insert_line_break(self.buffer);
        self.line += 1;
        let after = self.here(cursor);
        self.push(Change::LineBreakInserted { at: before }, before, after);
    }

    /// Multi-line text, one primitive per character; `\r` is dropped
    pub(crate) fn insert_text(&mut self, cursor: &mut Cursor, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                ch if is_line_break(ch) => self.insert_line_break(cursor),
                ch => self.insert_char(cursor, ch),
            }
        }
    }

    /// Single-line whitespace recorded as one indent change
    pub(crate) fn insert_whitespace(&mut self, cursor: &mut Cursor, text: &str) {
        if text.is_empty() {
            return;
        }
        let before = self.here(cursor);
        cursor.insert_text(self.buffer, text);
        let after = self.here(cursor);
        self.push(
            Change::IndentInserted {
                at: before,
                text: text.to_string(),
            },
            before,
            after,
        );
    }

    pub(crate) fn remove_before(&mut self, cursor: &mut Cursor) -> bool {
        let before = self.here(cursor);
        match cursor.remove_char_before(self.buffer) {
            Some(Removed::Char(ch)) => {
                let after = self.here(cursor);
                self.push(Change::CharRemoved { at: after, ch }, before, after);
                true
            }
            Some(Removed::LineBreak) => {
                self.line -= 1;
                let after = self.here(cursor);
                self.push(Change::LineBreakRemoved { at: after }, before, after);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_after(&mut self, cursor: &mut Cursor) -> bool {
        let before = self.here(cursor);
        let change = match cursor.remove_char_after(self.buffer) {
            Some(Removed::Char(ch)) => Change::CharRemoved { at: before, ch },
            Some(Removed::LineBreak) => Change::LineBreakRemoved { at: before },
            None => return false,
        };
        self.push(change, before, before);
        true
    }

    pub(crate) fn insert_indent(&mut self, cursor: &mut Cursor, width: usize) {
        let before = self.here(cursor);
        let text = cursor.increase_indent(self.buffer, width);
        let after = self.here(cursor);
        self.push(Change::IndentInserted { at: before, text }, before, after);
    }

    pub(crate) fn remove_indent(&mut self, cursor: &mut Cursor, width: usize) -> bool {
        let before = self.here(cursor);
        let text = cursor.decrease_indent(self.buffer, width);
        if text.is_empty() {
            return false;
        }
        let after = self.here(cursor);
        self.push(Change::IndentRemoved { at: after, text }, before, after);
        true
    }

    /// Swap `upper` (at ordinal `ordinal`) with the line below it
    pub(crate) fn swap_lines(&mut self, upper: LineId, ordinal: usize) -> bool {
        if !self.buffer.swap_with_next(upper) {
            return false;
        }
        let at = Position::new(ordinal, 0);
        self.push(Change::LinesSwapped { upper: ordinal }, at, at);
        true
    }

    pub(crate) fn finish(self) -> Vec<EditAction> {
        self.actions
    }
}
