//! Cursor and position types for the editing core.
//!
//! A [`Position`] is a plain (line ordinal, column) pair used wherever a
//! location has to outlive structural edits (history, snapshots, tests).
//! A [`Cursor`] is bound to a [`LineId`] instead, so it keeps pointing at the
//! same line when lines above it are inserted or removed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::buffer::{LineBuffer, LineId};
use super::tokenizer::TokenSnapshot;
use crate::util::text::{is_inline_whitespace, is_line_break, next_indent_stop, prev_indent_stop};

/// A position in the text buffer (line and column, both 0-indexed).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn zero() -> Self {
        Self { line: 0, column: 0 }
    }
}

/// What a single-character removal took out of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removed {
    Char(char),
    LineBreak,
}

/// A cursor in the text buffer with optional desired column for vertical movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    line: LineId,
    column: usize,
    /// Desired column for vertical movement.
    /// When moving up/down through lines of varying length, this preserves
    /// the "intended" column position even when a shorter line is traversed.
    desired_column: Option<usize>,
}

impl Cursor {
    /// Create a cursor on `line`, clamping the column to the line length
    pub fn new(buffer: &LineBuffer, line: LineId, column: usize) -> Self {
        Self {
            line,
            column: column.min(buffer.line(line).len()),
            desired_column: None,
        }
    }

    /// Cursor at the first column of the document
    pub fn start_of(buffer: &LineBuffer) -> Self {
        Self::new(buffer, buffer.first(), 0)
    }

    /// Resolve a position, clamping the line to the last line and the
    /// column to that line's length
    pub fn at_position(buffer: &LineBuffer, pos: Position) -> Self {
        let line = buffer.nth(pos.line).unwrap_or_else(|| buffer.last());
        Self::new(buffer, line, pos.column)
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn desired_column(&self) -> Option<usize> {
        self.desired_column
    }

    pub(crate) fn set_desired_column(&mut self, desired: Option<usize>) {
        self.desired_column = desired;
    }

    /// Move to an explicit place (clamped), forgetting the desired column
    pub fn place(&mut self, buffer: &LineBuffer, line: LineId, column: usize) {
        self.line = line;
        self.column = column.min(buffer.line(line).len());
        self.desired_column = None;
    }

    /// Convert to a line-ordinal position (O(n) in the line index)
    pub fn position(&self, buffer: &LineBuffer) -> Position {
        Position::new(buffer.index_of(self.line), self.column)
    }

    /// Same line and column, ignoring the desired column
    pub fn same_place(&self, other: &Cursor) -> bool {
        self.line == other.line && self.column == other.column
    }

    /// Document order: line order first, then column
    pub fn cmp_in(&self, other: &Cursor, buffer: &LineBuffer) -> Ordering {
        if self.line == other.line {
            return self.column.cmp(&other.column);
        }
        buffer
            .index_of(self.line)
            .cmp(&buffer.index_of(other.line))
    }

    /// Clear desired column (call after horizontal movement)
    pub fn clear_desired_column(&mut self) {
        self.desired_column = None;
    }

    /// Remember the current column (call before vertical movement)
    pub fn remember_column(&mut self) {
        if self.desired_column.is_none() {
            self.desired_column = Some(self.column);
        }
    }

    /// Get the effective column for positioning (uses desired_column if set)
    pub fn effective_column(&self) -> usize {
        self.desired_column.unwrap_or(self.column)
    }

    pub fn is_at_line_start(&self) -> bool {
        self.column == 0
    }

    pub fn is_at_line_end(&self, buffer: &LineBuffer) -> bool {
        self.column >= buffer.line(self.line).len()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move one character left, wrapping to the end of the previous line
    pub fn shift_char_left(&mut self, buffer: &LineBuffer) -> bool {
        self.desired_column = None;
        if self.column > 0 {
            self.column -= 1;
            return true;
        }
        match buffer.prev(self.line) {
            Some(prev) => {
                self.line = prev;
                self.column = buffer.line(prev).len();
                true
            }
            None => false,
        }
    }

    /// Move one character right, wrapping to the start of the next line
    pub fn shift_char_right(&mut self, buffer: &LineBuffer) -> bool {
        self.desired_column = None;
        if self.column < buffer.line(self.line).len() {
            self.column += 1;
            return true;
        }
        match buffer.next(self.line) {
            Some(next) => {
                self.line = next;
                self.column = 0;
                true
            }
            None => false,
        }
    }

    /// Move up by `count` lines, keeping the desired column
    pub fn shift_line_up(&mut self, buffer: &LineBuffer, count: usize) -> bool {
        self.shift_lines(buffer, count, |b, id| b.prev(id))
    }

    /// Move down by `count` lines, keeping the desired column
    pub fn shift_line_down(&mut self, buffer: &LineBuffer, count: usize) -> bool {
        self.shift_lines(buffer, count, |b, id| b.next(id))
    }

    fn shift_lines(
        &mut self,
        buffer: &LineBuffer,
        count: usize,
        step: impl Fn(&LineBuffer, LineId) -> Option<LineId>,
    ) -> bool {
        let mut target = self.line;
        let mut moved = 0;
        while moved < count {
            match step(buffer, target) {
                Some(id) => {
                    target = id;
                    moved += 1;
                }
                None => break,
            }
        }
        if moved == 0 {
            return false;
        }

        self.remember_column();
        self.line = target;
        self.column = self.effective_column().min(buffer.line(target).len());
        true
    }

    /// Jump to the previous token boundary on this line, then to the line
    /// start, then across the line break
    pub fn shift_word_left(&mut self, buffer: &LineBuffer, tokens: &TokenSnapshot) -> bool {
        let line_index = buffer.index_of(self.line);
        let here = Position::new(line_index, self.column);

        if let Some(boundary) = tokens.prev_boundary(here) {
            if boundary.line == line_index {
                self.column = boundary.column;
                self.desired_column = None;
                return true;
            }
        }
        if self.column > 0 {
            self.column = 0;
            self.desired_column = None;
            return true;
        }
        self.shift_char_left(buffer)
    }

    /// Jump to the next token boundary on this line, then to the line end,
    /// then across the line break
    pub fn shift_word_right(&mut self, buffer: &LineBuffer, tokens: &TokenSnapshot) -> bool {
        let line_index = buffer.index_of(self.line);
        let here = Position::new(line_index, self.column);
        let len = buffer.line(self.line).len();

        if let Some(boundary) = tokens.next_boundary(here) {
            if boundary.line == line_index {
                self.column = boundary.column.min(len);
                self.desired_column = None;
                return true;
            }
        }
        if self.column < len {
            self.column = len;
            self.desired_column = None;
            return true;
        }
        self.shift_char_right(buffer)
    }

    /// Smart home: toggle between the first non-whitespace column and column 0
    pub fn shift_to_home(&mut self, buffer: &LineBuffer) -> bool {
        let first_non_ws = buffer.line(self.line).first_non_whitespace_column();
        let target = if self.column == first_non_ws {
            0
        } else {
            first_non_ws
        };
        self.desired_column = None;
        let moved = target != self.column;
        self.column = target;
        moved
    }

    pub fn shift_to_end(&mut self, buffer: &LineBuffer) -> bool {
        let len = buffer.line(self.line).len();
        self.desired_column = None;
        let moved = self.column != len;
        self.column = len;
        moved
    }

    pub fn shift_to_document_start(&mut self, buffer: &LineBuffer) -> bool {
        let target = Self::start_of(buffer);
        let moved = !self.same_place(&target);
        *self = target;
        moved
    }

    pub fn shift_to_document_end(&mut self, buffer: &LineBuffer) -> bool {
        let last = buffer.last();
        let target = Self::new(buffer, last, buffer.line(last).len());
        let moved = !self.same_place(&target);
        *self = target;
        moved
    }

    // =========================================================================
    // Edits (mutate the buffer at the cursor; recording happens one level up)
    // =========================================================================

    /// Split the line at the cursor; the cursor lands at column 0 of the new line
    pub fn insert_line_break(&mut self, buffer: &mut LineBuffer) -> LineId {
        let new_line = buffer.split(self.line, self.column);
        self.line = new_line;
        self.column = 0;
        self.desired_column = None;
        new_line
    }

    /// Insert a single non-line-break character and advance past it
    pub fn insert_character(&mut self, buffer: &mut LineBuffer, ch: char) {
        assert!(!is_line_break(ch), "line breaks go through insert_line_break");
        let mut encoded = [0u8; 4];
        buffer.insert_text(self.line, self.column, ch.encode_utf8(&mut encoded));
        self.column += 1;
        self.desired_column = None;
    }

    /// Insert text that may span several lines. `\r` is dropped and every
    /// other line terminator breaks the line.
    pub fn insert_text(&mut self, buffer: &mut LineBuffer, text: &str) {
        for (i, segment) in text.split(|c: char| c != '\r' && is_line_break(c)).enumerate() {
            if i > 0 {
                self.insert_line_break(buffer);
            }
            let segment: String = segment.chars().filter(|c| *c != '\r').collect();
            buffer.insert_text(self.line, self.column, &segment);
            self.column += segment.chars().count();
        }
        self.desired_column = None;
    }

    /// Backspace: remove the character before the cursor, or join with the
    /// previous line at column 0. `None` at the document start.
    pub fn remove_char_before(&mut self, buffer: &mut LineBuffer) -> Option<Removed> {
        self.desired_column = None;
        if self.column > 0 {
            let removed = buffer.remove_text(self.line, self.column - 1..self.column);
            self.column -= 1;
            return removed.chars().next().map(Removed::Char);
        }

        let prev = buffer.prev(self.line)?;
        // repoint before the line goes away
        let join_column = buffer.line(prev).len();
        self.line = prev;
        self.column = join_column;
        buffer.join_next(prev)?;
        Some(Removed::LineBreak)
    }

    /// Delete: remove the character after the cursor, or pull the next line
    /// up at the line end. `None` at the document end.
    pub fn remove_char_after(&mut self, buffer: &mut LineBuffer) -> Option<Removed> {
        self.desired_column = None;
        if self.column < buffer.line(self.line).len() {
            let removed = buffer.remove_text(self.line, self.column..self.column + 1);
            return removed.chars().next().map(Removed::Char);
        }
        buffer.join_next(self.line).map(|_| Removed::LineBreak)
    }

    /// Insert spaces up to the next indent stop; returns the inserted fill
    pub fn increase_indent(&mut self, buffer: &mut LineBuffer, width: usize) -> String {
        let target = next_indent_stop(self.column, width);
        let fill = " ".repeat(target - self.column);
        buffer.insert_text(self.line, self.column, &fill);
        self.column = target;
        self.desired_column = None;
        fill
    }

    /// Remove whitespace left of the cursor back to the previous indent stop,
    /// stopping at the first non-whitespace character. Returns what was removed.
    pub fn decrease_indent(&mut self, buffer: &mut LineBuffer, width: usize) -> String {
        let stop = prev_indent_stop(self.column, width);
        let line = buffer.line(self.line);
        let mut start = self.column;
        while start > stop && line.char_at(start - 1).is_some_and(is_inline_whitespace) {
            start -= 1;
        }
        self.desired_column = None;
        if start == self.column {
            return String::new();
        }
        let removed = buffer.remove_text(self.line, start..self.column);
        self.column = start;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::tokenizer::WordTokenizer;

    fn cursor_at(buffer: &LineBuffer, line: usize, column: usize) -> Cursor {
        Cursor::at_position(buffer, Position::new(line, column))
    }

    #[test]
    fn test_position_ordering() {
        let a = Position::new(0, 5);
        let b = Position::new(1, 0);
        let c = Position::new(1, 3);

        assert!(a < b);
        assert!(b < c);
        assert!(a < c);
    }

    #[test]
    fn test_column_clamped_on_construction() {
        let buffer = LineBuffer::from_text("abc\nx");
        let cursor = cursor_at(&buffer, 0, 99);
        assert_eq!(cursor.column(), 3);
        let cursor = cursor_at(&buffer, 7, 5);
        assert_eq!(cursor.position(&buffer), Position::new(1, 1));
    }

    #[test]
    fn test_shift_char_crosses_lines() {
        let buffer = LineBuffer::from_text("ab\ncd");
        let mut cursor = cursor_at(&buffer, 1, 0);
        assert!(cursor.shift_char_left(&buffer));
        assert_eq!(cursor.position(&buffer), Position::new(0, 2));
        assert!(cursor.shift_char_right(&buffer));
        assert_eq!(cursor.position(&buffer), Position::new(1, 0));
    }

    #[test]
    fn test_shift_char_at_document_edges_is_noop() {
        let buffer = LineBuffer::from_text("ab");
        let mut cursor = cursor_at(&buffer, 0, 0);
        assert!(!cursor.shift_char_left(&buffer));
        let mut cursor = cursor_at(&buffer, 0, 2);
        assert!(!cursor.shift_char_right(&buffer));
        assert_eq!(cursor.column(), 2);
    }

    #[test]
    fn test_vertical_movement_remembers_column() {
        let buffer = LineBuffer::from_text("long line here\nab\nanother long line");
        let mut cursor = cursor_at(&buffer, 0, 10);
        assert!(cursor.shift_line_down(&buffer, 1));
        assert_eq!(cursor.position(&buffer), Position::new(1, 2));
        assert!(cursor.shift_line_down(&buffer, 1));
        assert_eq!(cursor.position(&buffer), Position::new(2, 10));

        cursor.shift_char_left(&buffer);
        assert_eq!(cursor.desired_column(), None);
    }

    #[test]
    fn test_vertical_movement_stops_at_edges() {
        let buffer = LineBuffer::from_text("a\nb");
        let mut cursor = cursor_at(&buffer, 0, 1);
        assert!(!cursor.shift_line_up(&buffer, 1));
        assert!(cursor.shift_line_down(&buffer, 5));
        assert_eq!(cursor.position(&buffer), Position::new(1, 1));
    }

    #[test]
    fn test_smart_home_toggles() {
        let buffer = LineBuffer::from_text("    let x = 1;");
        let mut cursor = cursor_at(&buffer, 0, 10);
        assert!(cursor.shift_to_home(&buffer));
        assert_eq!(cursor.column(), 4);
        assert!(cursor.shift_to_home(&buffer));
        assert_eq!(cursor.column(), 0);
        assert!(cursor.shift_to_home(&buffer));
        assert_eq!(cursor.column(), 4);
    }

    #[test]
    fn test_word_navigation_uses_token_boundaries() {
        let buffer = LineBuffer::from_text("foo.bar baz\nnext");
        let tokens = TokenSnapshot::capture(&WordTokenizer, &buffer);
        let mut cursor = cursor_at(&buffer, 0, 0);

        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.column(), 3);
        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.column(), 4);
        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.column(), 7);
        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.column(), 8);
        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.column(), 11);
        // line end falls back to a character shift
        assert!(cursor.shift_word_right(&buffer, &tokens));
        assert_eq!(cursor.position(&buffer), Position::new(1, 0));

        assert!(cursor.shift_word_left(&buffer, &tokens));
        assert_eq!(cursor.position(&buffer), Position::new(0, 11));
        assert!(cursor.shift_word_left(&buffer, &tokens));
        assert_eq!(cursor.column(), 8);
    }

    #[test]
    fn test_insert_line_break_moves_to_new_line() {
        let mut buffer = LineBuffer::from_text("hello world");
        let mut cursor = cursor_at(&buffer, 0, 5);
        let original = cursor.line();
        let new_line = cursor.insert_line_break(&mut buffer);
        assert_ne!(new_line, original);
        assert_eq!(cursor.line(), new_line);
        assert_eq!(cursor.column(), 0);
        assert_eq!(buffer.text(), "hello\n world");
    }

    #[test]
    fn test_insert_text_multiline() {
        let mut buffer = LineBuffer::from_text("[]");
        let mut cursor = cursor_at(&buffer, 0, 1);
        cursor.insert_text(&mut buffer, "a\r\nbc\nd");
        assert_eq!(buffer.text(), "[a\nbc\nd]");
        assert_eq!(cursor.position(&buffer), Position::new(2, 1));
    }

    #[test]
    fn test_remove_char_before_joins_lines() {
        let mut buffer = LineBuffer::from_text("ab\ncd");
        let mut cursor = cursor_at(&buffer, 1, 0);
        assert_eq!(cursor.remove_char_before(&mut buffer), Some(Removed::LineBreak));
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(cursor.position(&buffer), Position::new(0, 2));
        assert_eq!(cursor.remove_char_before(&mut buffer), Some(Removed::Char('b')));
        assert_eq!(buffer.text(), "acd");
    }

    #[test]
    fn test_remove_at_document_edges_is_noop() {
        let mut buffer = LineBuffer::from_text("x");
        let mut cursor = cursor_at(&buffer, 0, 0);
        assert_eq!(cursor.remove_char_before(&mut buffer), None);
        let mut cursor = cursor_at(&buffer, 0, 1);
        assert_eq!(cursor.remove_char_after(&mut buffer), None);
        assert_eq!(buffer.text(), "x");
    }

    #[test]
    fn test_remove_char_after_pulls_next_line() {
        let mut buffer = LineBuffer::from_text("ab\ncd");
        let mut cursor = cursor_at(&buffer, 0, 2);
        assert_eq!(cursor.remove_char_after(&mut buffer), Some(Removed::LineBreak));
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(cursor.column(), 2);
    }

    #[test]
    fn test_increase_indent_rounds_up_to_stop() {
        let mut buffer = LineBuffer::from_text("ab");
        let mut cursor = cursor_at(&buffer, 0, 1);
        assert_eq!(cursor.increase_indent(&mut buffer, 4), "   ");
        assert_eq!(buffer.text(), "a   b");
        assert_eq!(cursor.column(), 4);
    }

    #[test]
    fn test_decrease_indent_removes_only_available_whitespace() {
        let mut buffer = LineBuffer::from_text("  foo");
        let mut cursor = cursor_at(&buffer, 0, 2);
        assert_eq!(cursor.decrease_indent(&mut buffer, 4), "  ");
        assert_eq!(buffer.text(), "foo");
        assert_eq!(cursor.column(), 0);
    }

    #[test]
    fn test_decrease_indent_never_deletes_non_whitespace() {
        let mut buffer = LineBuffer::from_text("ab  cd");
        let mut cursor = cursor_at(&buffer, 0, 4);
        assert_eq!(cursor.decrease_indent(&mut buffer, 4), "  ");
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(cursor.column(), 2);
    }

    #[test]
    fn test_indent_round_trip() {
        for original in ["foo", "    foo", ""] {
            let mut buffer = LineBuffer::from_text(original);
            let column = buffer.line(buffer.first()).first_non_whitespace_column();
            let mut cursor = cursor_at(&buffer, 0, column);
            cursor.increase_indent(&mut buffer, 4);
            cursor.decrease_indent(&mut buffer, 4);
            assert_eq!(buffer.text(), original);
            assert_eq!(cursor.column(), column);
        }
    }
}
