//! Selection ranges: one caret with an optional selection.
//!
//! Every text-mutating operation lives here and returns the [`EditAction`]s
//! it performed, in order. Navigation never touches the buffer and returns
//! whether anything moved.

use std::collections::HashSet;

use super::buffer::{LineBuffer, LineId, LineTable};
use super::context::EditContext;
use super::cursor::{Cursor, Position};
use super::history::{EditAction, RangeSnapshot, Recorder};
use super::messages::MoveTarget;
use super::tokenizer::TokenSnapshot;
use crate::util::text::is_line_break;

/// A caret: `head` is where edits happen, `tail` (if any) anchors a selection.
///
/// A tail at the head's place is collapsed to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    tail: Option<Cursor>,
    head: Cursor,
}

impl SelectionRange {
    /// Create a caret without a selection
    pub fn new(head: Cursor) -> Self {
        Self { tail: None, head }
    }

    /// Create a selection from `tail` to `head`
    pub fn with_selection(tail: Cursor, head: Cursor) -> Self {
        let mut range = Self {
            tail: Some(tail),
            head,
        };
        range.normalize();
        range
    }

    pub fn head(&self) -> Cursor {
        self.head
    }

    pub fn tail(&self) -> Option<Cursor> {
        self.tail
    }

    pub fn has_selection(&self) -> bool {
        self.tail.is_some()
    }

    /// Replace both ends
    pub fn select(&mut self, tail: Cursor, head: Cursor) {
        self.tail = Some(tail);
        self.head = head;
        self.normalize();
    }

    /// Drop the selection, keeping the head
    pub fn collapse(&mut self) {
        self.tail = None;
    }

    /// Collapse a tail sitting on the head
    pub fn normalize(&mut self) {
        if self.tail.is_some_and(|tail| tail.same_place(&self.head)) {
            self.tail = None;
        }
    }

    /// (first, last) in document order; both equal the head without a selection
    pub fn ordered(&self, buffer: &LineBuffer) -> (Cursor, Cursor) {
        match self.tail {
            Some(tail) if tail.cmp_in(&self.head, buffer).is_gt() => (self.head, tail),
            Some(tail) => (tail, self.head),
            None => (self.head, self.head),
        }
    }

    /// Head before tail
    pub fn is_reversed(&self, buffer: &LineBuffer) -> bool {
        self.tail
            .is_some_and(|tail| self.head.cmp_in(&tail, buffer).is_lt())
    }

    /// Position copy using a prebuilt ordinal table
    pub fn snapshot(&self, table: &LineTable) -> RangeSnapshot {
        let to_position = |cursor: &Cursor| Position::new(table.ordinal(cursor.line()), cursor.column());
        RangeSnapshot {
            tail: self.tail.as_ref().map(to_position),
            head: to_position(&self.head),
            desired_column: self.head.desired_column(),
        }
    }

    /// Position copy for a single range
    pub fn snapshot_in(&self, buffer: &LineBuffer) -> RangeSnapshot {
        RangeSnapshot {
            tail: self.tail.map(|tail| tail.position(buffer)),
            head: self.head.position(buffer),
            desired_column: self.head.desired_column(),
        }
    }

    /// Rebuild from a position copy, clamping to the buffer
    pub fn from_snapshot(buffer: &LineBuffer, snapshot: &RangeSnapshot) -> Self {
        let mut head = Cursor::at_position(buffer, snapshot.head);
        head.set_desired_column(snapshot.desired_column);
        let mut range = Self {
            tail: snapshot.tail.map(|tail| Cursor::at_position(buffer, tail)),
            head,
        };
        range.normalize();
        range
    }

    /// Text between the ordered ends, lines joined with `\n`
    pub fn selected_text(&self, buffer: &LineBuffer) -> String {
        if self.tail.is_none() {
            return String::new();
        }
        let (first, last) = self.ordered(buffer);
        if first.line() == last.line() {
            return buffer.line(first.line()).slice(first.column()..last.column());
        }

        let first_line = buffer.line(first.line());
        let mut text = first_line.slice(first.column()..first_line.len());
        let mut current = buffer.next(first.line());
        while let Some(id) = current {
            text.push('\n');
            let line = buffer.line(id);
            if id == last.line() {
                text.push_str(&line.slice(0..last.column()));
                break;
            }
            text.push_str(line.text());
            current = buffer.next(id);
        }
        text
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move the head. With `extend` the tail stays anchored; without it an
    /// existing selection is dropped, and a horizontal char move collapses
    /// the selection to its start/end instead of moving.
    pub fn navigate(
        &mut self,
        buffer: &LineBuffer,
        target: MoveTarget,
        extend: bool,
        tokens: &TokenSnapshot,
    ) -> bool {
        let had_selection = self.has_selection();
        if extend {
            if self.tail.is_none() {
                self.tail = Some(self.head);
            }
        } else if had_selection {
            if matches!(target, MoveTarget::Left | MoveTarget::Right) {
                let (first, last) = self.ordered(buffer);
                self.head = if target == MoveTarget::Left { first } else { last };
                self.head.clear_desired_column();
                self.tail = None;
                return true;
            }
            self.tail = None;
        }

        let head = &mut self.head;
        let moved = match target {
            MoveTarget::Left => head.shift_char_left(buffer),
            MoveTarget::Right => head.shift_char_right(buffer),
            MoveTarget::Up => head.shift_line_up(buffer, 1),
            MoveTarget::Down => head.shift_line_down(buffer, 1),
            MoveTarget::LineStart => {
                let moved = head.column() != 0;
                let line = head.line();
                head.place(buffer, line, 0);
                moved
            }
            MoveTarget::LineStartSmart => head.shift_to_home(buffer),
            MoveTarget::LineEnd => head.shift_to_end(buffer),
            MoveTarget::WordLeft => head.shift_word_left(buffer, tokens),
            MoveTarget::WordRight => head.shift_word_right(buffer, tokens),
            MoveTarget::DocumentStart => head.shift_to_document_start(buffer),
            MoveTarget::DocumentEnd => head.shift_to_document_end(buffer),
        };
        self.normalize();
        moved || (had_selection && !extend)
    }

    /// Select whole lines from the first touched line through the line break
    /// ending the last one (or the document end)
    pub fn expand_to_lines(&mut self, buffer: &LineBuffer) {
        let (first, last) = self.ordered(buffer);
        let start = Cursor::new(buffer, first.line(), 0);
        let end = match buffer.next(last.line()) {
            Some(next) => Cursor::new(buffer, next, 0),
            None => Cursor::new(buffer, last.line(), buffer.line(last.line()).len()),
        };
        self.select(start, end);
    }

    /// When whole lines are selected through the document end, also take the
    /// line break before them so no empty line is left behind
    pub fn absorb_preceding_line_break(&mut self, buffer: &LineBuffer) {
        let (first, last) = self.ordered(buffer);
        if first.column() != 0 || last.line() != buffer.last() || !last.is_at_line_end(buffer) {
            return;
        }
        if let Some(prev) = buffer.prev(first.line()) {
            let start = Cursor::new(buffer, prev, buffer.line(prev).len());
            self.select(start, last);
        }
    }

    /// Select the token under (or just before) the head
    pub fn select_word(&mut self, buffer: &LineBuffer, tokens: &TokenSnapshot) -> bool {
        let Some((start, end)) = tokens.span_at(self.head.position(buffer)) else {
            return false;
        };
        self.select(
            Cursor::at_position(buffer, start),
            Cursor::at_position(buffer, end),
        );
        true
    }

    // =========================================================================
    // Edits
    // =========================================================================

    fn remove_selection_with(&mut self, rec: &mut Recorder<'_>) -> bool {
        if self.tail.is_none() {
            return false;
        }
        let (first, last) = self.ordered(rec.buffer());
        let mut head = last;
        rec.focus(&head);
        while !head.same_place(&first) {
            if !rec.remove_before(&mut head) {
                break;
            }
        }
        self.head = head;
        self.tail = None;
        true
    }

    /// Delete the selected text one character at a time from the end
    pub fn remove_selected(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        let mut rec = Recorder::new(&mut *ctx.buffer);
        self.remove_selection_with(&mut rec);
        rec.finish()
    }

    /// Backspace
    pub fn remove_char_before_active(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        let mut rec = Recorder::new(&mut *ctx.buffer);
        if !self.remove_selection_with(&mut rec) {
            rec.focus(&self.head);
            rec.remove_before(&mut self.head);
        }
        rec.finish()
    }

    /// Delete
    pub fn remove_char_after_active(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        let mut rec = Recorder::new(&mut *ctx.buffer);
        if !self.remove_selection_with(&mut rec) {
            rec.focus(&self.head);
            rec.remove_after(&mut self.head);
        }
        rec.finish()
    }

    /// Delete back to the previous token boundary
    pub fn remove_word_before(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        if self.has_selection() {
            return self.remove_selected(ctx);
        }
        let mut target = self.head;
        let tokens = ctx.tokens.snapshot(ctx.buffer);
        if !target.shift_word_left(ctx.buffer, tokens) {
            return Vec::new();
        }

        let mut rec = Recorder::new(&mut *ctx.buffer);
        rec.focus(&self.head);
        while !self.head.same_place(&target) {
            if !rec.remove_before(&mut self.head) {
                break;
            }
        }
        rec.finish()
    }

    /// Delete forward to the next token boundary
    pub fn remove_word_after(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        if self.has_selection() {
            return self.remove_selected(ctx);
        }
        let mut target = self.head;
        let tokens = ctx.tokens.snapshot(ctx.buffer);
        if !target.shift_word_right(ctx.buffer, tokens) {
            return Vec::new();
        }
        // a word move either stays on the line or crosses exactly one break
        let steps = if target.line() == self.head.line() {
            target.column() - self.head.column()
        } else {
            1
        };

        let mut rec = Recorder::new(&mut *ctx.buffer);
        rec.focus(&self.head);
        for _ in 0..steps {
            if !rec.remove_after(&mut self.head) {
                break;
            }
        }
        rec.finish()
    }

    /// Type one character, replacing any selection. `\t` inserts an indent,
    /// any other line terminator a line break, `\r` is ignored.
    pub fn insert_char_at_active(&mut self, ctx: &mut EditContext<'_>, ch: char) -> Vec<EditAction> {
        match ch {
            '\r' => return Vec::new(),
            ch if is_line_break(ch) => return self.insert_line_break_at_active(ctx),
            _ => {}
        }
        let width = ctx.indent_width;
        let mut rec = Recorder::new(&mut *ctx.buffer);
        self.remove_selection_with(&mut rec);
        rec.focus(&self.head);
        if ch == '\t' {
            rec.insert_indent(&mut self.head, width);
        } else {
            rec.insert_char(&mut self.head, ch);
        }
        rec.finish()
    }

    /// Split the line at the head, carrying indentation over when enabled
    pub fn insert_line_break_at_active(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        let width = ctx.indent_width;
        let auto_indent = ctx.auto_indent;
        let mut rec = Recorder::new(&mut *ctx.buffer);
        self.remove_selection_with(&mut rec);
        rec.focus(&self.head);

        let indent = if auto_indent {
            let line = rec.buffer().line(self.head.line());
            let column = self.head.column();
            let mut indent = line.slice(0..line.first_non_whitespace_column().min(column));
            if line.slice(0..column).trim_end().ends_with('{') {
                indent.push_str(&" ".repeat(width));
            }
            indent
        } else {
            String::new()
        };

        rec.insert_line_break(&mut self.head);
        rec.insert_whitespace(&mut self.head, &indent);
        rec.finish()
    }

    /// Insert a string, replacing any selection. Line breaks split lines,
    /// tabs expand to an indent.
    pub fn insert_string_at_active(&mut self, ctx: &mut EditContext<'_>, text: &str) -> Vec<EditAction> {
        let width = ctx.indent_width;
        let mut rec = Recorder::new(&mut *ctx.buffer);
        self.remove_selection_with(&mut rec);
        rec.focus(&self.head);
        for ch in text.chars() {
            match ch {
                '\r' => {}
                ch if is_line_break(ch) => rec.insert_line_break(&mut self.head),
                '\t' => rec.insert_indent(&mut self.head, width),
                ch => rec.insert_char(&mut self.head, ch),
            }
        }
        rec.finish()
    }

    /// Without a selection copy the whole line below itself; with one, insert
    /// the selected text after it and select the copy.
    ///
    /// Lines in `done` were already copied during this command; a caret on
    /// one of them just moves onto the copy.
    pub fn duplicate_selection(
        &mut self,
        ctx: &mut EditContext<'_>,
        done: &mut HashSet<LineId>,
    ) -> Vec<EditAction> {
        if !self.has_selection() && !done.insert(self.head.line()) {
            if let Some(copy) = ctx.buffer.next(self.head.line()) {
                self.head = Cursor::new(ctx.buffer, copy, self.head.column());
            }
            return Vec::new();
        }

        let mut rec = Recorder::new(&mut *ctx.buffer);

        if self.has_selection() {
            let text = self.selected_text(rec.buffer());
            let (_, last) = self.ordered(rec.buffer());
            let mut cursor = last;
            rec.focus(&cursor);
            rec.insert_text(&mut cursor, &text);
            self.tail = Some(last);
            self.head = cursor;
        } else {
            let line_id = self.head.line();
            let column = self.head.column();
            let line = rec.buffer().line(line_id);
            let text = line.text().to_string();
            let mut cursor = Cursor::new(rec.buffer(), line_id, line.len());
            rec.focus(&cursor);
            rec.insert_line_break(&mut cursor);
            rec.insert_text(&mut cursor, &text);
            self.head = Cursor::new(rec.buffer(), cursor.line(), column);
        }
        rec.finish()
    }

    pub fn to_upper_case(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        self.replace_selected_with(ctx, str::to_uppercase)
    }

    pub fn to_lower_case(&mut self, ctx: &mut EditContext<'_>) -> Vec<EditAction> {
        self.replace_selected_with(ctx, str::to_lowercase)
    }

    /// Replace the selection with `transform(selection)`, keeping it selected
    /// in the same direction
    fn replace_selected_with(
        &mut self,
        ctx: &mut EditContext<'_>,
        transform: impl Fn(&str) -> String,
    ) -> Vec<EditAction> {
        if !self.has_selection() {
            return Vec::new();
        }
        let text = self.selected_text(ctx.buffer);
        let replaced = transform(&text);
        if replaced == text {
            return Vec::new();
        }
        let reversed = self.is_reversed(ctx.buffer);

        let mut rec = Recorder::new(&mut *ctx.buffer);
        self.remove_selection_with(&mut rec);
        let start = self.head;
        rec.focus(&self.head);
        rec.insert_text(&mut self.head, &replaced);
        let end = self.head;

        if reversed {
            self.select(end, start);
        } else {
            self.select(start, end);
        }
        rec.finish()
    }

    /// Indent every touched line not yet in `done` at its first
    /// non-whitespace column
    pub fn increase_indent_on_selected_lines(
        &mut self,
        ctx: &mut EditContext<'_>,
        done: &mut HashSet<LineId>,
    ) -> Vec<EditAction> {
        self.change_indent_on_lines(ctx, done, true)
    }

    /// Unindent every touched line not yet in `done`
    pub fn decrease_indent_on_selected_lines(
        &mut self,
        ctx: &mut EditContext<'_>,
        done: &mut HashSet<LineId>,
    ) -> Vec<EditAction> {
        self.change_indent_on_lines(ctx, done, false)
    }

    fn change_indent_on_lines(
        &mut self,
        ctx: &mut EditContext<'_>,
        done: &mut HashSet<LineId>,
        increase: bool,
    ) -> Vec<EditAction> {
        let width = ctx.indent_width;
        let mut own = self.snapshot_in(ctx.buffer);
        let (first, last) = self.ordered(ctx.buffer);
        let mut ordinal = own.start().line;

        let mut rec = Recorder::new(&mut *ctx.buffer);
        let mut current = Some(first.line());
        while let Some(id) = current {
            if done.insert(id) {
                let column = rec.buffer().line(id).first_non_whitespace_column();
                let mut cursor = Cursor::new(rec.buffer(), id, column);
                rec.focus_at(ordinal);
                if increase {
                    rec.insert_indent(&mut cursor, width);
                } else {
                    rec.remove_indent(&mut cursor, width);
                }
            }
            if id == last.line() {
                break;
            }
            current = rec.buffer().next(id);
            ordinal += 1;
        }
        let actions = rec.finish();

        own.transform(&actions);
        *self = Self::from_snapshot(ctx.buffer, &own);
        actions
    }

    fn touched_lines(&self, buffer: &LineBuffer) -> Vec<LineId> {
        let (first, last) = self.ordered(buffer);
        let mut lines = vec![first.line()];
        let mut current = first.line();
        while current != last.line() {
            match buffer.next(current) {
                Some(next) => {
                    lines.push(next);
                    current = next;
                }
                None => break,
            }
        }
        lines
    }

    /// Move the touched lines one line up.
    ///
    /// `moved` holds the lines already moved or pinned during this command.
    /// Lines in it are left alone, and lines that cannot move (at the top, or
    /// below a pinned line) are pinned themselves so a block of carets stays
    /// in order.
    pub fn move_lines_up(
        &mut self,
        ctx: &mut EditContext<'_>,
        moved: &mut HashSet<LineId>,
    ) -> Vec<EditAction> {
        let lines = self.touched_lines(ctx.buffer);
        if lines.iter().any(|id| moved.contains(id)) {
            return Vec::new();
        }
        let above = match ctx.buffer.prev(lines[0]) {
            Some(above) if !moved.contains(&above) => above,
            _ => {
                moved.extend(lines);
                return Vec::new();
            }
        };
        let mut ordinal = ctx.buffer.index_of(above);

        let mut rec = Recorder::new(&mut *ctx.buffer);
        for _ in &lines {
            rec.swap_lines(above, ordinal);
            ordinal += 1;
        }
        moved.extend(lines);
        rec.finish()
    }

    /// Move the touched lines one line down, with the same pinning as
    /// [`move_lines_up`](Self::move_lines_up)
    pub fn move_lines_down(
        &mut self,
        ctx: &mut EditContext<'_>,
        moved: &mut HashSet<LineId>,
    ) -> Vec<EditAction> {
        let lines = self.touched_lines(ctx.buffer);
        if lines.iter().any(|id| moved.contains(id)) {
            return Vec::new();
        }
        let Some(&bottom) = lines.last() else {
            return Vec::new();
        };
        let below = match ctx.buffer.next(bottom) {
            Some(below) if !moved.contains(&below) => below,
            _ => {
                moved.extend(lines);
                return Vec::new();
            }
        };
        let mut ordinal = ctx.buffer.index_of(below);

        let mut rec = Recorder::new(&mut *ctx.buffer);
        for _ in &lines {
            let Some(upper) = rec.buffer().prev(below) else {
                break;
            };
            ordinal -= 1;
            rec.swap_lines(upper, ordinal);
        }
        moved.extend(lines);
        rec.finish()
    }
}
