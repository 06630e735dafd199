//! The `SourceCode` facade: one document with its carets and history.
//!
//! Every command goes through here. Text-changing commands run on all carets
//! via [`SelectionRangeCollection::apply_edit_to_all`] and are recorded as a
//! single [`EditBatch`]; listeners hear about it once the command completes.

use std::collections::HashSet;
use std::fmt;

use super::buffer::LineBuffer;
use super::context::EditContext;
use super::cursor::{Cursor, Position};
use super::history::{CaretState, EditAction, EditBatch, HistoryManager};
use super::listener::EditListener;
use super::messages::{EditMsg, MoveTarget};
use super::ranges::{EditOrder, SelectionRangeCollection};
use super::selection::SelectionRange;
use super::tokenizer::{TokenCache, Tokenizer};
use crate::config::EditorConfig;
use crate::tracing::CursorSnapshot;
use crate::util::text::is_line_break;

/// An in-memory document with one or more carets and undo/redo.
pub struct SourceCode {
    buffer: LineBuffer,
    ranges: SelectionRangeCollection,
    history: HistoryManager,
    tokens: TokenCache,
    config: EditorConfig,
    listeners: Vec<Box<dyn EditListener>>,
    modified: bool,
}

impl SourceCode {
    /// Empty document with default settings
    pub fn new() -> Self {
        Self::with_config("", EditorConfig::default())
    }

    pub fn from_text(text: &str) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    pub fn with_config(text: &str, config: EditorConfig) -> Self {
        let config = config.normalized();
        let buffer = LineBuffer::from_text(text);
        let ranges = SelectionRangeCollection::at_start(&buffer);
        Self {
            buffer,
            ranges,
            history: HistoryManager::with_max_size(config.max_history),
            tokens: TokenCache::default(),
            config,
            listeners: Vec::new(),
            modified: false,
        }
    }

    /// Replace the tokenizer used for word movement and word deletion
    pub fn set_tokenizer(&mut self, tokenizer: Box<dyn Tokenizer>) {
        self.tokens = TokenCache::new(tokenizer);
    }

    pub fn add_listener(&mut self, listener: Box<dyn EditListener>) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn EditListener)) {
        for listener in &mut self.listeners {
            f(listener.as_mut());
        }
    }

    fn notify_edit(&mut self) {
        self.notify(|listener| {
            listener.text_changed();
            listener.cursors_changed();
            listener.history_changed();
        });
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Full text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    /// Text of line `index` (O(n))
    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.buffer
            .nth(index)
            .map(|id| self.buffer.line(id).text())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buffer.iter().map(|(_, line)| line.text())
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn ranges(&self) -> &SelectionRangeCollection {
        &self.ranges
    }

    pub fn caret_count(&self) -> usize {
        self.ranges.count()
    }

    /// Head of the primary caret
    pub fn primary_caret(&self) -> Position {
        self.ranges.primary().head().position(&self.buffer)
    }

    /// Heads of all carets in document order
    pub fn caret_positions(&self) -> Vec<Position> {
        self.ranges.head_positions(&self.buffer)
    }

    pub fn caret_state(&self) -> CaretState {
        self.ranges.caret_state(&self.buffer)
    }

    /// Selected text of every caret with a selection, joined with `\n`
    pub fn selected_text(&self) -> String {
        self.ranges
            .ranges()
            .iter()
            .filter(|range| range.has_selection())
            .map(|range| range.selected_text(&self.buffer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_selection(&self) -> bool {
        self.ranges.ranges().iter().any(SelectionRange::has_selection)
    }

    /// Increases with every change to the text
    pub fn revision(&self) -> u64 {
        self.buffer.revision()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_name(&self) -> Option<&str> {
        self.history.undo_name()
    }

    pub fn redo_name(&self) -> Option<&str> {
        self.history.redo_name()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.notify(|listener| listener.history_changed());
    }

    /// Replace the whole document; carets reset and history is cleared
    pub fn load(&mut self, text: &str) {
        self.buffer.replace_all(text);
        self.ranges = SelectionRangeCollection::at_start(&self.buffer);
        self.history.clear();
        self.tokens.invalidate();
        self.modified = false;
        tracing::debug!(lines = self.buffer.len(), "Loaded document");
        self.notify_edit();
    }

    // =========================================================================
    // Caret management
    // =========================================================================

    fn after_caret_change(&mut self, changed: bool) -> bool {
        if changed {
            self.notify(|listener| listener.cursors_changed());
        }
        changed
    }

    /// Single caret at `pos` (clamped)
    pub fn set_caret(&mut self, pos: Position) {
        let head = Cursor::at_position(&self.buffer, pos);
        self.ranges.set_single(SelectionRange::new(head));
        self.after_caret_change(true);
    }

    /// Single selection from `tail` to `head` (clamped)
    pub fn set_selection(&mut self, tail: Position, head: Position) {
        let range = SelectionRange::with_selection(
            Cursor::at_position(&self.buffer, tail),
            Cursor::at_position(&self.buffer, head),
        );
        self.ranges.set_single(range);
        self.after_caret_change(true);
    }

    /// Add a caret; it becomes the primary caret
    pub fn add_caret(&mut self, pos: Position) {
        let head = Cursor::at_position(&self.buffer, pos);
        self.ranges.add_range(&self.buffer, SelectionRange::new(head));
        self.after_caret_change(true);
    }

    /// Add a selection; it becomes the primary caret
    pub fn add_selection(&mut self, tail: Position, head: Position) {
        let range = SelectionRange::with_selection(
            Cursor::at_position(&self.buffer, tail),
            Cursor::at_position(&self.buffer, head),
        );
        self.ranges.add_range(&self.buffer, range);
        self.after_caret_change(true);
    }

    /// Add a caret one line above the primary caret
    pub fn add_caret_above(&mut self) -> bool {
        self.add_caret_vertically(true)
    }

    /// Add a caret one line below the primary caret
    pub fn add_caret_below(&mut self) -> bool {
        self.add_caret_vertically(false)
    }

    fn add_caret_vertically(&mut self, up: bool) -> bool {
        let mut head = self.ranges.primary().head();
        let moved = if up {
            head.shift_line_up(&self.buffer, 1)
        } else {
            head.shift_line_down(&self.buffer, 1)
        };
        if !moved {
            tracing::trace!(up, "No line to add a caret on");
            return false;
        }
        let before = self.ranges.count();
        self.ranges.add_range(&self.buffer, SelectionRange::new(head));
        tracing::debug!(carets = self.ranges.count(), "Added caret");
        self.after_caret_change(self.ranges.count() != before)
    }

    /// Keep only the primary caret
    pub fn collapse_carets(&mut self) -> bool {
        let changed = self.ranges.collapse_to_primary();
        self.after_caret_change(changed)
    }

    /// Drop every selection, keeping the carets
    pub fn collapse_selection(&mut self) -> bool {
        let changed = self.ranges.apply_to_all(&self.buffer, |range| {
            let had = range.has_selection();
            range.collapse();
            had
        });
        self.after_caret_change(changed)
    }

    pub fn select_all(&mut self) {
        let start = Cursor::start_of(&self.buffer);
        let mut end = start;
        end.shift_to_document_end(&self.buffer);
        self.ranges
            .set_single(SelectionRange::with_selection(start, end));
        self.after_caret_change(true);
    }

    /// Select the token under every caret
    pub fn select_word(&mut self) -> bool {
        let tokens = self.tokens.snapshot(&self.buffer);
        let buffer = &self.buffer;
        let changed = self
            .ranges
            .apply_to_all(buffer, |range| range.select_word(buffer, tokens));
        self.after_caret_change(changed)
    }

    /// Select the whole lines under every caret
    pub fn select_line(&mut self) -> bool {
        let buffer = &self.buffer;
        self.ranges.apply_to_all(buffer, |range| {
            range.expand_to_lines(buffer);
            true
        });
        self.after_caret_change(true)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move every caret; `extend` grows the selections instead
    pub fn move_carets(&mut self, target: MoveTarget, extend: bool) -> bool {
        let tokens = self.tokens.snapshot(&self.buffer);
        let buffer = &self.buffer;
        let moved = self.ranges.apply_to_all(buffer, |range| {
            range.navigate(buffer, target, extend, tokens)
        });
        if !moved {
            tracing::trace!(?target, extend, "Carets did not move");
        }
        self.after_caret_change(moved)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Run `op` on every caret and record the result as one undo batch
    fn edit<F>(&mut self, name: &str, order: EditOrder, op: F) -> bool
    where
        F: FnMut(usize, &mut SelectionRange, &mut EditContext<'_>) -> Vec<EditAction>,
    {
        self.ranges.resolve_overlapping_ranges(&self.buffer);
        let before = self.ranges.caret_state(&self.buffer);
        self.edit_from(name, order, before, op)
    }

    /// Like [`edit`](Self::edit), for commands that reshape the carets before
    /// editing. `before` is what undo restores.
    fn edit_from<F>(&mut self, name: &str, order: EditOrder, before: CaretState, op: F) -> bool
    where
        F: FnMut(usize, &mut SelectionRange, &mut EditContext<'_>) -> Vec<EditAction>,
    {
        self.ranges.resolve_overlapping_ranges(&self.buffer);
        let entries = {
            let mut ctx = EditContext::new(&mut self.buffer, &mut self.tokens, &self.config);
            self.ranges.apply_edit_to_all(&mut ctx, order, op)
        };
        let after = self.ranges.caret_state(&self.buffer);

        if entries.is_empty() {
            tracing::trace!(command = name, "Nothing changed");
            let moved = before != after;
            self.after_caret_change(moved);
            return false;
        }

        let batch = EditBatch {
            name: name.to_string(),
            entries,
            before,
            after,
        };
        tracing::debug!(
            command = name,
            carets = self.ranges.count(),
            actions = batch.action_count(),
            revision = self.buffer.revision(),
            "Applied edit"
        );
        self.history.add_batch(batch);
        self.modified = true;
        self.notify_edit();
        true
    }

    /// Type a character at every caret
    pub fn insert_char(&mut self, ch: char) -> bool {
        let name = if ch != '\r' && is_line_break(ch) {
            "New Line"
        } else {
            "Typing"
        };
        self.edit(name, EditOrder::Ascending, |_, range, ctx| {
            range.insert_char_at_active(ctx, ch)
        })
    }

    /// Paste. With several carets and exactly one pasted line per caret,
    /// each caret gets its own line.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let normalized: String = text
            .replace("\r\n", "\n")
            .chars()
            .map(|ch| if ch != '\r' && is_line_break(ch) { '\n' } else { ch })
            .collect();
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        let lines: Vec<&str> = body.split('\n').collect();
        let carets = self.ranges.count();

        if carets > 1 && lines.len() == carets {
            tracing::debug!(
                carets,
                caret_lines = self.ranges.distinct_line_count(),
                "Pasting one line per caret"
            );
            self.edit("Paste", EditOrder::Ascending, |rank, range, ctx| {
                range.insert_string_at_active(ctx, lines.get(rank).copied().unwrap_or_default())
            })
        } else {
            self.edit("Paste", EditOrder::Ascending, |_, range, ctx| {
                range.insert_string_at_active(ctx, &normalized)
            })
        }
    }

    pub fn insert_newline(&mut self) -> bool {
        self.edit("New Line", EditOrder::Ascending, |_, range, ctx| {
            range.insert_line_break_at_active(ctx)
        })
    }

    /// Backspace at every caret
    pub fn delete_backward(&mut self) -> bool {
        self.edit("Backspace", EditOrder::Descending, |_, range, ctx| {
            range.remove_char_before_active(ctx)
        })
    }

    /// Delete at every caret
    pub fn delete_forward(&mut self) -> bool {
        self.edit("Delete", EditOrder::Descending, |_, range, ctx| {
            range.remove_char_after_active(ctx)
        })
    }

    pub fn delete_word_backward(&mut self) -> bool {
        self.edit("Delete Word", EditOrder::Descending, |_, range, ctx| {
            range.remove_word_before(ctx)
        })
    }

    pub fn delete_word_forward(&mut self) -> bool {
        self.edit("Delete Word", EditOrder::Descending, |_, range, ctx| {
            range.remove_word_after(ctx)
        })
    }

    /// Remove the selected text of every caret
    pub fn delete_selection(&mut self) -> bool {
        self.edit("Delete", EditOrder::Descending, |_, range, ctx| {
            range.remove_selected(ctx)
        })
    }

    /// Remove every line touched by a caret, each line once
    pub fn delete_line(&mut self) -> bool {
        self.ranges.resolve_overlapping_ranges(&self.buffer);
        let before = self.ranges.caret_state(&self.buffer);
        let buffer = &self.buffer;
        self.ranges.apply_to_all(buffer, |range| {
            range.expand_to_lines(buffer);
            true
        });
        self.edit_from("Delete Line", EditOrder::Descending, before, |_, range, ctx| {
            range.absorb_preceding_line_break(ctx.buffer);
            range.remove_selected(ctx)
        })
    }

    /// Duplicate each selection, or each caret's line (once per line)
    pub fn duplicate(&mut self) -> bool {
        let mut done = HashSet::new();
        self.edit("Duplicate", EditOrder::Ascending, |_, range, ctx| {
            range.duplicate_selection(ctx, &mut done)
        })
    }

    pub fn to_upper_case(&mut self) -> bool {
        self.edit("To Upper Case", EditOrder::Ascending, |_, range, ctx| {
            range.to_upper_case(ctx)
        })
    }

    pub fn to_lower_case(&mut self) -> bool {
        self.edit("To Lower Case", EditOrder::Ascending, |_, range, ctx| {
            range.to_lower_case(ctx)
        })
    }

    /// Indent the selected lines, or insert an indent at carets without a
    /// selection
    pub fn indent(&mut self) -> bool {
        let mut done = HashSet::new();
        self.edit("Indent", EditOrder::Ascending, |_, range, ctx| {
            if range.has_selection() {
                range.increase_indent_on_selected_lines(ctx, &mut done)
            } else {
                range.insert_char_at_active(ctx, '\t')
            }
        })
    }

    /// Unindent every line touched by a caret
    pub fn unindent(&mut self) -> bool {
        let mut done = HashSet::new();
        self.edit("Unindent", EditOrder::Ascending, |_, range, ctx| {
            range.decrease_indent_on_selected_lines(ctx, &mut done)
        })
    }

    pub fn move_lines_up(&mut self) -> bool {
        let mut moved = HashSet::new();
        self.edit("Move Line Up", EditOrder::Ascending, |_, range, ctx| {
            range.move_lines_up(ctx, &mut moved)
        })
    }

    pub fn move_lines_down(&mut self) -> bool {
        let mut moved = HashSet::new();
        self.edit("Move Line Down", EditOrder::Descending, |_, range, ctx| {
            range.move_lines_down(ctx, &mut moved)
        })
    }

    /// Remove the selections, returning what was selected (for the clipboard)
    pub fn cut(&mut self) -> String {
        let text = self.selected_text();
        if !text.is_empty() {
            self.edit("Cut", EditOrder::Descending, |_, range, ctx| {
                range.remove_selected(ctx)
            });
        }
        text
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        let Some(batch) = self.history.undo(&mut self.buffer) else {
            tracing::trace!("Nothing to undo");
            return false;
        };
        tracing::debug!(command = %batch.name, revision = self.buffer.revision(), "Undo");
        self.ranges.restore(&self.buffer, &batch.before);
        self.modified = true;
        self.notify_edit();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(batch) = self.history.redo(&mut self.buffer) else {
            tracing::trace!("Nothing to redo");
            return false;
        };
        tracing::debug!(command = %batch.name, revision = self.buffer.revision(), "Redo");
        self.ranges.restore(&self.buffer, &batch.after);
        self.modified = true;
        self.notify_edit();
        true
    }

    // =========================================================================
    // Message dispatch
    // =========================================================================

    /// Apply one command. Returns whether text or carets changed.
    pub fn update(&mut self, msg: EditMsg) -> bool {
        let trace = tracing::enabled!(tracing::Level::TRACE)
            .then(|| (format!("{:?}", msg), CursorSnapshot::from_source(self)));

        let changed = match msg {
            EditMsg::Move(target) => self.move_carets(target, false),
            EditMsg::MoveWithSelection(target) => self.move_carets(target, true),

            EditMsg::InsertChar(ch) => self.insert_char(ch),
            EditMsg::InsertText(text) => self.insert_text(&text),
            EditMsg::InsertNewline => self.insert_newline(),

            EditMsg::DeleteBackward => self.delete_backward(),
            EditMsg::DeleteForward => self.delete_forward(),
            EditMsg::DeleteWordBackward => self.delete_word_backward(),
            EditMsg::DeleteWordForward => self.delete_word_forward(),
            EditMsg::DeleteLine => self.delete_line(),

            EditMsg::SelectAll => {
                self.select_all();
                true
            }
            EditMsg::SelectWord => self.select_word(),
            EditMsg::SelectLine => self.select_line(),
            EditMsg::CollapseSelection => self.collapse_selection(),

            EditMsg::AddCursorAt(pos) => {
                self.add_caret(pos);
                true
            }
            EditMsg::AddCursorAbove => self.add_caret_above(),
            EditMsg::AddCursorBelow => self.add_caret_below(),
            EditMsg::CollapseCursors => self.collapse_carets(),

            EditMsg::Cut => !self.cut().is_empty(),

            EditMsg::Undo => self.undo(),
            EditMsg::Redo => self.redo(),

            EditMsg::Indent => self.indent(),
            EditMsg::Unindent => self.unindent(),
            EditMsg::Duplicate => self.duplicate(),
            EditMsg::ToUpperCase => self.to_upper_case(),
            EditMsg::ToLowerCase => self.to_lower_case(),
            EditMsg::MoveLineUp => self.move_lines_up(),
            EditMsg::MoveLineDown => self.move_lines_down(),
        };

        if let Some((msg, before)) = trace {
            let after = CursorSnapshot::from_source(self);
            if let Some(diff) = before.diff(&after) {
                tracing::trace!(msg = %msg, "{}", diff);
            }
        }
        changed
    }
}

impl Default for SourceCode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCode")
            .field("lines", &self.buffer.len())
            .field("carets", &self.ranges.count())
            .field("revision", &self.buffer.revision())
            .field("modified", &self.modified)
            .field("undo", &self.history.undo_count())
            .field("redo", &self.history.redo_count())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
