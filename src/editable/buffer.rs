//! Line buffer for the editing core.
//!
//! Lines live in a [`SlotMap`] arena and are chained into a doubly-linked
//! order through their `prev`/`next` keys. A [`LineId`] stays valid across
//! edits to *other* lines, so cursors can hold one instead of an ordinal that
//! would shift whenever a line is inserted or removed above them.
//!
//! The buffer is never empty: an empty document is a single empty line.

use std::fmt;
use std::ops::Range;

use ropey::Rope;
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::util::text::{char_to_byte, leading_whitespace, LINE_BREAKS};

new_key_type! {
    /// Stable identity of a line in a [`LineBuffer`].
    pub struct LineId;
}

/// A single line of text. Never contains a line break.
#[derive(Debug, Clone, Default)]
pub struct Line {
    text: String,
    /// Length in characters (cached)
    len: usize,
    prev: Option<LineId>,
    next: Option<LineId>,
}

impl Line {
    fn new(text: String) -> Self {
        debug_assert!(!text.contains(&LINE_BREAKS[..]), "line text may not contain a line break");
        let len = text.chars().count();
        Self {
            text,
            len,
            prev: None,
            next: None,
        }
    }

    /// Line content without any line terminator
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Character at `column`, `None` past the end of the line
    pub fn char_at(&self, column: usize) -> Option<char> {
        if column >= self.len {
            return None;
        }
        self.text.chars().nth(column)
    }

    /// Text between two character columns (clamped to the line)
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len);
        let end = range.end.min(self.len);
        if start >= end {
            return String::new();
        }
        self.text.chars().skip(start).take(end - start).collect()
    }

    /// Column of the first non-whitespace character (line length if blank)
    pub fn first_non_whitespace_column(&self) -> usize {
        leading_whitespace(&self.text)
    }

    fn insert_str(&mut self, column: usize, text: &str) {
        debug_assert!(
            !text.contains(&LINE_BREAKS[..]),
            "inserted text may not contain a line break"
        );
        let byte = char_to_byte(&self.text, column.min(self.len));
        self.text.insert_str(byte, text);
        self.len += text.chars().count();
    }

    fn remove_range(&mut self, range: Range<usize>) -> String {
        let start = range.start.min(self.len);
        let end = range.end.min(self.len);
        if start >= end {
            return String::new();
        }
        let start_byte = char_to_byte(&self.text, start);
        let end_byte = char_to_byte(&self.text, end);
        let removed = self.text[start_byte..end_byte].to_string();
        self.text.replace_range(start_byte..end_byte, "");
        self.len -= end - start;
        removed
    }

    fn split_off(&mut self, column: usize) -> String {
        let column = column.min(self.len);
        let byte = char_to_byte(&self.text, column);
        let tail = self.text.split_off(byte);
        self.len = column;
        tail
    }

    fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
        self.len += text.chars().count();
    }
}

/// Errors reported by structural [`LineBuffer`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBufferError {
    /// The buffer must always keep at least one line
    LastLine,
}

impl fmt::Display for LineBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastLine => write!(f, "cannot remove the only line of the buffer"),
        }
    }
}

impl std::error::Error for LineBufferError {}

/// Ordered, never-empty collection of lines with stable identities.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    lines: SlotMap<LineId, Line>,
    first: LineId,
    last: LineId,
    /// Bumped on every mutation; used to detect stale derived data
    revision: u64,
}

impl LineBuffer {
    /// Create a buffer holding a single empty line
    pub fn new() -> Self {
        Self::from_lines(std::iter::empty::<String>())
    }

    /// Create a buffer from pre-split lines (an empty iterator yields one empty line)
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::link(SlotMap::with_key(), lines)
    }

    /// Split `text` into lines on any line terminator ropey recognizes.
    /// A trailing terminator produces a final empty line.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(split_lines(text))
    }

    /// Replace the whole content, keeping the revision counter moving forward.
    /// Every existing [`LineId`] becomes detached.
    pub fn replace_all(&mut self, text: &str) {
        let revision = self.revision;
        let mut arena = std::mem::take(&mut self.lines);
        // clearing bumps slot versions, so old keys stop resolving
        arena.clear();
        *self = Self::link(arena, split_lines(text));
        self.revision = revision.wrapping_add(1);
    }

    fn link<I, S>(mut arena: SlotMap<LineId, Line>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut first = None;
        let mut last: Option<LineId> = None;

        for text in lines {
            let id = arena.insert(Line::new(text.into()));
            match last {
                Some(prev) => {
                    arena[prev].next = Some(id);
                    arena[id].prev = Some(prev);
                }
                None => first = Some(id),
            }
            last = Some(id);
        }

        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                let id = arena.insert(Line::new(String::new()));
                (id, id)
            }
        };

        Self {
            lines: arena,
            first,
            last,
            revision: 0,
        }
    }

    /// Number of lines (always >= 1)
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn first(&self) -> LineId {
        self.first
    }

    pub fn last(&self) -> LineId {
        self.last
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.line(id).next
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.line(id).prev
    }

    /// Whether `id` is still attached to this buffer
    pub fn contains(&self, id: LineId) -> bool {
        self.lines.contains_key(id)
    }

    /// Borrow a line.
    ///
    /// # Panics
    /// If the line has been removed. A cursor still pointing at a removed
    /// line is a bug in the editing core, not a recoverable condition.
    pub fn line(&self, id: LineId) -> &Line {
        match self.lines.get(id) {
            Some(line) => line,
            None => panic!("line {:?} is detached from the buffer", id),
        }
    }

    fn line_mut(&mut self, id: LineId) -> &mut Line {
        match self.lines.get_mut(id) {
            Some(line) => line,
            None => panic!("line {:?} is detached from the buffer", id),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Iterate lines in document order
    pub fn iter(&self) -> Lines<'_> {
        Lines {
            buffer: self,
            next: Some(self.first),
        }
    }

    /// Ordinal of a line (O(n) walk towards the first line)
    pub fn index_of(&self, id: LineId) -> usize {
        let mut index = 0;
        let mut current = self.line(id).prev;
        while let Some(prev) = current {
            index += 1;
            current = self.lines[prev].prev;
        }
        index
    }

    /// Line at ordinal `index` (O(n))
    pub fn nth(&self, index: usize) -> Option<LineId> {
        self.iter().nth(index).map(|(id, _)| id)
    }

    /// Ordinal lookup table, valid until the next structural change
    pub fn table(&self) -> LineTable {
        let mut ids = Vec::with_capacity(self.len());
        let mut ordinals = SecondaryMap::with_capacity(self.len());
        for (index, (id, _)) in self.iter().enumerate() {
            ids.push(id);
            ordinals.insert(id, index);
        }
        LineTable { ids, ordinals }
    }

    /// Full content, lines joined with `\n`
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.len_chars());
        for (i, (_, line)) in self.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.text());
        }
        out
    }

    /// Total length in characters, counting one separator between lines
    pub fn len_chars(&self) -> usize {
        self.iter().map(|(_, line)| line.len()).sum::<usize>() + self.len() - 1
    }

    // =========================================================================
    // Structural operations
    // =========================================================================

    /// Insert a new line after `id`, returning its identity
    pub fn insert_after(&mut self, id: LineId, text: impl Into<String>) -> LineId {
        let next = self.line(id).next;
        let mut line = Line::new(text.into());
        line.prev = Some(id);
        line.next = next;
        let new_id = self.lines.insert(line);

        self.lines[id].next = Some(new_id);
        match next {
            Some(next) => self.lines[next].prev = Some(new_id),
            None => self.last = new_id,
        }
        self.touch();
        new_id
    }

    /// Insert a new line before `id`, returning its identity
    pub fn insert_before(&mut self, id: LineId, text: impl Into<String>) -> LineId {
        let prev = self.line(id).prev;
        let mut line = Line::new(text.into());
        line.prev = prev;
        line.next = Some(id);
        let new_id = self.lines.insert(line);

        self.lines[id].prev = Some(new_id);
        match prev {
            Some(prev) => self.lines[prev].next = Some(new_id),
            None => self.first = new_id,
        }
        self.touch();
        new_id
    }

    /// Append a line at the end of the buffer
    pub fn push_back(&mut self, text: impl Into<String>) -> LineId {
        self.insert_after(self.last, text)
    }

    /// Remove a line, returning its text.
    ///
    /// Callers must repoint any cursor on `id` before calling this.
    pub fn remove(&mut self, id: LineId) -> Result<String, LineBufferError> {
        let line = self.line(id);
        let (prev, next) = (line.prev, line.next);
        if prev.is_none() && next.is_none() {
            return Err(LineBufferError::LastLine);
        }

        if let Some(prev) = prev {
            self.lines[prev].next = next;
        } else if let Some(next) = next {
            self.first = next;
        }
        if let Some(next) = next {
            self.lines[next].prev = prev;
        } else if let Some(prev) = prev {
            self.last = prev;
        }

        let removed = self.lines.remove(id).map(|line| line.text).unwrap_or_default();
        self.touch();
        Ok(removed)
    }

    /// Swap a line with its successor. Returns false at the last line.
    pub fn swap_with_next(&mut self, id: LineId) -> bool {
        let Some(other) = self.line(id).next else {
            return false;
        };
        let before = self.lines[id].prev;
        let after = self.lines[other].next;

        match before {
            Some(before) => self.lines[before].next = Some(other),
            None => self.first = other,
        }
        match after {
            Some(after) => self.lines[after].prev = Some(id),
            None => self.last = id,
        }

        self.lines[other].prev = before;
        self.lines[other].next = Some(id);
        self.lines[id].prev = Some(other);
        self.lines[id].next = after;
        self.touch();
        true
    }

    /// Swap a line with its predecessor. Returns false at the first line.
    pub fn swap_with_prev(&mut self, id: LineId) -> bool {
        match self.line(id).prev {
            Some(prev) => self.swap_with_next(prev),
            None => false,
        }
    }

    // =========================================================================
    // Text operations (column arguments are character indices)
    // =========================================================================

    /// Insert single-line text into a line at `column`
    pub fn insert_text(&mut self, id: LineId, column: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.line_mut(id).insert_str(column, text);
        self.touch();
    }

    /// Remove a column range from a line, returning the removed text
    pub fn remove_text(&mut self, id: LineId, range: Range<usize>) -> String {
        let removed = self.line_mut(id).remove_range(range);
        if !removed.is_empty() {
            self.touch();
        }
        removed
    }

    /// Split a line at `column`; the tail becomes a new line right after it
    pub fn split(&mut self, id: LineId, column: usize) -> LineId {
        let tail = self.line_mut(id).split_off(column);
        self.insert_after(id, tail)
    }

    /// Merge the successor into `id`. Returns the join column (the old
    /// length of `id`), or `None` when `id` is the last line.
    pub fn join_next(&mut self, id: LineId) -> Option<usize> {
        let next = self.line(id).next?;
        let column = self.lines[id].len;
        let tail = self.remove(next).ok()?;
        self.lines[id].push_str(&tail);
        self.touch();
        Some(column)
    }
}

fn split_lines(text: &str) -> Vec<String> {
    Rope::from_str(text)
        .lines()
        .map(|slice| {
            let line = slice.to_string();
            // "\r\n" counts as one terminator, so strip at most that pair
            match line.strip_suffix("\r\n") {
                Some(stripped) => stripped.to_string(),
                None => line.trim_end_matches(&LINE_BREAKS[..]).to_string(),
            }
        })
        .collect()
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over lines in document order
pub struct Lines<'a> {
    buffer: &'a LineBuffer,
    next: Option<LineId>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (LineId, &'a Line);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let line = &self.buffer.lines[id];
        self.next = line.next;
        Some((id, line))
    }
}

/// Snapshot of line ordinals for bulk position conversion
#[derive(Debug, Clone)]
pub struct LineTable {
    ids: Vec<LineId>,
    ordinals: SecondaryMap<LineId, usize>,
}

impl LineTable {
    pub fn id(&self, index: usize) -> Option<LineId> {
        self.ids.get(index).copied()
    }

    /// # Panics
    /// If `id` was not part of the buffer when the table was built.
    pub fn ordinal(&self, id: LineId) -> usize {
        match self.ordinals.get(id) {
            Some(&index) => index,
            None => panic!("line {:?} is not in the ordinal table", id),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
