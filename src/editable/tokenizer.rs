//! Tokenizer collaborator contract and the offset index used to query it.
//!
//! The core never understands the text it edits. Word-aware movement and
//! deletion only need span boundaries, which a [`Tokenizer`] produces from
//! the full document text as document-wide character offsets.

use std::fmt;

use super::buffer::LineBuffer;
use super::cursor::Position;
use crate::util::text::{char_type, CharType};

/// Half-open span of character offsets `[start, end)` into the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Produces ordered, non-overlapping token spans for the given text.
///
/// Offsets count characters, with one character per line separator.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan>;
}

/// Default tokenizer: runs of word characters and runs of punctuation,
/// whitespace separates tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        let mut spans = Vec::new();
        let mut current: Option<(usize, CharType)> = None;

        for (offset, ch) in text.chars().enumerate() {
            let kind = char_type(ch);
            match current {
                Some((_, run)) if run == kind => {}
                Some((start, _)) => {
                    spans.push(TokenSpan::new(start, offset));
                    current = None;
                }
                None => {}
            }
            if current.is_none() && kind != CharType::Whitespace {
                current = Some((offset, kind));
            }
        }
        if let Some((start, _)) = current {
            spans.push(TokenSpan::new(start, text.chars().count()));
        }
        spans
    }
}

/// Prefix sums of line lengths for (line, column) <-> offset conversion
#[derive(Debug, Clone, Default)]
pub struct OffsetIndex {
    /// Offset of the first character of each line
    starts: Vec<usize>,
    lens: Vec<usize>,
}

impl OffsetIndex {
    pub fn build(buffer: &LineBuffer) -> Self {
        let mut starts = Vec::with_capacity(buffer.len());
        let mut lens = Vec::with_capacity(buffer.len());
        let mut offset = 0;
        for (_, line) in buffer.iter() {
            starts.push(offset);
            lens.push(line.len());
            offset += line.len() + 1;
        }
        Self { starts, lens }
    }

    /// Total characters including separators
    pub fn len_chars(&self) -> usize {
        match (self.starts.last(), self.lens.last()) {
            (Some(start), Some(len)) => start + len,
            _ => 0,
        }
    }

    /// `None` if the line or column is out of range
    pub fn position_to_offset(&self, pos: Position) -> Option<usize> {
        let len = *self.lens.get(pos.line)?;
        (pos.column <= len).then(|| self.starts[pos.line] + pos.column)
    }

    /// `None` past the end of the document. The separator offset of a line
    /// maps to that line's end column.
    pub fn offset_to_position(&self, offset: usize) -> Option<Position> {
        if self.starts.is_empty() || offset > self.len_chars() {
            return None;
        }
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        Some(Position::new(line, offset - self.starts[line]))
    }
}

/// Tokenizer output captured against one buffer revision
#[derive(Debug, Clone)]
pub struct TokenSnapshot {
    revision: u64,
    spans: Vec<TokenSpan>,
    index: OffsetIndex,
    /// Sorted, deduplicated span starts and ends
    boundaries: Vec<usize>,
}

impl TokenSnapshot {
    pub fn capture(tokenizer: &dyn Tokenizer, buffer: &LineBuffer) -> Self {
        let spans = tokenizer.tokenize(&buffer.text());
        let mut boundaries: Vec<usize> = spans
            .iter()
            .flat_map(|span| [span.start, span.end])
            .collect();
        boundaries.sort_unstable();
        boundaries.dedup();

        Self {
            revision: buffer.revision(),
            spans,
            index: OffsetIndex::build(buffer),
            boundaries,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn spans(&self) -> &[TokenSpan] {
        &self.spans
    }

    pub fn index(&self) -> &OffsetIndex {
        &self.index
    }

    /// First span boundary strictly after `pos`
    pub fn next_boundary(&self, pos: Position) -> Option<Position> {
        let offset = self.index.position_to_offset(pos)?;
        let i = self.boundaries.partition_point(|&b| b <= offset);
        let boundary = *self.boundaries.get(i)?;
        self.index.offset_to_position(boundary)
    }

    /// Last span boundary strictly before `pos`
    pub fn prev_boundary(&self, pos: Position) -> Option<Position> {
        let offset = self.index.position_to_offset(pos)?;
        let i = self.boundaries.partition_point(|&b| b < offset);
        let boundary = *self.boundaries.get(i.checked_sub(1)?)?;
        self.index.offset_to_position(boundary)
    }

    /// Span containing `pos`, or the span ending exactly at `pos`
    pub fn span_at(&self, pos: Position) -> Option<(Position, Position)> {
        let offset = self.index.position_to_offset(pos)?;
        let i = self.spans.partition_point(|span| span.end < offset);
        let span = self.spans.get(i)?;
        if span.start > offset {
            return None;
        }
        Some((
            self.index.offset_to_position(span.start)?,
            self.index.offset_to_position(span.end)?,
        ))
    }
}

/// Caches the last snapshot and recaptures whenever the buffer revision
/// moved on, so word queries never see stale spans.
pub struct TokenCache {
    tokenizer: Box<dyn Tokenizer>,
    snapshot: Option<TokenSnapshot>,
}

impl TokenCache {
    pub fn new(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            snapshot: None,
        }
    }

    pub fn snapshot(&mut self, buffer: &LineBuffer) -> &TokenSnapshot {
        let stale = self
            .snapshot
            .as_ref()
            .map_or(true, |snapshot| snapshot.revision != buffer.revision());
        if stale {
            tracing::trace!(revision = buffer.revision(), "Re-tokenizing buffer");
            self.snapshot = None;
        }
        self.snapshot
            .get_or_insert_with(|| TokenSnapshot::capture(self.tokenizer.as_ref(), buffer))
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(Box::new(WordTokenizer))
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("revision", &self.snapshot.as_ref().map(|s| s.revision))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokenizer_splits_by_char_type() {
        let spans = WordTokenizer.tokenize("let x=foo(1);");
        assert_eq!(
            spans,
            vec![
                TokenSpan::new(0, 3),
                TokenSpan::new(4, 5),
                TokenSpan::new(5, 6),
                TokenSpan::new(6, 9),
                TokenSpan::new(9, 10),
                TokenSpan::new(10, 11),
                TokenSpan::new(11, 13),
            ]
        );
    }

    #[test]
    fn test_word_tokenizer_breaks_at_newlines() {
        let spans = WordTokenizer.tokenize("ab\ncd");
        assert_eq!(spans, vec![TokenSpan::new(0, 2), TokenSpan::new(3, 5)]);
    }

    #[test]
    fn test_offset_index_conversions() {
        let buffer = LineBuffer::from_text("abc\n\nde");
        let index = OffsetIndex::build(&buffer);
        assert_eq!(index.len_chars(), 7);
        assert_eq!(index.position_to_offset(Position::new(2, 1)), Some(6));
        assert_eq!(index.position_to_offset(Position::new(0, 4)), None);
        assert_eq!(index.position_to_offset(Position::new(3, 0)), None);
        assert_eq!(index.offset_to_position(3), Some(Position::new(0, 3)));
        assert_eq!(index.offset_to_position(4), Some(Position::new(1, 0)));
        assert_eq!(index.offset_to_position(7), Some(Position::new(2, 2)));
        assert_eq!(index.offset_to_position(8), None);
    }

    #[test]
    fn test_span_at_includes_span_end() {
        let buffer = LineBuffer::from_text("foo bar");
        let tokens = TokenSnapshot::capture(&WordTokenizer, &buffer);
        let word = Some((Position::new(0, 4), Position::new(0, 7)));
        assert_eq!(tokens.span_at(Position::new(0, 5)), word);
        assert_eq!(tokens.span_at(Position::new(0, 7)), word);
        assert_eq!(tokens.span_at(Position::new(0, 3)), Some((Position::new(0, 0), Position::new(0, 3))));
    }

    #[test]
    fn test_cache_recaptures_after_edit() {
        let mut buffer = LineBuffer::from_text("foo");
        let mut cache = TokenCache::default();
        assert_eq!(cache.snapshot(&buffer).spans().len(), 1);

        let id = buffer.first();
        buffer.insert_text(id, 3, " bar");
        let snapshot = cache.snapshot(&buffer);
        assert_eq!(snapshot.revision(), buffer.revision());
        assert_eq!(snapshot.spans().len(), 2);
    }
}
