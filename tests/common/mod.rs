//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use multicaret::config::EditorConfig;
use multicaret::editable::{Position, SourceCode};

/// Create a document with a single caret at the given position
pub fn source_at(text: &str, line: usize, column: usize) -> SourceCode {
    let mut source = SourceCode::from_text(text);
    source.set_caret(Position::new(line, column));
    source
}

/// Create a document with one selection from `tail` to `head`
pub fn source_with_selection(
    text: &str,
    tail: (usize, usize),
    head: (usize, usize),
) -> SourceCode {
    let mut source = SourceCode::from_text(text);
    source.set_selection(pos(tail), pos(head));
    source
}

/// Create a document with a caret at each position; the last one is primary
pub fn source_with_carets(text: &str, carets: &[(usize, usize)]) -> SourceCode {
    let mut source = SourceCode::from_text(text);
    let (first, rest) = carets.split_first().expect("at least one caret");
    source.set_caret(pos(*first));
    for &caret in rest {
        source.add_caret(pos(caret));
    }
    source
}

/// Create a document with a non-default indent width
pub fn source_with_indent(text: &str, indent_width: usize) -> SourceCode {
    let config = EditorConfig {
        indent_width,
        ..EditorConfig::default()
    };
    SourceCode::with_config(text, config)
}

pub fn pos((line, column): (usize, usize)) -> Position {
    Position::new(line, column)
}

/// Caret heads as plain tuples, in document order
pub fn carets(source: &SourceCode) -> Vec<(usize, usize)> {
    source
        .caret_positions()
        .into_iter()
        .map(|p| (p.line, p.column))
        .collect()
}

pub fn lines_of(source: &SourceCode) -> Vec<String> {
    source.lines().map(str::to_string).collect()
}
