//! Text editing tests with a single caret
//!
//! Tests for typing, line breaks, deletion, paste, and line operations.

mod common;

use common::{carets, lines_of, source_at, source_with_selection};
use multicaret::config::EditorConfig;
use multicaret::editable::{EditMsg, Position, SourceCode};

// ========================================================================
// Typing
// ========================================================================

#[test]
fn test_insert_char_at_end_of_line() {
    let mut source = source_at("Hello", 0, 5);

    assert!(source.update(EditMsg::InsertChar('!')));

    assert_eq!(source.text(), "Hello!");
    assert_eq!(source.primary_caret(), Position::new(0, 6));
}

#[test]
fn test_insert_char_replaces_selection() {
    let mut source = source_with_selection("Hello", (0, 0), (0, 5));

    source.update(EditMsg::InsertChar('J'));

    assert_eq!(source.text(), "J");
    assert_eq!(carets(&source), vec![(0, 1)]);
    assert!(!source.has_selection());
}

#[test]
fn test_tab_inserts_spaces_to_next_stop() {
    let mut source = source_at("ab", 0, 1);

    source.update(EditMsg::InsertChar('\t'));

    assert_eq!(source.text(), "a   b");
    assert_eq!(carets(&source), vec![(0, 4)]);
}

#[test]
fn test_carriage_return_is_ignored() {
    let mut source = source_at("ab", 0, 1);

    assert!(!source.update(EditMsg::InsertChar('\r')));
    assert_eq!(source.text(), "ab");
    assert!(!source.can_undo());
}

// ========================================================================
// Line breaks
// ========================================================================

#[test]
fn test_newline_splits_line() {
    let mut source = source_at("hello world", 0, 5);

    source.update(EditMsg::InsertNewline);

    assert_eq!(lines_of(&source), vec!["hello", " world"]);
    assert_eq!(carets(&source), vec![(1, 0)]);
}

#[test]
fn test_newline_after_open_brace_adds_indent() {
    let mut source = source_at("if (x) {\n", 0, 8);

    source.update(EditMsg::InsertNewline);

    assert_eq!(lines_of(&source), vec!["if (x) {", "    ", ""]);
    assert_eq!(carets(&source), vec![(1, 4)]);
}

#[test]
fn test_newline_keeps_leading_whitespace() {
    let mut source = source_at("    foo", 0, 7);

    source.update(EditMsg::InsertNewline);

    assert_eq!(lines_of(&source), vec!["    foo", "    "]);
    assert_eq!(carets(&source), vec![(1, 4)]);
}

#[test]
fn test_newline_without_auto_indent() {
    let config = EditorConfig {
        auto_indent: false,
        ..EditorConfig::default()
    };
    let mut source = SourceCode::with_config("    foo {", config);
    source.set_caret(Position::new(0, 9));

    source.update(EditMsg::InsertNewline);

    assert_eq!(lines_of(&source), vec!["    foo {", ""]);
    assert_eq!(carets(&source), vec![(1, 0)]);
}

// ========================================================================
// Deletion
// ========================================================================

#[test]
fn test_backspace_joins_lines() {
    let mut source = source_at("ab\ncd", 1, 0);

    source.update(EditMsg::DeleteBackward);

    assert_eq!(source.text(), "abcd");
    assert_eq!(carets(&source), vec![(0, 2)]);
}

#[test]
fn test_backspace_at_document_start_does_nothing() {
    let mut source = source_at("abc", 0, 0);

    assert!(!source.update(EditMsg::DeleteBackward));
    assert_eq!(source.text(), "abc");
    assert!(!source.is_modified());
}

#[test]
fn test_delete_at_line_end_pulls_next_line_up() {
    let mut source = source_at("ab\ncd", 0, 2);

    source.update(EditMsg::DeleteForward);

    assert_eq!(source.text(), "abcd");
    assert_eq!(carets(&source), vec![(0, 2)]);
}

#[test]
fn test_delete_at_document_end_does_nothing() {
    let mut source = source_at("ab\ncd", 1, 2);

    assert!(!source.update(EditMsg::DeleteForward));
    assert_eq!(source.text(), "ab\ncd");
}

#[test]
fn test_delete_selection() {
    let mut source = source_with_selection("Hello", (0, 0), (0, 3));

    source.update(EditMsg::DeleteForward);

    assert_eq!(source.text(), "lo");
    assert_eq!(carets(&source), vec![(0, 0)]);
    assert!(!source.has_selection());
    assert_eq!(source.history().undo_count(), 1);
}

#[test]
fn test_delete_selection_across_lines() {
    let mut source = source_with_selection("one\ntwo\nthree", (0, 1), (2, 2));

    source.update(EditMsg::DeleteBackward);

    assert_eq!(source.text(), "oree");
    assert_eq!(carets(&source), vec![(0, 1)]);
}

#[test]
fn test_delete_word_backward() {
    let mut source = source_at("foo bar", 0, 7);

    source.update(EditMsg::DeleteWordBackward);

    assert_eq!(source.text(), "foo ");
    assert_eq!(carets(&source), vec![(0, 4)]);
}

#[test]
fn test_delete_word_forward() {
    let mut source = source_at("foo bar", 0, 0);

    source.update(EditMsg::DeleteWordForward);

    assert_eq!(source.text(), " bar");
    assert_eq!(carets(&source), vec![(0, 0)]);
}

#[test]
fn test_delete_word_backward_sees_fresh_text() {
    let mut source = source_at("foo", 0, 3);
    source.update(EditMsg::InsertText(" barbaz".to_string()));

    source.update(EditMsg::DeleteWordBackward);

    assert_eq!(source.text(), "foo ");
}

// ========================================================================
// Paste
// ========================================================================

#[test]
fn test_paste_multiline_text() {
    let mut source = source_at("", 0, 0);

    source.update(EditMsg::InsertText("one\ntwo".to_string()));

    assert_eq!(lines_of(&source), vec!["one", "two"]);
    assert_eq!(carets(&source), vec![(1, 3)]);
    assert_eq!(source.undo_name(), Some("Paste"));
}

#[test]
fn test_paste_normalizes_crlf() {
    let mut source = source_at("", 0, 0);

    source.insert_text("a\r\nb");

    assert_eq!(lines_of(&source), vec!["a", "b"]);
}

#[test]
fn test_other_line_terminators_split_lines() {
    let mut source = source_at("", 0, 0);

    source.insert_text("a\u{2028}b\u{0B}c");
    source.update(EditMsg::InsertChar('\u{2029}'));

    assert_eq!(lines_of(&source), vec!["a", "b", "c", ""]);
    assert_eq!(source.undo_name(), Some("New Line"));

    let reloaded = SourceCode::from_text(&source.text());
    assert_eq!(lines_of(&reloaded), lines_of(&source));
}

// ========================================================================
// Line operations
// ========================================================================

#[test]
fn test_delete_line_in_middle() {
    let mut source = source_at("one\ntwo\nthree", 1, 1);

    source.update(EditMsg::DeleteLine);

    assert_eq!(lines_of(&source), vec!["one", "three"]);
    assert_eq!(carets(&source), vec![(1, 0)]);
}

#[test]
fn test_delete_last_line_removes_preceding_break() {
    let mut source = source_at("one\ntwo", 1, 1);

    source.update(EditMsg::DeleteLine);

    assert_eq!(lines_of(&source), vec!["one"]);
    assert_eq!(carets(&source), vec![(0, 3)]);
}

#[test]
fn test_delete_only_line_leaves_empty_document() {
    let mut source = source_at("abc", 0, 1);

    source.update(EditMsg::DeleteLine);

    assert_eq!(source.text(), "");
    assert_eq!(source.line_count(), 1);
}

#[test]
fn test_duplicate_line() {
    let mut source = source_at("abc\nxyz", 0, 1);

    source.update(EditMsg::Duplicate);

    assert_eq!(lines_of(&source), vec!["abc", "abc", "xyz"]);
    assert_eq!(carets(&source), vec![(1, 1)]);
}

#[test]
fn test_duplicate_selection_selects_copy() {
    let mut source = source_with_selection("abc", (0, 0), (0, 2));

    source.update(EditMsg::Duplicate);

    assert_eq!(source.text(), "ababc");
    assert_eq!(source.selected_text(), "ab");
    assert_eq!(carets(&source), vec![(0, 4)]);
}

#[test]
fn test_move_line_up_and_down() {
    let mut source = source_at("a\nb\nc", 2, 0);

    source.update(EditMsg::MoveLineUp);
    assert_eq!(lines_of(&source), vec!["a", "c", "b"]);
    assert_eq!(carets(&source), vec![(1, 0)]);

    source.update(EditMsg::MoveLineDown);
    assert_eq!(lines_of(&source), vec!["a", "b", "c"]);
    assert_eq!(carets(&source), vec![(2, 0)]);
}

#[test]
fn test_move_line_up_at_top_does_nothing() {
    let mut source = source_at("a\nb", 0, 0);

    assert!(!source.update(EditMsg::MoveLineUp));
    assert_eq!(source.text(), "a\nb");
    assert!(!source.can_undo());
}

#[test]
fn test_move_selected_lines_down() {
    let mut source = source_with_selection("a\nb\nc", (0, 0), (1, 1));

    source.update(EditMsg::MoveLineDown);

    assert_eq!(lines_of(&source), vec!["c", "a", "b"]);
    assert_eq!(source.selected_text(), "a\nb");
}

// ========================================================================
// Case and clipboard
// ========================================================================

#[test]
fn test_to_upper_case_keeps_selection() {
    let mut source = source_with_selection("hello world", (0, 0), (0, 5));

    source.update(EditMsg::ToUpperCase);

    assert_eq!(source.text(), "HELLO world");
    assert_eq!(source.selected_text(), "HELLO");

    source.update(EditMsg::ToLowerCase);
    assert_eq!(source.text(), "hello world");
}

#[test]
fn test_case_change_without_selection_does_nothing() {
    let mut source = source_at("hello", 0, 2);

    assert!(!source.update(EditMsg::ToUpperCase));
    assert!(!source.can_undo());
}

#[test]
fn test_cut_returns_selected_text() {
    let mut source = source_with_selection("Hello world", (0, 0), (0, 6));

    let cut = source.cut();

    assert_eq!(cut, "Hello ");
    assert_eq!(source.text(), "world");
    assert_eq!(source.undo_name(), Some("Cut"));
}

#[test]
fn test_cut_without_selection_does_nothing() {
    let mut source = source_at("Hello", 0, 2);

    assert_eq!(source.cut(), "");
    assert_eq!(source.text(), "Hello");
    assert!(!source.can_undo());
}
