//! Undo/redo tests
//!
//! Every command must undo to the exact text and caret state it started
//! from, and redo to the exact state it produced.

mod common;

use common::{carets, lines_of, source_at, source_with_carets, source_with_selection};
use multicaret::editable::{EditMsg, SourceCode};

/// Run `msg`, then check undo and redo restore both sides exactly
fn assert_round_trip(mut source: SourceCode, msg: EditMsg) {
    let label = format!("{:?}", msg);
    let text_before = source.text();
    let state_before = source.caret_state();

    assert!(source.update(msg), "{} should change the document", label);
    let text_after = source.text();
    let state_after = source.caret_state();

    assert!(source.undo(), "{}: undo", label);
    assert_eq!(source.text(), text_before, "{}: text after undo", label);
    assert_eq!(source.caret_state(), state_before, "{}: carets after undo", label);

    assert!(source.redo(), "{}: redo", label);
    assert_eq!(source.text(), text_after, "{}: text after redo", label);
    assert_eq!(source.caret_state(), state_after, "{}: carets after redo", label);
}

#[test]
fn test_undo_typing() {
    let mut source = source_at("Hello", 0, 5);
    source.update(EditMsg::InsertChar('!'));

    assert!(source.update(EditMsg::Undo));

    assert_eq!(source.text(), "Hello");
    assert_eq!(carets(&source), vec![(0, 5)]);
}

#[test]
fn test_undo_restores_selection() {
    let mut source = source_with_selection("Hello", (0, 0), (0, 3));
    let before = source.caret_state();
    source.update(EditMsg::DeleteForward);
    assert_eq!(source.text(), "lo");

    source.update(EditMsg::Undo);

    assert_eq!(source.text(), "Hello");
    assert_eq!(source.caret_state(), before);
    assert_eq!(source.selected_text(), "Hel");
}

#[test]
fn test_round_trip_single_caret_commands() {
    let cases = vec![
        (source_at("Hello", 0, 5), EditMsg::InsertChar('!')),
        (source_at("if (x) {", 0, 8), EditMsg::InsertNewline),
        (source_at("ab\ncd", 1, 0), EditMsg::DeleteBackward),
        (source_at("ab\ncd", 0, 2), EditMsg::DeleteForward),
        (source_at("foo bar", 0, 7), EditMsg::DeleteWordBackward),
        (source_at("foo bar", 0, 0), EditMsg::DeleteWordForward),
        (
            source_at("x", 0, 1),
            EditMsg::InsertText("one\n\ttwo".to_string()),
        ),
        (source_at("abc\nxyz", 0, 1), EditMsg::Duplicate),
        (source_at("one\ntwo\nthree", 1, 1), EditMsg::DeleteLine),
        (source_at("one\ntwo", 1, 2), EditMsg::DeleteLine),
        (source_at("a\nb\nc", 2, 0), EditMsg::MoveLineUp),
        (source_at("a\nb\nc", 0, 0), EditMsg::MoveLineDown),
        (source_at("  foo", 0, 2), EditMsg::Unindent),
        (
            source_with_selection("hello world", (0, 0), (0, 5)),
            EditMsg::ToUpperCase,
        ),
        (
            source_with_selection("one\ntwo\nthree", (2, 2), (0, 1)),
            EditMsg::DeleteBackward,
        ),
        (
            source_with_selection("one\ntwo", (0, 1), (1, 1)),
            EditMsg::Indent,
        ),
        (
            source_with_selection("abc", (0, 0), (0, 2)),
            EditMsg::Cut,
        ),
    ];

    for (source, msg) in cases {
        assert_round_trip(source, msg);
    }
}

#[test]
fn test_round_trip_multi_caret_commands() {
    let cases = vec![
        (
            source_with_carets("ab", &[(0, 1), (0, 2)]),
            EditMsg::InsertChar('X'),
        ),
        (
            source_with_carets("ab\ncd\nef", &[(1, 0), (2, 1)]),
            EditMsg::DeleteBackward,
        ),
        (
            source_with_carets("ab\ncd", &[(0, 1), (1, 1)]),
            EditMsg::InsertNewline,
        ),
        (
            source_with_carets("a\nb\nc", &[(0, 1), (1, 1), (2, 1)]),
            EditMsg::InsertText("1\n2\n3".to_string()),
        ),
        (
            source_with_carets("        x", &[(0, 8), (0, 9)]),
            EditMsg::Unindent,
        ),
        (
            source_with_carets("a\nb\nc", &[(0, 0), (0, 1)]),
            EditMsg::MoveLineDown,
        ),
        (
            source_with_carets("a\nb\nc\nd", &[(0, 1), (2, 0)]),
            EditMsg::DeleteLine,
        ),
    ];

    for (source, msg) in cases {
        assert_round_trip(source, msg);
    }
}

#[test]
fn test_undo_delete_line_restores_caret_not_line_selection() {
    let mut source = source_at("one\ntwo\nthree", 1, 1);
    source.update(EditMsg::DeleteLine);

    source.update(EditMsg::Undo);

    assert_eq!(lines_of(&source), vec!["one", "two", "three"]);
    assert_eq!(carets(&source), vec![(1, 1)]);
    assert!(!source.has_selection());
}

#[test]
fn test_undo_all_then_redo_all() {
    let mut source = source_at("", 0, 0);
    for ch in "fn main() {".chars() {
        source.update(EditMsg::InsertChar(ch));
    }
    source.update(EditMsg::InsertNewline);
    source.update(EditMsg::InsertText("body();".to_string()));
    let final_text = source.text();
    let final_carets = carets(&source);
    assert_eq!(lines_of(&source), vec!["fn main() {", "    body();"]);

    while source.undo() {}
    assert_eq!(source.text(), "");
    assert_eq!(carets(&source), vec![(0, 0)]);

    while source.redo() {}
    assert_eq!(source.text(), final_text);
    assert_eq!(carets(&source), final_carets);
}

#[test]
fn test_new_edit_clears_redo() {
    let mut source = source_at("", 0, 0);
    source.update(EditMsg::InsertChar('a'));
    source.update(EditMsg::InsertChar('b'));
    source.update(EditMsg::Undo);
    assert!(source.can_redo());

    source.update(EditMsg::InsertChar('c'));

    assert!(!source.can_redo());
    assert_eq!(source.text(), "ac");
}

#[test]
fn test_undo_redo_on_empty_history() {
    let mut source = SourceCode::from_text("abc");

    assert!(!source.update(EditMsg::Undo));
    assert!(!source.update(EditMsg::Redo));
    assert_eq!(source.text(), "abc");
}

#[test]
fn test_undo_names() {
    let mut source = source_at("abc", 0, 3);
    source.update(EditMsg::DeleteBackward);
    source.update(EditMsg::InsertText("z".to_string()));

    assert_eq!(source.undo_name(), Some("Paste"));
    source.update(EditMsg::Undo);
    assert_eq!(source.undo_name(), Some("Backspace"));
    assert_eq!(source.redo_name(), Some("Paste"));
}

#[test]
fn test_movement_is_not_recorded() {
    let mut source = source_at("abc\ndef", 0, 0);
    source.update(EditMsg::Move(multicaret::MoveTarget::Down));
    source.update(EditMsg::SelectAll);

    assert!(!source.can_undo());
    assert!(!source.is_modified());
}

#[test]
fn test_clear_history() {
    let mut source = source_at("", 0, 0);
    source.update(EditMsg::InsertChar('a'));

    source.clear_history();

    assert!(!source.can_undo());
    assert_eq!(source.text(), "a");
}
