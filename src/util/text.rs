//! Utility functions for text editing

/// Default number of columns a single indent level occupies
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Characters ropey treats as line terminators
pub const LINE_BREAKS: [char; 7] = [
    '\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Check if a character terminates a line
#[inline]
pub fn is_line_break(ch: char) -> bool {
    LINE_BREAKS.contains(&ch)
}

/// Check if a character is a punctuation/symbol boundary (not whitespace)
pub fn is_punctuation(ch: char) -> bool {
    matches!(
        ch,
        '/' | ':'
            | ','
            | '.'
            | '-'
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | ';'
            | '"'
            | '\''
            | '<'
            | '>'
            | '='
            | '+'
            | '*'
            | '&'
            | '|'
            | '!'
            | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '~'
            | '`'
            | '\\'
            | '?'
    )
}

/// Character type for word navigation (IntelliJ-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Whitespace characters
    Whitespace,
    /// Alphanumeric characters (word characters)
    WordChar,
    /// Punctuation and symbols
    Punctuation,
}

/// Get the character type for word navigation
pub fn char_type(ch: char) -> CharType {
    if ch.is_whitespace() {
        CharType::Whitespace
    } else if is_punctuation(ch) {
        CharType::Punctuation
    } else {
        CharType::WordChar
    }
}

/// Whitespace that may live inside a line (line breaks never do)
#[inline]
pub fn is_inline_whitespace(ch: char) -> bool {
    ch.is_whitespace() && !is_line_break(ch)
}

/// Number of leading whitespace characters in `text`
pub fn leading_whitespace(text: &str) -> usize {
    text.chars().take_while(|c| is_inline_whitespace(*c)).count()
}

/// Convert a character column to a byte offset, clamped to the end of `text`
pub fn char_to_byte(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Smallest multiple of `width` strictly greater than `column`
pub fn next_indent_stop(column: usize, width: usize) -> usize {
    let width = width.max(1);
    (column / width + 1) * width
}

/// Largest multiple of `width` strictly less than `column` (0 at column 0)
pub fn prev_indent_stop(column: usize, width: usize) -> usize {
    let width = width.max(1);
    if column == 0 {
        0
    } else {
        (column - 1) / width * width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_type() {
        assert_eq!(char_type('a'), CharType::WordChar);
        assert_eq!(char_type('_'), CharType::WordChar);
        assert_eq!(char_type(' '), CharType::Whitespace);
        assert_eq!(char_type('{'), CharType::Punctuation);
    }

    #[test]
    fn test_line_breaks_are_not_inline_whitespace() {
        for ch in LINE_BREAKS {
            assert!(is_line_break(ch));
            assert!(!is_inline_whitespace(ch));
        }
        assert!(is_inline_whitespace('\t'));
        assert!(!is_line_break(' '));
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("    foo"), 4);
        assert_eq!(leading_whitespace("\t foo"), 2);
        assert_eq!(leading_whitespace("foo"), 0);
        assert_eq!(leading_whitespace("   "), 3);
    }

    #[test]
    fn test_char_to_byte_multibyte() {
        assert_eq!(char_to_byte("héllo", 2), 3);
        assert_eq!(char_to_byte("héllo", 99), 6);
    }

    #[test]
    fn test_indent_stops() {
        assert_eq!(next_indent_stop(0, 4), 4);
        assert_eq!(next_indent_stop(3, 4), 4);
        assert_eq!(next_indent_stop(4, 4), 8);
        assert_eq!(prev_indent_stop(0, 4), 0);
        assert_eq!(prev_indent_stop(2, 4), 0);
        assert_eq!(prev_indent_stop(4, 4), 0);
        assert_eq!(prev_indent_stop(6, 4), 4);
        assert_eq!(prev_indent_stop(8, 4), 4);
    }
}
