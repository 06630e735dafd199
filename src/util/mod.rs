//! Utility modules

pub mod text;

pub use text::{char_type, is_inline_whitespace, is_punctuation, CharType, DEFAULT_INDENT_WIDTH};
