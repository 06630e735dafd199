//! Edit context threaded through every mutating selection-range call.

use super::buffer::LineBuffer;
use super::tokenizer::TokenCache;
use crate::config::EditorConfig;

/// Mutable access to the document plus the settings an edit needs.
///
/// Built fresh for each command by the owner of the buffer.
pub struct EditContext<'a> {
    pub buffer: &'a mut LineBuffer,
    pub tokens: &'a mut TokenCache,
    /// Columns per indent level (>= 1)
    pub indent_width: usize,
    /// Copy leading whitespace (and indent after `{`) on line break
    pub auto_indent: bool,
}

impl<'a> EditContext<'a> {
    pub fn new(buffer: &'a mut LineBuffer, tokens: &'a mut TokenCache, config: &EditorConfig) -> Self {
        Self {
            buffer,
            tokens,
            indent_width: config.indent_width.max(1),
            auto_indent: config.auto_indent,
        }
    }
}
