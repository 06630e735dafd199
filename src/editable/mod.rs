//! Multi-caret text editing core.
//!
//! # Architecture
//!
//! - [`LineBuffer`]: document lines in an arena, linked in order; lines keep a
//!   stable [`LineId`] for their whole lifetime
//! - [`Cursor`]: a caret pinned to a line id and column
//! - [`SelectionRange`]: a head cursor plus an optional anchoring tail
//! - [`SelectionRangeCollection`]: every caret, kept sorted and non-overlapping
//! - [`HistoryManager`]: undo/redo of [`EditBatch`]es, one per command
//! - [`Tokenizer`] / [`EditListener`]: collaborators supplied by the host
//! - [`SourceCode`]: the facade tying these together behind [`EditMsg`]
//!
//! # Example
//!
//! ```
//! use multicaret::editable::{EditMsg, Position, SourceCode};
//!
//! let mut source = SourceCode::from_text("ab\nab");
//! source.set_caret(Position::new(0, 1));
//! source.add_caret(Position::new(1, 1));
//! source.update(EditMsg::InsertChar('x'));
//!
//! assert_eq!(source.text(), "axb\naxb");
//! source.update(EditMsg::Undo);
//! assert_eq!(source.text(), "ab\nab");
//! ```

mod buffer;
mod context;
mod cursor;
mod history;
mod listener;
mod messages;
mod ranges;
mod selection;
mod source_code;
mod tokenizer;

pub use buffer::{Line, LineBuffer, LineBufferError, LineId, LineTable, Lines};
pub use context::EditContext;
pub use cursor::{Cursor, Position, Removed};
pub use history::{
    transform_position, CaretState, Change, EditAction, EditBatch, HistoryManager, RangeEdit,
    RangeSnapshot,
};
pub use listener::EditListener;
pub use messages::{EditMsg, MoveTarget};
pub use ranges::{EditOrder, SelectionRangeCollection};
pub use selection::SelectionRange;
pub use source_code::SourceCode;
pub use tokenizer::{OffsetIndex, TokenCache, TokenSnapshot, TokenSpan, Tokenizer, WordTokenizer};
