//! Multi-caret text editing engine
//!
//! This crate provides an in-memory source document with any number of
//! carets and selections, undoable edit batches, and pluggable tokenizer
//! and listener collaborators. Start with [`SourceCode`].

pub mod config;
pub mod config_paths;
pub mod debug_dump;
pub mod editable;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use config::EditorConfig;
pub use editable::{EditListener, EditMsg, MoveTarget, Position, SourceCode, Tokenizer};
