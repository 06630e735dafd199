//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! multi-caret, selection, and history issues.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=multicaret::editable=trace` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/multicaret/logs/multicaret.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_NAME;
use crate::editable::SourceCode;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes to
/// `~/.config/multicaret/logs/multicaret.log` with daily rotation.
///
/// Does nothing if a global subscriber is already installed.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: tracing already initialized: {}", e);
    }
}

/// Lightweight snapshot of caret/selection state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub caret_count: usize,
    pub primary_idx: usize,
    pub carets: Vec<CaretInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretInfo {
    pub line: usize,
    pub column: usize,
    pub tail: Option<(usize, usize)>,
}

impl CaretInfo {
    pub fn has_selection(&self) -> bool {
        self.tail.is_some()
    }
}

impl CursorSnapshot {
    pub fn from_source(source: &SourceCode) -> Self {
        let state = source.caret_state();
        Self {
            caret_count: state.ranges.len(),
            primary_idx: state.primary,
            carets: state
                .ranges
                .iter()
                .map(|range| CaretInfo {
                    line: range.head.line,
                    column: range.head.column,
                    tail: range.tail.map(|tail| (tail.line, tail.column)),
                })
                .collect(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &CursorSnapshot) -> Option<String> {
        if self.caret_count != other.caret_count {
            return Some(format!(
                "caret count: {} → {}",
                self.caret_count, other.caret_count
            ));
        }

        let mut changes = Vec::new();
        for (i, (before, after)) in self.carets.iter().zip(&other.carets).enumerate() {
            if before.line != after.line || before.column != after.column {
                changes.push(format!(
                    "#{}: ({},{}) → ({},{})",
                    i, before.line, before.column, after.line, after.column
                ));
            }
            if before.has_selection() != after.has_selection() {
                let status = if after.has_selection() {
                    "active"
                } else {
                    "cleared"
                };
                changes.push(format!("#{}: selection {}", i, status));
            }
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
