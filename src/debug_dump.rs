//! State dump for diagnosing caret and history issues
//!
//! Serializes a document's text, carets, and undo/redo stacks to JSON.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::editable::{RangeSnapshot, SourceCode};

#[derive(Debug, Serialize)]
pub struct StateDump {
    pub timestamp: String,
    pub revision: u64,
    pub is_modified: bool,
    pub line_count: usize,
    pub char_count: usize,
    pub lines: Vec<String>,
    pub carets: Vec<RangeSnapshot>,
    pub primary: usize,
    pub distinct_caret_lines: usize,
    pub undo_stack_size: usize,
    pub redo_stack_size: usize,
    pub undo_name: Option<String>,
    pub redo_name: Option<String>,
}

impl StateDump {
    pub fn from_source(source: &SourceCode) -> Self {
        let state = source.caret_state();
        let history = source.history();
        Self {
            timestamp: utc_timestamp(),
            revision: source.revision(),
            is_modified: source.is_modified(),
            line_count: source.line_count(),
            char_count: source.buffer().len_chars(),
            lines: source.lines().map(str::to_string).collect(),
            carets: state.ranges,
            primary: state.primary,
            distinct_caret_lines: source.ranges().distinct_line_count(),
            undo_stack_size: history.undo_count(),
            redo_stack_size: history.redo_count(),
            undo_name: history.undo_name().map(str::to_string),
            redo_name: history.redo_name().map(str::to_string),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize state dump")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write state dump to {}", path.display()))
    }

    /// Write into the dumps directory, returning the file path
    pub fn save(&self) -> Result<PathBuf> {
        let dir = crate::config_paths::ensure_dumps_dir()?;
        let path = dir.join(format!("{}-state-dump.json", self.timestamp));
        self.write_to(&path)?;
        tracing::info!("Wrote state dump to {}", path.display());
        Ok(path)
    }
}

/// `YYYY-MM-DD-HHMMSS` in UTC
fn utc_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

fn format_timestamp(secs: u64) -> String {
    let (year, month, day) = civil_date(secs / 86_400);
    let rest = secs % 86_400;
    format!(
        "{:04}-{:02}-{:02}-{:02}{:02}{:02}",
        year,
        month,
        day,
        rest / 3600,
        rest % 3600 / 60,
        rest % 60
    )
}

/// Gregorian date for a day count since 1970-01-01
fn civil_date(days: u64) -> (u64, u64, u64) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::Position;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01-000000");
        // 2000-02-29 12:34:56
        assert_eq!(format_timestamp(951_827_696), "2000-02-29-123456");
    }

    #[test]
    fn test_dump_reflects_source() {
        let mut source = SourceCode::from_text("one\ntwo");
        source.set_caret(Position::new(1, 3));
        source.insert_char('!');

        let dump = StateDump::from_source(&source);
        assert_eq!(dump.lines, vec!["one", "two!"]);
        assert_eq!(dump.line_count, 2);
        assert_eq!(dump.char_count, 8);
        assert_eq!(dump.carets.len(), 1);
        assert_eq!(dump.carets[0].head, Position::new(1, 4));
        assert_eq!(dump.undo_stack_size, 1);
        assert_eq!(dump.undo_name.as_deref(), Some("Typing"));
        assert!(dump.is_modified);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        let dump = StateDump::from_source(&SourceCode::from_text("abc"));
        dump.write_to(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["lines"][0], "abc");
        assert_eq!(json["carets"][0]["head"]["column"], 0);
    }
}
