//! Centralized configuration paths for multicaret
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/multicaret/`
//! - Windows: `%APPDATA%\multicaret\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

const APP_DIR: &str = "multicaret";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_NAME: &str = "multicaret.log";

/// Base config directory for multicaret
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/multicaret`
///   - Else: `~/.config/multicaret`
///
/// Windows:
///   - `%APPDATA%\multicaret`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/multicaret/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/multicaret/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// `~/.config/multicaret/dumps/`
pub fn dumps_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("dumps"))
}

/// Returns the most recent log file in `~/.config/multicaret/logs/`
/// (e.g., `multicaret.log.2026-01-07`)
///
/// Logging uses daily rotation, so the newest file sorts last by name.
pub fn log_file() -> Option<PathBuf> {
    let logs_dir = logs_dir()?;
    latest_log_in(&logs_dir).or_else(|| Some(logs_dir.join(LOG_FILE_NAME)))
}

fn latest_log_in(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_NAME))
        })
        // YYYY-MM-DD suffixes sort naturally
        .max()
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().ok_or_else(|| anyhow!("No config directory available"))?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

/// Ensure dumps dir exists, returning it
pub fn ensure_dumps_dir() -> Result<PathBuf> {
    let dumps = ensure_config_dir()?.join("dumps");
    ensure_dir(&dumps)?;
    Ok(dumps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_config_dir() {
        let (Some(dir), Some(config), Some(logs)) = (config_dir(), config_file(), logs_dir()) else {
            return;
        };
        assert!(dir.ends_with(APP_DIR));
        assert_eq!(config.parent(), Some(dir.as_path()));
        assert_eq!(logs.parent(), Some(dir.as_path()));
    }

    #[test]
    fn test_latest_log_picks_newest_rotation() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "multicaret.log.2026-01-05",
            "multicaret.log.2026-01-07",
            "other.log.2026-02-01",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let latest = latest_log_in(dir.path()).unwrap();
        assert!(latest.ends_with("multicaret.log.2026-01-07"));
    }

    #[test]
    fn test_latest_log_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_log_in(&dir.path().join("missing")), None);
    }
}
