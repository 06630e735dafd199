//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/multicaret/config.yaml`

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::text::DEFAULT_INDENT_WIDTH;

/// Editing settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Columns per indent level; also the width a typed tab expands to
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Carry indentation over on line break, adding a level after `{`
    #[serde(default = "default_auto_indent")]
    pub auto_indent: bool,

    /// Maximum number of undo batches kept
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

fn default_auto_indent() -> bool {
    true
}

fn default_max_history() -> usize {
    1000
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            auto_indent: default_auto_indent(),
            max_history: default_max_history(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found or invalid
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    /// Load and normalize config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let dir = crate::config_paths::ensure_config_dir()?;
        self.save_to(&dir.join("config.yaml"))
    }

    /// Save config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values the editing core cannot work with
    pub fn normalized(mut self) -> Self {
        if self.indent_width == 0 {
            tracing::warn!("indent_width 0 is invalid, using 1");
            self.indent_width = 1;
        }
        if self.max_history == 0 {
            self.max_history = 1;
        }
        self
    }
}
