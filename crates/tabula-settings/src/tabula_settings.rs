//! Tabula Settings System
//!
//! Provides application settings with persistence, including:
//! - Editor behaviour (strict cell typing, new-table defaults)
//! - Alert timers and the delete confirmation cooldown
//! - Where the tables file lives

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabula_table_editor::AlertTimers;

mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TabulaSettings {
    pub editor: EditorSettings,
    pub alerts: AlertTimers,
    pub storage: StorageSettings,
}

impl TabulaSettings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = ?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|p| p.join("settings.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Reject cell values that do not fit the column type instead of storing
    /// them as typed
    pub strict_types: bool,
    /// Owner recorded on new tables
    pub default_owner: String,
    /// Name given to new tables
    pub new_table_name: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            strict_types: false,
            default_owner: "local".to_string(),
            new_table_name: "New table".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageSettings {
    /// Tables file; defaults to `tables.json` in the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_file: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolve_tables_file(&self) -> Result<PathBuf> {
        match self.tables_file {
            Some(ref path) => Ok(path.clone()),
            None => tables_file(),
        }
    }
}
