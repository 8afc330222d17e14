// Editor settings
// Loaded from ~/.config/gridedit/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default cap on the number of rows a single paste may carry.
pub const DEFAULT_MAX_PASTE_ROWS: usize = 1000;

/// Default number of unmatched lookup tokens listed in a cell message.
pub const DEFAULT_LOOKUP_MESSAGE_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    // Paste
    #[serde(rename = "paste.maxRows")]
    pub max_paste_rows: usize,

    #[serde(rename = "paste.lookupMessageLimit")]
    pub lookup_message_limit: usize,

    /// When set, a paste never grows the grid; rows past the end are dropped.
    #[serde(rename = "paste.lockRowCount")]
    pub lock_row_count: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_paste_rows: DEFAULT_MAX_PASTE_ROWS,
            lookup_message_limit: DEFAULT_LOOKUP_MESSAGE_LIMIT,
            lock_row_count: false,
        }
    }
}

impl EditorSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridedit");
        config_dir.join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        Self::from_json(&contents)
            .map_err(|e| format!("Error parsing {}: {}", path.display(), e))
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Save current settings to the default path
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }
}
