//! User settings stored as JSON in the per-user config directory.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ViewMode, DEFAULT_CONTEXT};

/// File name inside the config directory.
const SETTINGS_FILE: &str = "settings.json";

/// Cached config directory path.
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the revcompare config directory (cached).
pub fn config_dir() -> &'static Path {
    CONFIG_DIR.get_or_init(|| {
        directories::ProjectDirs::from("", "", "revcompare")
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(dirs_fallback)
    })
}

/// Fallback config directory if `directories` fails.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(|h| Path::new(&h).join(".config").join("revcompare"))
        .unwrap_or_else(|_| PathBuf::from(".revcompare"))
}

/// Errors reading or writing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error.
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON.
    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Schema version for migration.
    pub version: u32,
    /// Open the changed-file dialog grouped by directory.
    pub tree_view: bool,
    /// Unchanged lines shown around each hunk.
    pub context_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            tree_view: false,
            context_lines: DEFAULT_CONTEXT,
        }
    }
}

impl Settings {
    /// Current schema version.
    pub const VERSION: u32 = 1;

    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        config_dir().join(SETTINGS_FILE)
    }

    /// Load from the default location. Missing or unreadable files yield defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Load from `path`, reporting errors.
    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path())
    }

    /// Save to `path` atomically (write temp file, then rename).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Initial layout of the changed-file dialog.
    pub fn view_mode(&self) -> ViewMode {
        if self.tree_view {
            ViewMode::Tree
        } else {
            ViewMode::List
        }
    }
}
