use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{write_atomically, PromptError, Result};

/// Name of the application data directory.
pub const APP_DIR_NAME: &str = "PromptEx";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root of the authoritative data: full documents and the metadata index
    pub data_dir: PathBuf,

    /// Directory receiving the simplified title-and-body copies
    pub resources_dir: PathBuf,

    /// Editor used by `edit --editor`
    #[serde(default)]
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_root = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self {
            data_dir: data_root.join(APP_DIR_NAME),
            resources_dir: cwd.join("resources"),
            editor_command: None,
        }
    }
}

impl Config {
    /// Config rooted at `data_dir`, with simplified copies under `resources_dir`.
    pub fn with_dirs(data_dir: impl Into<PathBuf>, resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            resources_dir: resources_dir.into(),
            editor_command: None,
        }
    }

    /// Directory holding one full document per prompt.
    pub fn prompts_dir(&self) -> PathBuf {
        self.data_dir.join("prompts")
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("metadata.json")
    }

    /// Default location of the configuration file.
    pub fn config_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_DIR_NAME).map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads the configuration at `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| PromptError::ConfigError {
            message: format!("Invalid config file {}: {}", path.display(), e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomically(path, json.as_bytes())?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn derived_paths_live_under_data_dir() {
        let config = Config::with_dirs("/data/PromptEx", "/work/resources");
        assert_eq!(config.prompts_dir(), PathBuf::from("/data/PromptEx/prompts"));
        assert_eq!(config.index_path(), PathBuf::from("/data/PromptEx/metadata.json"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.data_dir.ends_with(APP_DIR_NAME));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::with_dirs(dir.path().join("data"), dir.path().join("res"));
        config.editor_command = Some("code --wait".to_string());

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(PromptError::ConfigError { .. })));
    }

    #[test]
    fn configured_editor_wins() {
        let mut config = Config::with_dirs("a", "b");
        config.editor_command = Some("helix".to_string());
        assert_eq!(config.get_editor_command(), "helix");
    }
}
