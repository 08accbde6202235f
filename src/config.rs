//! Engine configuration.
//!
//! Loaded from `config.json` in the user's config directory, then optionally
//! overridden from the environment:
//! - `MENUSHELL_HISTORY_SIZE` - per-session history capacity
//! - `MENUSHELL_STORAGE_SIZE` - bound of the in-memory history storage
//! - `MENUSHELL_HISTORY_CMD` - `0`/`false` hides the `history` built-in

use std::fs;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const APP_NAME: &str = "menushell";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Capacity of each session's history.
    pub history_size: usize,
    /// Bound of the in-memory history storage shared by all sessions.
    pub storage_size: usize,
    /// Register the `history` built-in command.
    pub history_command: bool,
    /// Printed before the menu name in the prompt.
    pub before_prompt: String,
    /// Printed after the menu name, before the closing `> `.
    pub after_prompt: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            history_size: 100,
            storage_size: 1000,
            history_command: true,
            before_prompt: String::new(),
            after_prompt: String::new(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply `MENUSHELL_*` environment overrides.
    pub fn from_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(size) = var("MENUSHELL_HISTORY_SIZE").and_then(|s| s.parse().ok()) {
            self.history_size = size;
        }
        if let Some(size) = var("MENUSHELL_STORAGE_SIZE").and_then(|s| s.parse().ok()) {
            self.storage_size = size;
        }
        if let Some(flag) = var("MENUSHELL_HISTORY_CMD") {
            self.history_command = !matches!(flag.trim(), "0" | "false" | "no" | "off");
        }
        self
    }

    /// Save the current configuration to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path = config_dir()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::default().with_overrides(env(&[
            ("MENUSHELL_HISTORY_SIZE", "5"),
            ("MENUSHELL_HISTORY_CMD", "off"),
        ]));
        assert_eq!(config.history_size, 5);
        assert_eq!(config.storage_size, 1000);
        assert!(!config.history_command);
    }

    #[test]
    fn test_bad_override_is_ignored() {
        let config =
            CliConfig::default().with_overrides(env(&[("MENUSHELL_STORAGE_SIZE", "lots")]));
        assert_eq!(config.storage_size, 1000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "history_size": 7 }"#).unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.history_size, 7);
        assert!(config.history_command);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = CliConfig {
            before_prompt: "[".to_string(),
            after_prompt: "]".to_string(),
            ..CliConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(CliConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(matches!(CliConfig::load_from(&path), Err(Error::Json(_))));
    }
}
