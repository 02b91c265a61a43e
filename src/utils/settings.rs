//! Settings and configuration utilities.
//!
//! This module reads settings from $HOME/.rename-commit/settings.json and uses
//! them as a fallback for environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::message::DEFAULT_SUBJECT_LIMIT;

/// Environment variable naming the editor used for commit messages.
pub const EDITOR_VAR: &str = "RENAME_COMMIT_EDITOR";

/// Environment variable naming the git program.
pub const GIT_PROGRAM_VAR: &str = "RENAME_COMMIT_GIT";

/// Environment variable overriding the first-line warning limit.
pub const SUBJECT_LIMIT_VAR: &str = "RENAME_COMMIT_SUBJECT_LIMIT";

/// Settings loaded from $HOME/.rename-commit/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // A missing file means no overrides
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Settings>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".rename-commit").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }

    /// Returns the first of `keys` that is set, in order.
    pub fn get_first_env_var(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get_env_var(key))
    }
}

/// Resolved configuration for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Editor command line, if any is configured.
    pub editor: Option<String>,
    /// Program used to run git.
    pub git_program: String,
    /// First-line length above which a warning is shown.
    pub subject_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: None,
            git_program: "git".to_string(),
            subject_limit: DEFAULT_SUBJECT_LIMIT,
        }
    }
}

impl Config {
    /// Resolves configuration from the environment and the default settings file.
    pub fn load() -> Result<Self> {
        let settings = Settings::load()?;
        Self::from_settings(&settings)
    }

    /// Resolves configuration from the environment and `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let editor = settings
            .get_first_env_var(&[EDITOR_VAR, "GIT_EDITOR", "EDITOR"])
            .map(|editor| editor.trim().to_string())
            .filter(|editor| !editor.is_empty());

        let git_program = settings
            .get_env_var(GIT_PROGRAM_VAR)
            .filter(|program| !program.trim().is_empty())
            .unwrap_or_else(|| "git".to_string());

        let subject_limit = match settings.get_env_var(SUBJECT_LIMIT_VAR) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {SUBJECT_LIMIT_VAR} value: {value}"))?,
            None => DEFAULT_SUBJECT_LIMIT,
        };

        Ok(Self {
            editor,
            git_program,
            subject_limit,
        })
    }
}
