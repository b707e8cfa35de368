//! Runtime settings: the dependency sentinel, the function-form table and
//! where the record store lives.

use crate::model::FunctionFormTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a JSON settings file.
pub const SETTINGS_ENV: &str = "CONTOUR_CORE_SETTINGS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dependency-field value meaning "this parameter is a constant".
    pub no_dependency_token: String,
    pub max_variable_count: usize,
    pub function_forms: FunctionFormTable,
    pub store_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            no_dependency_token: "!None".to_string(),
            max_variable_count: 10,
            function_forms: FunctionFormTable::default(),
            store_root: PathBuf::from("user_generated"),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let settings: Settings = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        settings.check()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Loads the file named by `CONTOUR_CORE_SETTINGS`, or the defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_variable_count == 0 {
            return Err(ConfigError::Invalid("max_variable_count must be at least 1".into()));
        }
        if self.function_forms.is_empty() {
            return Err(ConfigError::Invalid("function_forms must not be empty".into()));
        }
        let token = self.no_dependency_token.trim();
        let looks_like_token = token.contains('f') && token.starts_with(|c: char| c.is_ascii_digit());
        if token.is_empty() || looks_like_token {
            return Err(ConfigError::Invalid(format!(
                "no_dependency_token '{}' collides with the dependency token syntax",
                self.no_dependency_token
            )));
        }
        Ok(())
    }
}
