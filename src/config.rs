//! Configuration store
//!
//! YAML-backed settings: script variables, the per-step action budget, debug
//! and log options, and the LLM backend settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GepettoError, Result};

/// Project directory created by `gepetto init`
pub const PROJECT_DIR: &str = ".gepetto";

/// Config file name inside the project directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Default per-step action budget
pub const DEFAULT_MAX_STEPS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values substituted into `${NAME}` placeholders; names match case-insensitively
    pub variables: BTreeMap<String, String>,
    /// Maximum backend actions allowed while resolving one script step
    #[serde(alias = "maxSteps")]
    pub max_steps: u32,
    pub debug: bool,
    #[serde(alias = "logPath", skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            timeout_ms: 300000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
            max_steps: DEFAULT_MAX_STEPS,
            debug: false,
            log_path: None,
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Path of the project-local config file
    pub fn project_path() -> PathBuf {
        Path::new(PROJECT_DIR).join(CONFIG_FILE)
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load or fail loudly
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_config = Self::project_path();
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", project_config.display(), e);
                }
            }
        }

        // User-level fallback: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| GepettoError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| GepettoError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Write the configuration as YAML, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        log::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Case-insensitive variable lookup
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set a variable, replacing any existing key that differs only in case
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.variables.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.variables.insert(name, value.into());
    }

    /// Copy of this configuration with run-scoped variables layered on top
    pub fn with_overrides<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = self.clone();
        for (name, value) in overrides {
            config.set_variable(name, value);
        }
        config
    }
}

/// Parse a `NAME=VALUE` command-line variable
pub fn parse_variable(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("variable name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}
