//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Allocator tuning (minimum session length)
//! - Remote plan generator endpoint, model, key and timeout
//! - Default log level
//!
//! Configuration is stored at `~/.config/studbud/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::integrations::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::scheduler::AllocatorConfig;

/// Allocator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: u32,
}

/// Remote plan generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overridden by the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studbud/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_min_session_minutes() -> u32 {
    15
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_session_minutes: default_min_session_minutes(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    /// API key from `GEMINI_API_KEY`, else the configured one. Blank counts as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_with_override(std::env::var("GEMINI_API_KEY").ok())
    }

    fn api_key_with_override(&self, env_key: Option<String>) -> Option<String> {
        let present = |k: &String| !k.trim().is_empty();
        env_key
            .filter(present)
            .or_else(|| self.api_key.clone().filter(present))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key, keeping its type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Update a value and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn allocator_config(&self) -> AllocatorConfig {
        AllocatorConfig {
            min_session_minutes: self.planner.min_session_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.planner.min_session_minutes, 15);
        assert_eq!(parsed.generator.model, "gemini-2.0-flash");
        assert_eq!(parsed.generator.api_key, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[planner]\nmin_session_minutes = 20\n").unwrap();
        assert_eq!(parsed.planner.min_session_minutes, 20);
        assert_eq!(parsed.generator.timeout_secs, 30);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("planner.min_session_minutes").as_deref(), Some("15"));
        assert_eq!(cfg.get("generator.model").as_deref(), Some("gemini-2.0-flash"));
        assert!(cfg.get("planner.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.apply("planner.min_session_minutes", "25").unwrap();
        cfg.apply("logging.level", "debug").unwrap();
        assert_eq!(cfg.planner.min_session_minutes, 25);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.allocator_config().min_session_minutes, 25);
    }

    #[test]
    fn env_key_overrides_configured_key() {
        let cfg = GeneratorConfig {
            api_key: Some("from-config".to_string()),
            ..GeneratorConfig::default()
        };
        assert_eq!(
            cfg.api_key_with_override(Some("from-env".to_string())).as_deref(),
            Some("from-env")
        );
        assert_eq!(cfg.api_key_with_override(None).as_deref(), Some("from-config"));
    }

    #[test]
    fn blank_env_key_does_not_hide_configured_key() {
        let cfg = GeneratorConfig {
            api_key: Some("from-config".to_string()),
            ..GeneratorConfig::default()
        };
        assert_eq!(
            cfg.api_key_with_override(Some(String::new())).as_deref(),
            Some("from-config")
        );
        assert_eq!(
            cfg.api_key_with_override(Some("  ".to_string())).as_deref(),
            Some("from-config")
        );
    }

    #[test]
    fn blank_keys_everywhere_resolve_to_none() {
        let cfg = GeneratorConfig {
            api_key: Some(" ".to_string()),
            ..GeneratorConfig::default()
        };
        assert_eq!(cfg.api_key_with_override(Some(String::new())), None);
        assert_eq!(GeneratorConfig::default().api_key_with_override(None), None);
    }

    #[test]
    fn apply_sets_optional_key() {
        let mut cfg = Config::default();
        cfg.apply("generator.api_key", "abc123").unwrap();
        assert_eq!(cfg.generator.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "planner.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result =
            Config::set_json_value_by_path(&mut json, "planner.min_session_minutes", "lots");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.planner.min_session_minutes, 15);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.apply("generator.timeout_secs", "5").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().generator.timeout_secs, 5);
    }

    #[test]
    fn load_from_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "planner = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
