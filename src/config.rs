//! Runtime configuration
//!
//! One [`Config`] is built at process start (TOML file, then environment
//! overrides) and handed to the service by reference. Every field has a
//! default, so an empty or missing file is valid.

use crate::analysis::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Whether analyses call the AI service or use the deterministic generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Live,
    #[default]
    Demo,
}

impl std::str::FromStr for AnalysisMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "demo" | "mock" => Ok(Self::Demo),
            other => Err(ConfigError::Invalid(format!(
                "unknown analysis mode '{}' (expected live or demo)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 8192,
            base_url: "https://api.anthropic.com".to_string(),
            request_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    /// Hard ceiling on one module's AI call.
    pub analysis_timeout_secs: u64,
    /// Manuscripts longer than this (in characters) are sent as excerpts.
    pub excerpt_threshold_chars: usize,
    /// Upper bound on manuscript characters embedded in one prompt.
    pub prompt_char_cap: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            analysis_timeout_secs: 300,
            excerpt_threshold_chars: 150_000,
            prompt_char_cap: 200_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_upload_mb: u64,
    pub max_words: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 50,
            max_words: 200_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Carry accepted/rejected decisions over to identical findings when the
    /// queue is rebuilt.
    pub preserve_review_status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path; `None` uses the platform data directory.
    pub database: Option<PathBuf>,
    pub ai: AiConfig,
    pub analysis: AnalysisConfig,
    pub limits: LimitsConfig,
    pub scoring: ScoreWeights,
    pub queue: QueueConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = default_config_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `ANTHROPIC_API_KEY`, `REFINERY_MODEL`, `REFINERY_MODE` and
    /// `REFINERY_DB` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = lookup("REFINERY_MODEL").filter(|m| !m.trim().is_empty()) {
            self.ai.model = model;
        }
        if let Some(mode) = lookup("REFINERY_MODE") {
            self.analysis.mode = mode.parse()?;
        }
        if let Some(db) = lookup("REFINERY_DB").filter(|d| !d.trim().is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ai.max_tokens == 0 {
            return Err(ConfigError::Invalid("ai.max_tokens must be positive".into()));
        }
        if self.analysis.prompt_char_cap == 0 {
            return Err(ConfigError::Invalid(
                "analysis.prompt_char_cap must be positive".into(),
            ));
        }
        self.scoring
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("scoring: {}", e)))
    }

    /// Database path, falling back to the platform default.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_db_path)
    }
}

/// `~/.config/refinery/config.toml` (platform equivalent).
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"));
    config_dir.join("refinery").join("config.toml")
}

/// `~/.local/share/refinery/refinery.db` (platform equivalent).
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let refinery_dir = data_dir.join("refinery");
    std::fs::create_dir_all(&refinery_dir).ok();
    refinery_dir.join("refinery.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.ai.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.ai.max_tokens, 8192);
        assert_eq!(config.analysis.mode, AnalysisMode::Demo);
        assert_eq!(config.analysis.analysis_timeout_secs, 300);
        assert_eq!(config.limits.max_upload_mb, 50);
        assert_eq!(config.limits.max_words, 200_000);
        assert!(!config.queue.preserve_review_status);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [ai]
            model = "claude-test"

            [analysis]
            mode = "live"

            [queue]
            preserve_review_status = true
            "#,
        )
        .unwrap();

        assert_eq!(config.ai.model, "claude-test");
        assert_eq!(config.ai.max_tokens, 8192);
        assert_eq!(config.analysis.mode, AnalysisMode::Live);
        assert!(config.queue.preserve_review_status);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("REFINERY_MODE", "LIVE"),
            ("REFINERY_DB", "/tmp/r.db"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.analysis.mode, AnalysisMode::Live);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/r.db"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| (k == "REFINERY_MODE").then(|| "turbo".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[ai\nmodel = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
