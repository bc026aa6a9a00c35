//! Configuration loading, validation, and management for ContextWeave.
//!
//! Loads configuration from `~/.contextweave/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use contextweave_core::cognitive::{CognitiveTool, Verbosity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.contextweave/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model used when the caller does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Context-window partition
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Retrieval limits and scoring constants
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Reasoning scaffold settings
    #[serde(default)]
    pub cognitive: CognitiveConfig,

    /// Extra or overriding rows for the model limits catalog
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelLimitsConfig>,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".into()
}

/// Fractions of the input budget (context window minus output reservation)
/// given to each prompt component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_system_share")]
    pub system_share: f64,

    #[serde(default = "default_tools_share")]
    pub tools_share: f64,

    #[serde(default = "default_memory_share")]
    pub memory_share: f64,

    #[serde(default = "default_retrieval_share")]
    pub retrieval_share: f64,

    #[serde(default = "default_conversation_share")]
    pub conversation_share: f64,

    /// Utilization percentage above which `is_approaching_limit` fires
    #[serde(default = "default_approaching_pct")]
    pub approaching_limit_pct: f64,

    /// Utilization percentage above which `is_critical` fires
    #[serde(default = "default_critical_pct")]
    pub critical_pct: f64,
}

fn default_system_share() -> f64 {
    0.15
}
fn default_tools_share() -> f64 {
    0.10
}
fn default_memory_share() -> f64 {
    0.10
}
fn default_retrieval_share() -> f64 {
    0.05
}
fn default_conversation_share() -> f64 {
    0.60
}
fn default_approaching_pct() -> f64 {
    80.0
}
fn default_critical_pct() -> f64 {
    95.0
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            system_share: default_system_share(),
            tools_share: default_tools_share(),
            memory_share: default_memory_share(),
            retrieval_share: default_retrieval_share(),
            conversation_share: default_conversation_share(),
            approaching_limit_pct: default_approaching_pct(),
            critical_pct: default_critical_pct(),
        }
    }
}

impl BudgetConfig {
    fn shares(&self) -> [f64; 5] {
        [
            self.system_share,
            self.tools_share,
            self.memory_share,
            self.retrieval_share,
            self.conversation_share,
        ]
    }
}

/// A model limits row supplied through configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelLimitsConfig {
    /// Canonical model key (without provider prefix)
    pub model: String,

    pub context_window: usize,

    pub max_output_tokens: usize,

    /// Display name; defaults to the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum chunks returned per retrieval
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Chunks scoring below this are discarded
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Whether file search is attempted at all
    #[serde(default = "default_true")]
    pub search_files: bool,

    /// Result limit passed to the store's file search
    #[serde(default = "default_max_file_results")]
    pub max_file_results: usize,

    /// Score assigned to every full-text file hit
    #[serde(default = "default_file_match_score")]
    pub file_match_score: f32,

    /// Characters kept per chunk before truncation
    #[serde(default = "default_chunk_char_limit")]
    pub chunk_char_limit: usize,

    /// File hits with more indexed text than this (bytes) are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// Extensions eligible for file retrieval; empty means all
    #[serde(default = "default_searchable_extensions")]
    pub searchable_extensions: Vec<String>,

    /// Spacing between estimated conversation-turn timestamps
    #[serde(default = "default_turn_offset_secs")]
    pub turn_offset_secs: i64,
}

fn default_max_chunks() -> usize {
    5
}
fn default_min_score() -> f32 {
    0.3
}
fn default_true() -> bool {
    true
}
fn default_max_file_results() -> usize {
    10
}
fn default_file_match_score() -> f32 {
    0.7
}
fn default_chunk_char_limit() -> usize {
    500
}
fn default_max_file_size() -> usize {
    50_000
}
fn default_searchable_extensions() -> Vec<String> {
    [".txt", ".md", ".json", ".yaml", ".yml", ".csv", ".log"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
/// One day.
pub const MAX_TURN_OFFSET_SECS: i64 = 86_400;

fn default_turn_offset_secs() -> i64 {
    60
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_chunks: default_max_chunks(),
            min_score: default_min_score(),
            search_files: true,
            max_file_results: default_max_file_results(),
            file_match_score: default_file_match_score(),
            chunk_char_limit: default_chunk_char_limit(),
            max_file_size: default_max_file_size(),
            searchable_extensions: default_searchable_extensions(),
            turn_offset_secs: default_turn_offset_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveConfig {
    /// Templates to render when the scaffold activates
    #[serde(default = "default_enabled_tools")]
    pub enabled_tools: Vec<CognitiveTool>,

    /// 1 = minimal, 2 = standard, 3 = detailed
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Complexity score (1-10) at which the scaffold activates
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: u8,
}

fn default_enabled_tools() -> Vec<CognitiveTool> {
    vec![CognitiveTool::Plan, CognitiveTool::Verify]
}
fn default_complexity_threshold() -> u8 {
    4
}

impl Default for CognitiveConfig {
    fn default() -> Self {
        Self {
            enabled_tools: default_enabled_tools(),
            verbosity: Verbosity::default(),
            complexity_threshold: default_complexity_threshold(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// Falls back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Allow env var to override default model
        if let Ok(model) = std::env::var("CONTEXTWEAVE_MODEL") {
            if !model.trim().is_empty() {
                config.default_model = model;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".contextweave")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let shares = self.budget.shares();
        if shares.iter().any(|s| !(0.0..=1.0).contains(s)) {
            return Err(ConfigError::ValidationError(
                "budget shares must each be between 0.0 and 1.0".into(),
            ));
        }
        // Small tolerance for decimal literals like 0.15 + 0.10 + ...
        if shares.iter().sum::<f64>() > 1.0 + 1e-9 {
            return Err(ConfigError::ValidationError(
                "budget shares must sum to at most 1.0".into(),
            ));
        }
        if self.budget.approaching_limit_pct > self.budget.critical_pct {
            return Err(ConfigError::ValidationError(
                "approaching_limit_pct must not exceed critical_pct".into(),
            ));
        }

        if self.retrieval.max_chunks == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.max_chunks must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.min_score)
            || !(0.0..=1.0).contains(&self.retrieval.file_match_score)
        {
            return Err(ConfigError::ValidationError(
                "retrieval scores must be between 0.0 and 1.0".into(),
            ));
        }
        if self.retrieval.chunk_char_limit == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.chunk_char_limit must be > 0".into(),
            ));
        }

        if !(0..=MAX_TURN_OFFSET_SECS).contains(&self.retrieval.turn_offset_secs) {
            return Err(ConfigError::ValidationError(format!(
                "retrieval.turn_offset_secs must be between 0 and {MAX_TURN_OFFSET_SECS}"
            )));
        }

        if !(1..=10).contains(&self.cognitive.complexity_threshold) {
            return Err(ConfigError::ValidationError(
                "cognitive.complexity_threshold must be between 1 and 10".into(),
            ));
        }

        for row in &self.models {
            if row.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "models entries need a non-empty model key".into(),
                ));
            }
            if row.max_output_tokens >= row.context_window {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': max_output_tokens must be below context_window",
                    row.model
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            budget: BudgetConfig::default(),
            retrieval: RetrievalConfig::default(),
            cognitive: CognitiveConfig::default(),
            models: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.max_chunks, 5);
        assert_eq!(config.cognitive.complexity_threshold, 4);
        assert_eq!(
            config.cognitive.enabled_tools,
            vec![CognitiveTool::Plan, CognitiveTool::Verify]
        );
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.cognitive.verbosity, Verbosity::Minimal);
        assert!((parsed.budget.conversation_share - 0.60).abs() < f64::EPSILON);
    }

    #[test]
    fn oversubscribed_budget_rejected() {
        let config = AppConfig {
            budget: BudgetConfig {
                conversation_share: 0.9,
                ..BudgetConfig::default()
            },
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to at most 1.0"));
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let config = AppConfig {
            cognitive: CognitiveConfig {
                complexity_threshold: 11,
                ..CognitiveConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_turn_offset_rejected() {
        for offset in [-1, MAX_TURN_OFFSET_SECS + 1, 10_000_000_000_000] {
            let mut config = AppConfig::default();
            config.retrieval.turn_offset_secs = offset;
            assert!(config.validate().is_err(), "offset {offset}");
        }

        let mut config = AppConfig::default();
        config.retrieval.turn_offset_secs = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_model, default_model());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_model = "gpt-4o"

[retrieval]
max_chunks = 8

[cognitive]
enabled_tools = ["UNDERSTAND", "PLAN", "VERIFY"]
verbosity = 2

[[models]]
model = "my-finetune"
context_window = 65536
max_output_tokens = 4096
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.retrieval.max_chunks, 8);
        assert!((config.retrieval.min_score - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.cognitive.verbosity, Verbosity::Standard);
        assert_eq!(config.cognitive.enabled_tools.len(), 3);
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].context_window, 65536);
    }

    #[test]
    fn unparseable_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = [not toml").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn model_row_with_oversized_output_rejected() {
        let config = AppConfig {
            models: vec![ModelLimitsConfig {
                model: "tiny".into(),
                context_window: 2048,
                max_output_tokens: 4096,
                name: None,
            }],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("claude-sonnet-4-5-20250929"));
        assert!(toml_str.contains("complexity_threshold"));
    }
}
