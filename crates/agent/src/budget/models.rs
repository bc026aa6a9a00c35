//! Built-in model limits table.
//!
//! Context windows and output caps are conservative figures. Rows can be
//! added or overridden from `[[models]]` entries in the config file; the
//! resulting catalog is immutable and shared.

use contextweave_config::ModelLimitsConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context window and output cap for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Total context window in tokens.
    pub context_window: usize,
    /// Tokens reserved for the model's response.
    pub max_output_tokens: usize,
    /// Display name.
    pub name: String,
}

impl ModelLimits {
    pub fn new(context_window: usize, max_output_tokens: usize, name: impl Into<String>) -> Self {
        Self {
            context_window,
            max_output_tokens,
            name: name.into(),
        }
    }

    /// Limits assumed for a model the catalog does not know.
    pub fn unknown() -> Self {
        Self::new(8192, 2048, "Unknown Model")
    }

    /// Window left for input once the response buffer is reserved.
    pub fn input_budget(&self) -> usize {
        self.context_window.saturating_sub(self.max_output_tokens)
    }
}

/// The lookup key for a model identifier: everything after the first `:`
/// when a provider prefix is present (`ollama:llama3.2` → `llama3.2`).
pub fn model_key(model: &str) -> &str {
    model.split_once(':').map_or(model, |(_, rest)| rest)
}

/// Model limits keyed by canonical model name.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, ModelLimits>,
}

impl ModelCatalog {
    /// A catalog with the built-in rows.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();

        // ── Anthropic ──────────────────────────────────────────────
        catalog.insert("claude-sonnet-4-5-20250929", ModelLimits::new(200_000, 8192, "Claude Sonnet 4.5"));
        catalog.insert("claude-opus-4-20250514", ModelLimits::new(200_000, 8192, "Claude Opus 4"));
        catalog.insert("claude-3-5-sonnet-20241022", ModelLimits::new(200_000, 8192, "Claude 3.5 Sonnet"));
        catalog.insert("claude-3-5-haiku-20241022", ModelLimits::new(200_000, 8192, "Claude 3.5 Haiku"));

        // ── OpenAI ─────────────────────────────────────────────────
        catalog.insert("gpt-4o", ModelLimits::new(128_000, 16_384, "GPT-4o"));
        catalog.insert("gpt-4o-mini", ModelLimits::new(128_000, 16_384, "GPT-4o Mini"));
        catalog.insert("gpt-4-turbo", ModelLimits::new(128_000, 4096, "GPT-4 Turbo"));
        catalog.insert("gpt-4", ModelLimits::new(8192, 4096, "GPT-4"));
        catalog.insert("gpt-3.5-turbo", ModelLimits::new(16_385, 4096, "GPT-3.5 Turbo"));

        // ── Google ─────────────────────────────────────────────────
        catalog.insert("gemini-2.0-flash", ModelLimits::new(1_000_000, 8192, "Gemini 2.0 Flash"));
        catalog.insert("gemini-1.5-pro", ModelLimits::new(2_000_000, 8192, "Gemini 1.5 Pro"));
        catalog.insert("gemini-1.5-flash", ModelLimits::new(1_000_000, 8192, "Gemini 1.5 Flash"));
        catalog.insert("gemini-pro", ModelLimits::new(32_000, 8192, "Gemini Pro"));

        // ── xAI ────────────────────────────────────────────────────
        catalog.insert("grok-3", ModelLimits::new(131_072, 8192, "Grok 3"));
        catalog.insert("grok-3-fast", ModelLimits::new(131_072, 8192, "Grok 3 Fast"));
        catalog.insert("grok-2", ModelLimits::new(131_072, 8192, "Grok 2"));
        catalog.insert("grok-vision-beta", ModelLimits::new(8192, 4096, "Grok Vision"));

        // ── Local (Ollama) ─────────────────────────────────────────
        catalog.insert("deepseek-r1:1.5b", ModelLimits::new(32_000, 4096, "DeepSeek R1 1.5B"));
        catalog.insert("deepseek-r1:7b", ModelLimits::new(32_000, 4096, "DeepSeek R1 7B"));
        catalog.insert("deepseek-r1:14b", ModelLimits::new(32_000, 4096, "DeepSeek R1 14B"));
        catalog.insert("llama3.2", ModelLimits::new(128_000, 4096, "Llama 3.2"));
        catalog.insert("llama3.1", ModelLimits::new(128_000, 4096, "Llama 3.1"));
        catalog.insert("llava", ModelLimits::new(4096, 2048, "LLaVA"));

        catalog
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace a row.
    pub fn insert(&mut self, model: impl Into<String>, limits: ModelLimits) {
        self.models.insert(model.into(), limits);
    }

    /// Apply config rows on top of this catalog.
    pub fn with_overrides(mut self, rows: &[ModelLimitsConfig]) -> Self {
        for row in rows {
            let name = row.name.clone().unwrap_or_else(|| row.model.clone());
            self.insert(
                row.model.clone(),
                ModelLimits::new(row.context_window, row.max_output_tokens, name),
            );
        }
        self
    }

    /// Look up a model identifier.
    ///
    /// The full identifier is tried first so keys that themselves contain
    /// a colon (`deepseek-r1:7b`) resolve, then the key after the provider
    /// prefix (`ollama:deepseek-r1:7b` → `deepseek-r1:7b`).
    pub fn lookup(&self, model: &str) -> Option<&ModelLimits> {
        self.models
            .get(model)
            .or_else(|| self.models.get(model_key(model)))
    }

    /// Like [`lookup`](Self::lookup), falling back to [`ModelLimits::unknown`].
    pub fn resolve(&self, model: &str) -> ModelLimits {
        self.lookup(model).cloned().unwrap_or_else(ModelLimits::unknown)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.lookup(model).is_some()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Known model keys, sorted.
    pub fn models(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.models.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
