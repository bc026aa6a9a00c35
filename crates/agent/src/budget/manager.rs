//! Per-model budget partitioning and usage tracking.

use crate::budget::models::{ModelCatalog, ModelLimits};
use crate::budget::token;
use contextweave_config::BudgetConfig;
use contextweave_core::message::CanonicalMessage;
use contextweave_core::tool::NormalizedTool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Minimum number of non-system messages pruning leaves in place.
const PRUNE_FLOOR: usize = 2;

/// Characters held back from a truncation target for the ellipsis.
const TRUNCATION_MARGIN: usize = 20;

/// One of the five budgeted prompt components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetComponent {
    System,
    Tools,
    Memory,
    Retrieval,
    Conversation,
}

impl BudgetComponent {
    pub const ALL: [BudgetComponent; 5] = [
        Self::System,
        Self::Tools,
        Self::Memory,
        Self::Retrieval,
        Self::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Tools => "tools",
            Self::Memory => "memory",
            Self::Retrieval => "retrieval",
            Self::Conversation => "conversation",
        }
    }
}

impl fmt::Display for BudgetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The partition of one model's context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenBudget {
    /// Full context window.
    pub total: usize,
    pub system: usize,
    pub tools: usize,
    pub memory: usize,
    pub retrieval: usize,
    pub conversation: usize,
    /// Reserved for the model's response.
    pub response_buffer: usize,
}

impl TokenBudget {
    /// `total - response_buffer`.
    pub fn input_budget(&self) -> usize {
        self.total.saturating_sub(self.response_buffer)
    }

    /// Sum of the five component slices.
    pub fn allocated(&self) -> usize {
        BudgetComponent::ALL.iter().map(|c| self.slice(*c)).sum()
    }

    pub fn slice(&self, component: BudgetComponent) -> usize {
        match component {
            BudgetComponent::System => self.system,
            BudgetComponent::Tools => self.tools,
            BudgetComponent::Memory => self.memory,
            BudgetComponent::Retrieval => self.retrieval,
            BudgetComponent::Conversation => self.conversation,
        }
    }
}

/// Usage counters for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub system: usize,
    pub tools: usize,
    pub memory: usize,
    pub retrieval: usize,
    pub conversation: usize,
    pub total: usize,
    pub remaining: usize,
    pub utilization_percent: f64,
}

impl TokenUsage {
    pub fn get(&self, component: BudgetComponent) -> usize {
        match component {
            BudgetComponent::System => self.system,
            BudgetComponent::Tools => self.tools,
            BudgetComponent::Memory => self.memory,
            BudgetComponent::Retrieval => self.retrieval,
            BudgetComponent::Conversation => self.conversation,
        }
    }

    fn slot(&mut self, component: BudgetComponent) -> &mut usize {
        match component {
            BudgetComponent::System => &mut self.system,
            BudgetComponent::Tools => &mut self.tools,
            BudgetComponent::Memory => &mut self.memory,
            BudgetComponent::Retrieval => &mut self.retrieval,
            BudgetComponent::Conversation => &mut self.conversation,
        }
    }
}

/// Owns one model's budget partition and the running usage against it.
///
/// Unknown models never fail: they get [`ModelLimits::unknown`].
pub struct TokenBudgetManager {
    catalog: Arc<ModelCatalog>,
    config: BudgetConfig,
    model: String,
    limits: ModelLimits,
    budget: TokenBudget,
    usage: TokenUsage,
}

impl TokenBudgetManager {
    /// Manager with the default component shares.
    pub fn new(model: &str, catalog: Arc<ModelCatalog>) -> Self {
        Self::with_config(model, catalog, BudgetConfig::default())
    }

    /// Manager with configured shares and advisory thresholds. The config
    /// is expected to have passed `AppConfig::validate`.
    pub fn with_config(model: &str, catalog: Arc<ModelCatalog>, config: BudgetConfig) -> Self {
        let limits = catalog.resolve(model);
        let mut manager = Self {
            catalog,
            config,
            model: model.to_string(),
            limits,
            budget: TokenBudget::default(),
            usage: TokenUsage::default(),
        };
        manager.repartition();
        manager
    }

    fn repartition(&mut self) {
        self.budget = self.calculate_budget();
        self.usage = TokenUsage {
            remaining: self.budget.input_budget(),
            ..TokenUsage::default()
        };
        info!(
            model = %self.model,
            known = self.catalog.contains(&self.model),
            context_window = self.limits.context_window,
            max_output = self.limits.max_output_tokens,
            "Token budget initialized"
        );
    }

    /// Partition `context_window - max_output_tokens` by the configured
    /// shares, flooring each slice.
    pub fn calculate_budget(&self) -> TokenBudget {
        let input = self.limits.input_budget() as f64;
        let share = |fraction: f64| (input * fraction).floor() as usize;
        TokenBudget {
            total: self.limits.context_window,
            system: share(self.config.system_share),
            tools: share(self.config.tools_share),
            memory: share(self.config.memory_share),
            retrieval: share(self.config.retrieval_share),
            conversation: share(self.config.conversation_share),
            response_buffer: self.limits.max_output_tokens,
        }
    }

    pub fn estimate_tokens(&self, text: &str) -> usize {
        token::estimate_tokens(text)
    }

    pub fn estimate_messages_tokens(&self, messages: &[CanonicalMessage]) -> usize {
        token::estimate_messages_tokens(messages)
    }

    pub fn estimate_tools_tokens(&self, tools: &[NormalizedTool]) -> usize {
        token::estimate_tools_tokens(tools)
    }

    /// Record `tokens` for `component` and recompute the totals.
    pub fn update_usage(&mut self, component: BudgetComponent, tokens: usize) {
        *self.usage.slot(component) = tokens;

        let input = self.budget.input_budget();
        let total: usize = BudgetComponent::ALL.iter().map(|c| self.usage.get(*c)).sum();
        self.usage.total = total;
        self.usage.remaining = input.saturating_sub(total);
        self.usage.utilization_percent = match (input, total) {
            (0, 0) => 0.0,
            (0, _) => 100.0,
            _ => total as f64 / input as f64 * 100.0,
        };
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn budget(&self) -> TokenBudget {
        self.budget
    }

    pub fn would_exceed_budget(&self, additional_tokens: usize) -> bool {
        self.usage.total + additional_tokens > self.budget.input_budget()
    }

    /// Slice minus what the component already uses, floored at zero.
    pub fn available_for_component(&self, component: BudgetComponent) -> usize {
        self.budget
            .slice(component)
            .saturating_sub(self.usage.get(component))
    }

    /// Fit `messages` into `target` tokens (default: the conversation
    /// slice).
    ///
    /// System messages are always kept, ahead of the rest. The oldest
    /// non-system messages are dropped until the remainder fits the target
    /// minus the system cost, but never below the last two.
    pub fn prune_messages_to_fit(
        &self,
        messages: &[CanonicalMessage],
        target: Option<usize>,
    ) -> Vec<CanonicalMessage> {
        let target = target.unwrap_or(self.budget.conversation);
        let current = token::estimate_messages_tokens(messages);
        if current <= target {
            return messages.to_vec();
        }

        let (system, conversation): (Vec<&CanonicalMessage>, Vec<&CanonicalMessage>) =
            messages.iter().partition(|m| m.is_system());
        let system_tokens: usize = system.iter().map(|m| token::estimate_message_tokens(m)).sum();
        let available = target.saturating_sub(system_tokens);

        let mut conversation_tokens: usize = conversation
            .iter()
            .map(|m| token::estimate_message_tokens(m))
            .sum();
        let mut start = 0;
        while conversation_tokens > available && conversation.len() - start > PRUNE_FLOOR {
            conversation_tokens -= token::estimate_message_tokens(conversation[start]);
            start += 1;
        }

        let pruned: Vec<CanonicalMessage> = system
            .into_iter()
            .chain(conversation[start..].iter().copied())
            .cloned()
            .collect();

        info!(
            original_count = messages.len(),
            pruned_count = pruned.len(),
            removed = start,
            original_tokens = current,
            final_tokens = system_tokens + conversation_tokens,
            target,
            "Messages pruned to fit"
        );
        pruned
    }

    /// Cut `text` to `max_tokens * 4 - 20` characters plus `...` when it
    /// does not fit. Returns `""` when that leaves no room.
    pub fn truncate_to_fit(&self, text: &str, max_tokens: usize) -> String {
        if token::estimate_tokens(text) <= max_tokens {
            return text.to_string();
        }
        let target_chars = max_tokens.saturating_mul(4).saturating_sub(TRUNCATION_MARGIN);
        if target_chars == 0 {
            return String::new();
        }
        let mut truncated: String = text.chars().take(target_chars).collect();
        truncated.push_str("...");
        truncated
    }

    /// One-line usage summary for logs.
    pub fn summary(&self) -> String {
        let u = &self.usage;
        format!(
            "Tokens: {}/{} ({:.1}%) | System: {} | Tools: {} | Memory: {} | Retrieval: {} | Conv: {}",
            u.total,
            self.budget.input_budget(),
            u.utilization_percent,
            u.system,
            u.tools,
            u.memory,
            u.retrieval,
            u.conversation
        )
    }

    pub fn is_approaching_limit(&self) -> bool {
        self.usage.utilization_percent > self.config.approaching_limit_pct
    }

    pub fn is_critical(&self) -> bool {
        self.usage.utilization_percent > self.config.critical_pct
    }

    pub fn model_info(&self) -> &ModelLimits {
        &self.limits
    }

    /// The identifier this manager was built for, as given.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch models: re-partition and reset usage.
    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
        self.limits = self.catalog.resolve(model);
        self.repartition();
    }
}
