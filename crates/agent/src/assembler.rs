//! Turn assembly: the per-turn pipeline from raw provider input to a
//! budget-compliant prompt.
//!
//! 1. **Normalize** raw messages and tool definitions (hard failure on
//!    malformed input)
//! 2. **Split** system messages out; the last user turn is the query,
//!    earlier turns are history
//! 3. **Retrieve** relevant context, truncated to the retrieval slice
//! 4. **Scaffold** complex requests, falling back to the minimal scaffold
//!    when the full one does not fit the system slice
//! 5. **Fit** memory, conversation and tools into their slices
//! 6. **Report** all five components to the budget manager
//!
//! A fresh [`TokenBudgetManager`] is built for every turn, so usage never
//! leaks between turns.

use crate::budget::{BudgetComponent, ModelCatalog, ModelLimits, TokenBudget, TokenBudgetManager, TokenUsage};
use crate::cognitive::CognitiveToolkit;
use contextweave_config::{AppConfig, BudgetConfig};
use contextweave_core::cognitive::{CognitiveResult, TaskContext};
use contextweave_core::error::Result;
use contextweave_core::message::{CanonicalMessage, Role};
use contextweave_core::tool::NormalizedTool;
use contextweave_normalize::{
    MessageDefaults, extract_and_remove_system_messages, make_claude_tools, make_openai_tools,
    normalize_messages, normalize_tools_object,
};
use contextweave_retrieval::{ContextChunk, ContextRetriever, build_retrieval_context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which wire convention tool definitions are re-serialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFormat {
    OpenAi,
    Claude,
}

impl ProviderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }
}

impl FromStr for ProviderFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "claude" | "anthropic" => Ok(Self::Claude),
            other => Err(format!("unknown provider format '{other}'")),
        }
    }
}

/// Raw input for one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnInput {
    /// Base system prompt, placed ahead of any system messages.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Pre-rendered memory block (e.g. a summary of past sessions).
    #[serde(default)]
    pub memory_context: Option<String>,
    /// Raw messages in any supported provider shape.
    #[serde(default)]
    pub messages: Vec<Value>,
    /// Raw tool definitions in either provider convention.
    #[serde(default)]
    pub tools: Vec<Value>,
}

/// The assembled, budget-compliant turn.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledTurn {
    pub turn_id: Uuid,
    pub model: String,
    pub model_info: ModelLimits,
    /// System prompt plus extracted system messages.
    pub system: String,
    /// Cognitive scaffold (full, minimal, or empty).
    pub cognitive: String,
    /// Memory block after truncation.
    pub memory: String,
    /// Rendered retrieval block after truncation.
    pub retrieval: String,
    pub chunks: Vec<ContextChunk>,
    /// Conversation after pruning (no system messages).
    pub messages: Vec<CanonicalMessage>,
    pub pruned_messages: usize,
    pub tools: Vec<NormalizedTool>,
    pub analysis: Vec<CognitiveResult>,
    pub budget: TokenBudget,
    pub usage: TokenUsage,
    pub approaching_limit: bool,
    pub critical: bool,
}

impl AssembledTurn {
    /// All non-empty system-side blocks joined by blank lines: system
    /// text, cognitive scaffold, memory, retrieval.
    pub fn system_prompt(&self) -> String {
        [&self.system, &self.cognitive, &self.memory, &self.retrieval]
            .into_iter()
            .filter(|block| !block.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Tool definitions in the given provider's wire shape.
    pub fn tools_payload(&self, format: ProviderFormat) -> Result<Value> {
        let payload = match format {
            ProviderFormat::OpenAi => serde_json::to_value(make_openai_tools(&self.tools))?,
            ProviderFormat::Claude => serde_json::to_value(make_claude_tools(Some(&self.tools)))?,
        };
        Ok(payload)
    }
}

/// Runs the per-turn pipeline for one model.
pub struct TurnAssembler {
    model: String,
    catalog: Arc<ModelCatalog>,
    budget_config: BudgetConfig,
    toolkit: CognitiveToolkit,
    retriever: Option<ContextRetriever>,
}

impl TurnAssembler {
    /// Default shares and cognitive settings, no retrieval.
    pub fn new(model: impl Into<String>, catalog: Arc<ModelCatalog>) -> Self {
        Self {
            model: model.into(),
            catalog,
            budget_config: BudgetConfig::default(),
            toolkit: CognitiveToolkit::default(),
            retriever: None,
        }
    }

    /// Build from application config: the default model, the catalog with
    /// `[[models]]` overrides applied, and the budget and cognitive
    /// sections.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = ModelCatalog::with_defaults().with_overrides(&config.models);
        Self::new(config.default_model.clone(), Arc::new(catalog))
            .with_budget_config(config.budget.clone())
            .with_toolkit(CognitiveToolkit::new(config.cognitive.clone()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_budget_config(mut self, config: BudgetConfig) -> Self {
        self.budget_config = config;
        self
    }

    pub fn with_toolkit(mut self, toolkit: CognitiveToolkit) -> Self {
        self.toolkit = toolkit;
        self
    }

    pub fn with_retriever(mut self, retriever: ContextRetriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn catalog(&self) -> &Arc<ModelCatalog> {
        &self.catalog
    }

    /// Assemble one turn.
    pub async fn assemble(&self, input: TurnInput) -> Result<AssembledTurn> {
        let turn_id = Uuid::new_v4();
        let mut manager = TokenBudgetManager::with_config(
            &self.model,
            self.catalog.clone(),
            self.budget_config.clone(),
        );
        let budget = manager.budget();

        // 1. normalize
        let messages = normalize_messages(&input.messages, &MessageDefaults::default())?;
        let tools = normalize_tools_object(&input.tools)?;

        // 2. split
        let (system_messages, conversation) = extract_and_remove_system_messages(messages);
        let system = input
            .system_prompt
            .iter()
            .cloned()
            .chain(system_messages.iter().map(CanonicalMessage::text_content))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let (query, history) = split_query(&conversation);

        // 3. retrieve
        let (chunks, retrieval) = match &self.retriever {
            Some(retriever) => {
                let chunks = retriever.retrieve(&query, &history).await;
                let rendered = build_retrieval_context(&chunks);
                let retrieval = manager.truncate_to_fit(&rendered, budget.retrieval);
                (chunks, retrieval)
            }
            None => (Vec::new(), String::new()),
        };

        // 4. scaffold
        let ctx = TaskContext {
            user_message: query,
            conversation_history: history,
            memory_context: input.memory_context.clone(),
            available_tools: tools.iter().map(|t| t.name.clone()).collect(),
        };
        let system_tokens = manager.estimate_tokens(&system);
        let mut cognitive = self.toolkit.build_cognitive_prompt(&ctx);
        if !cognitive.is_empty() && system_tokens + manager.estimate_tokens(&cognitive) > budget.system {
            debug!(
                turn_id = %turn_id,
                system_slice = budget.system,
                "Full scaffold exceeds system slice, using minimal scaffold"
            );
            cognitive = self.toolkit.build_minimal_cognitive_prompt(&ctx);
        }
        let analysis = self.toolkit.analyze_task(&ctx);
        for result in &analysis {
            debug!(turn_id = %turn_id, tool = result.tool.tag(), output = %result.output, "Task analysis");
        }

        // 5. fit
        let memory = input
            .memory_context
            .as_deref()
            .map(|m| manager.truncate_to_fit(m, budget.memory))
            .unwrap_or_default();
        let fitted = manager.prune_messages_to_fit(&conversation, Some(budget.conversation));
        let pruned_messages = conversation.len() - fitted.len();
        let tools_tokens = manager.estimate_tools_tokens(&tools);
        if tools_tokens > budget.tools {
            warn!(
                turn_id = %turn_id,
                tools_tokens,
                tools_slice = budget.tools,
                "Tool definitions exceed their budget slice"
            );
        }

        // 6. report
        manager.update_usage(
            BudgetComponent::System,
            system_tokens + manager.estimate_tokens(&cognitive),
        );
        manager.update_usage(BudgetComponent::Tools, tools_tokens);
        manager.update_usage(BudgetComponent::Memory, manager.estimate_tokens(&memory));
        manager.update_usage(BudgetComponent::Retrieval, manager.estimate_tokens(&retrieval));
        manager.update_usage(
            BudgetComponent::Conversation,
            manager.estimate_messages_tokens(&fitted),
        );

        let approaching_limit = manager.is_approaching_limit();
        let critical = manager.is_critical();
        if critical {
            warn!(turn_id = %turn_id, summary = %manager.summary(), "Context usage critical");
        }
        info!(
            turn_id = %turn_id,
            model = %self.model,
            messages = fitted.len(),
            pruned = pruned_messages,
            chunks = chunks.len(),
            scaffold = !cognitive.is_empty(),
            summary = %manager.summary(),
            "Turn assembled"
        );

        Ok(AssembledTurn {
            turn_id,
            model: self.model.clone(),
            model_info: manager.model_info().clone(),
            system,
            cognitive,
            memory,
            retrieval,
            chunks,
            messages: fitted,
            pruned_messages,
            tools,
            analysis,
            budget,
            usage: manager.usage(),
            approaching_limit,
            critical,
        })
    }
}

/// The text of the last user turn, and the text of every non-empty turn
/// before it.
fn split_query(conversation: &[CanonicalMessage]) -> (String, Vec<String>) {
    let Some(last_user) = conversation.iter().rposition(|m| m.role == Role::User) else {
        return (String::new(), Vec::new());
    };
    let history = conversation[..last_user]
        .iter()
        .map(CanonicalMessage::text_content)
        .filter(|text| !text.is_empty())
        .collect();
    (conversation[last_user].text_content(), history)
}
