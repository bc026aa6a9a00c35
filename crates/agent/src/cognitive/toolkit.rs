//! The cognitive toolkit.

use super::complexity::{complexity_score, estimate_steps};
use super::entities::extract_entities;
use super::templates;
use contextweave_config::CognitiveConfig;
use contextweave_core::cognitive::{CognitiveMetadata, CognitiveResult, CognitiveTool, TaskContext};
use tracing::{debug, info};

const MINIMAL_PROMPT: &str = "<COGNITIVE>
For complex tasks: 1) UNDERSTAND the request 2) PLAN the steps 3) EXECUTE tools 4) VERIFY results
</COGNITIVE>";

/// Scores requests and renders reasoning scaffolds for the complex ones.
pub struct CognitiveToolkit {
    config: CognitiveConfig,
}

impl CognitiveToolkit {
    pub fn new(config: CognitiveConfig) -> Self {
        info!(
            tools = ?config.enabled_tools,
            verbosity = u8::from(config.verbosity),
            threshold = config.complexity_threshold,
            "Cognitive toolkit initialized"
        );
        Self { config }
    }

    pub fn config(&self) -> &CognitiveConfig {
        &self.config
    }

    pub fn is_enabled(&self, tool: CognitiveTool) -> bool {
        self.config.enabled_tools.contains(&tool)
    }

    /// Enabled tools in rendering order, regardless of config order.
    fn enabled_in_order(&self) -> impl Iterator<Item = CognitiveTool> + '_ {
        CognitiveTool::ALL
            .into_iter()
            .filter(|tool| self.is_enabled(*tool))
    }

    /// Complexity of the request, 1-10.
    pub fn analyze_complexity(&self, ctx: &TaskContext) -> u8 {
        complexity_score(&ctx.user_message)
    }

    pub fn should_activate(&self, ctx: &TaskContext) -> bool {
        self.analyze_complexity(ctx) >= self.config.complexity_threshold
    }

    /// The full scaffold, or `""` below the threshold or with no enabled
    /// tools.
    pub fn build_cognitive_prompt(&self, ctx: &TaskContext) -> String {
        let complexity = self.analyze_complexity(ctx);
        if complexity < self.config.complexity_threshold {
            debug!(complexity, "Task below complexity threshold, skipping scaffold");
            return String::new();
        }

        let sections: Vec<String> = self
            .enabled_in_order()
            .map(|tool| templates::render(tool, self.config.verbosity, ctx))
            .collect();
        if sections.is_empty() {
            return String::new();
        }

        info!(
            complexity,
            tools = ?self.enabled_in_order().collect::<Vec<_>>(),
            "Cognitive scaffold activated"
        );
        format!(
            "<COGNITIVE_FRAMEWORK>
This is a complex task (complexity: {complexity}/10). Use the following structured reasoning:

{}

Apply these frameworks in order before and during task execution.
</COGNITIVE_FRAMEWORK>",
            sections.join("\n\n")
        )
    }

    /// One-line reminder for turns where the full scaffold does not fit.
    pub fn build_minimal_cognitive_prompt(&self, ctx: &TaskContext) -> String {
        if !self.should_activate(ctx) {
            return String::new();
        }
        MINIMAL_PROMPT.to_string()
    }

    /// Advisory analysis: an UNDERSTAND result with complexity and
    /// entities, and a PLAN result with a step estimate, each only when
    /// that tool is enabled.
    pub fn analyze_task(&self, ctx: &TaskContext) -> Vec<CognitiveResult> {
        let complexity = self.analyze_complexity(ctx);
        let mut results = Vec::with_capacity(2);

        if self.is_enabled(CognitiveTool::Understand) {
            let entities = extract_entities(&ctx.user_message);
            results.push(CognitiveResult {
                tool: CognitiveTool::Understand,
                output: format!(
                    "Task complexity: {complexity}/10. {} entities identified.",
                    entities.len()
                ),
                metadata: CognitiveMetadata {
                    complexity: Some(complexity),
                    entities_found: entities,
                    ..Default::default()
                },
            });
        }

        if self.is_enabled(CognitiveTool::Plan) {
            let steps = estimate_steps(&ctx.user_message);
            results.push(CognitiveResult {
                tool: CognitiveTool::Plan,
                output: format!("Estimated {steps} steps required for this task."),
                metadata: CognitiveMetadata {
                    steps_identified: Some(steps),
                    ..Default::default()
                },
            });
        }

        results
    }
}

impl Default for CognitiveToolkit {
    fn default() -> Self {
        Self::new(CognitiveConfig::default())
    }
}
