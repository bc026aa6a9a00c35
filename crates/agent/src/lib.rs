//! Per-turn context orchestration for ContextWeave.
//!
//! Every turn runs the same pipeline:
//!
//! 1. **Normalize** raw provider messages and tools into canonical form
//! 2. **Retrieve** relevant conversation, file and action context
//! 3. **Scaffold** complex requests with structured reasoning templates
//! 4. **Budget** every component against the model's context window
//!
//! [`TurnAssembler`] drives the pipeline; [`TokenBudgetManager`] and
//! [`CognitiveToolkit`] can also be used on their own.

pub mod assembler;
pub mod budget;
pub mod cognitive;

pub use assembler::{AssembledTurn, ProviderFormat, TurnAssembler, TurnInput};
pub use budget::{
    BudgetComponent, ModelCatalog, ModelLimits, TokenBudget, TokenBudgetManager, TokenUsage,
};
pub use cognitive::CognitiveToolkit;
