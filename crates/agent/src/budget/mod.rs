//! Token budgeting.
//!
//! The model's context window, minus the reserved response buffer, is
//! partitioned into five component slices:
//!
//! | Component | Default share |
//! |-----------|---------------|
//! | System prompt | 15% |
//! | Tool definitions | 10% |
//! | Memory context | 10% |
//! | Retrieval | 5% |
//! | Conversation | 60% |
//!
//! [`TokenBudgetManager`] owns that partition for one model, tracks
//! per-component usage, and prunes or truncates content to fit.

pub mod manager;
pub mod models;
pub mod token;

pub use manager::{BudgetComponent, TokenBudget, TokenBudgetManager, TokenUsage};
pub use models::{ModelCatalog, ModelLimits, model_key};
