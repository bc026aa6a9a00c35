//! Storage trait: the injected abstraction the retriever searches.
//!
//! The core never owns persistence. A host application supplies a
//! [`ContextStore`] that exposes:
//! - Full-text file search scoped to one account
//! - The account's memory state (a JSON-encoded "last actions" record)
//!
//! Timeouts and cancellation are the implementation's responsibility.

use crate::error::StorageError;
use crate::scope::IsolationScope;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A file returned by full-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHit {
    /// Path of the file within the account's storage
    pub path: String,

    /// Indexed text content, if any was extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,

    /// Last modification time, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Per-account memory state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    /// JSON array of [`RecentAction`] records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_actions_json: Option<String>,
}

/// One entry of the "last actions" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAction {
    /// The tool that performed the action
    pub tool_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RecentAction {
    /// The text the retriever scores: `toolName: summary path`.
    pub fn render(&self) -> String {
        format!(
            "{}: {} {}",
            self.tool_name,
            self.summary.as_deref().unwrap_or_default(),
            self.path.as_deref().unwrap_or_default()
        )
    }
}

/// The core ContextStore trait.
///
/// Implementations: in-memory (for testing), none (no-op), or any
/// host-provided database adapter.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// The store name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Keyword full-text search over the scope's files.
    async fn search_files(
        &self,
        scope: &IsolationScope,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<FileHit>, StorageError>;

    /// The scope's memory state, if one has been recorded.
    async fn get_memory_state(
        &self,
        scope: &IsolationScope,
    ) -> std::result::Result<Option<MemoryState>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_action_parses_camel_case() {
        let json = r#"[{"toolName":"create_folder","summary":"Created Projects","path":"~/Desktop/Projects","timestamp":1700000000000}]"#;
        let actions: Vec<RecentAction> = serde_json::from_str(json).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool_name, "create_folder");
        assert_eq!(actions[0].timestamp, Some(1_700_000_000_000));
    }

    #[test]
    fn recent_action_render_tolerates_missing_fields() {
        let action = RecentAction {
            tool_name: "list_files".into(),
            summary: None,
            path: Some("~/Documents".into()),
            timestamp: None,
        };
        assert_eq!(action.render(), "list_files:  ~/Documents");
    }
}
