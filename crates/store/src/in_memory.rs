//! In-memory store, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use contextweave_core::error::StorageError;
use contextweave_core::scope::IsolationScope;
use contextweave_core::storage::{ContextStore, FileHit, MemoryState, RecentAction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// An in-memory store partitioned by isolation scope.
///
/// File search is a plain keyword match: a file matches when its path or
/// text contains any whitespace-separated query word (case-insensitive).
/// Results are ordered by the number of distinct words matched, then by
/// most recent `updated_at`.
#[derive(Clone)]
pub struct InMemoryContextStore {
    files: Arc<RwLock<HashMap<String, Vec<FileHit>>>>,
    memory: Arc<RwLock<HashMap<String, MemoryState>>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            memory: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add or replace (by path) a file within `scope`.
    pub async fn insert_file(&self, scope: &IsolationScope, mut hit: FileHit) {
        if hit.updated_at.is_none() {
            hit.updated_at = Some(Utc::now().timestamp_millis());
        }
        let mut files = self.files.write().await;
        let entries = files.entry(scope.as_str().to_string()).or_default();
        entries.retain(|existing| existing.path != hit.path);
        entries.push(hit);
    }

    pub async fn set_memory_state(&self, scope: &IsolationScope, state: MemoryState) {
        self.memory
            .write()
            .await
            .insert(scope.as_str().to_string(), state);
    }

    /// Store `actions` as the scope's `last_actions_json` record.
    pub async fn record_actions(
        &self,
        scope: &IsolationScope,
        actions: &[RecentAction],
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(actions)
            .map_err(|e| StorageError::Backend(format!("failed to encode actions: {e}")))?;
        self.set_memory_state(
            scope,
            MemoryState {
                last_actions_json: Some(encoded),
            },
        )
        .await;
        Ok(())
    }

    pub async fn file_count(&self, scope: &IsolationScope) -> usize {
        self.files
            .read()
            .await
            .get(scope.as_str())
            .map_or(0, Vec::len)
    }

    pub async fn clear(&self) {
        self.files.write().await.clear();
        self.memory.write().await.clear();
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search_files(
        &self,
        scope: &IsolationScope,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FileHit>, StorageError> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let files = self.files.read().await;
        let Some(entries) = files.get(scope.as_str()) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(usize, &FileHit)> = entries
            .iter()
            .filter_map(|hit| {
                let haystack = format!(
                    "{} {}",
                    hit.path,
                    hit.content_text.as_deref().unwrap_or_default()
                )
                .to_lowercase();
                let matched = words.iter().filter(|w| haystack.contains(w.as_str())).count();
                (matched > 0).then_some((matched, hit))
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.updated_at.cmp(&a.1.updated_at))
        });
        ranked.truncate(limit);

        debug!(
            scope = %scope,
            query,
            hits = ranked.len(),
            "In-memory file search"
        );
        Ok(ranked.into_iter().map(|(_, hit)| hit.clone()).collect())
    }

    async fn get_memory_state(
        &self,
        scope: &IsolationScope,
    ) -> Result<Option<MemoryState>, StorageError> {
        Ok(self.memory.read().await.get(scope.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(id: &str) -> IsolationScope {
        IsolationScope::new(id).unwrap()
    }

    fn file(path: &str, text: &str, updated_at: i64) -> FileHit {
        FileHit {
            path: path.into(),
            content_text: Some(text.into()),
            updated_at: Some(updated_at),
        }
    }

    #[tokio::test]
    async fn search_by_keyword() {
        let store = InMemoryContextStore::new();
        let s = scope("acct-1");
        store.insert_file(&s, file("notes/budget.md", "Quarterly budget review", 1)).await;
        store.insert_file(&s, file("notes/trip.md", "Packing list for Lisbon", 2)).await;

        let hits = store.search_files(&s, "budget", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "notes/budget.md");
    }

    #[tokio::test]
    async fn ranks_by_words_matched_then_recency() {
        let store = InMemoryContextStore::new();
        let s = scope("acct-1");
        store.insert_file(&s, file("a.md", "budget", 10)).await;
        store.insert_file(&s, file("b.md", "budget review", 1)).await;
        store.insert_file(&s, file("c.md", "budget", 20)).await;

        let hits = store.search_files(&s, "budget review", 10).await.unwrap();
        let paths: Vec<_> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["b.md", "c.md", "a.md"]);

        let hits = store.search_files(&s, "budget review", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store = InMemoryContextStore::new();
        let alice = scope("alice");
        let bob = scope("bob");
        store.insert_file(&alice, file("secret.md", "launch plan", 1)).await;

        assert!(store.search_files(&bob, "launch", 10).await.unwrap().is_empty());
        assert_eq!(store.search_files(&alice, "launch", 10).await.unwrap().len(), 1);
        assert_eq!(store.file_count(&bob).await, 0);
    }

    #[tokio::test]
    async fn insert_replaces_same_path() {
        let store = InMemoryContextStore::new();
        let s = scope("acct");
        store.insert_file(&s, file("a.md", "old", 1)).await;
        store.insert_file(&s, file("a.md", "new", 2)).await;
        assert_eq!(store.file_count(&s).await, 1);
        let hits = store.search_files(&s, "new", 5).await.unwrap();
        assert_eq!(hits[0].content_text.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn records_actions_as_json() {
        let store = InMemoryContextStore::new();
        let s = scope("acct");
        assert!(store.get_memory_state(&s).await.unwrap().is_none());

        let actions = vec![RecentAction {
            tool_name: "create_folder".into(),
            summary: Some("Created folder".into()),
            path: Some("~/Projects".into()),
            timestamp: None,
        }];
        store.record_actions(&s, &actions).await.unwrap();

        let state = store.get_memory_state(&s).await.unwrap().unwrap();
        let decoded: Vec<RecentAction> =
            serde_json::from_str(state.last_actions_json.as_deref().unwrap()).unwrap();
        assert_eq!(decoded, actions);
    }

    #[tokio::test]
    async fn clear_all() {
        let store = InMemoryContextStore::new();
        let s = scope("acct");
        store.insert_file(&s, file("a.md", "x", 1)).await;
        store.set_memory_state(&s, MemoryState::default()).await;
        store.clear().await;
        assert_eq!(store.file_count(&s).await, 0);
        assert!(store.get_memory_state(&s).await.unwrap().is_none());
    }
}
