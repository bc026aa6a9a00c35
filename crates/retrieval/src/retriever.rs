//! The context retriever.

use crate::chunk::{ChunkMetadata, ChunkSource, ContextChunk, truncate_content};
use crate::keywords::extract_keywords;
use crate::scoring::relevance_score;
use chrono::{DateTime, Duration, TimeZone, Utc};
use contextweave_config::RetrievalConfig;
use contextweave_core::error::RetrievalError;
use contextweave_core::scope::IsolationScope;
use contextweave_core::storage::{ContextStore, FileHit, RecentAction};
use std::sync::Arc;
use tracing::{debug, info, warn};

const FILE_OVERFETCH: usize = 3;

/// Retrieves ranked context for one account.
///
/// Storage failures never surface as errors: they are logged and the
/// affected source contributes no chunks.
pub struct ContextRetriever {
    store: Arc<dyn ContextStore>,
    scope: IsolationScope,
    config: RetrievalConfig,
}

impl ContextRetriever {
    /// Fails with `MissingIsolationScope` when `scope` is blank.
    pub fn new(
        store: Arc<dyn ContextStore>,
        scope: impl Into<String>,
        config: RetrievalConfig,
    ) -> Result<Self, RetrievalError> {
        let scope = IsolationScope::new(scope)?;
        info!(
            scope = %scope,
            store = store.name(),
            max_chunks = config.max_chunks,
            min_score = config.min_score,
            "Context retriever initialized"
        );
        Ok(Self {
            store,
            scope,
            config,
        })
    }

    pub fn scope(&self) -> &IsolationScope {
        &self.scope
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// At most `max_chunks` chunks scoring at least `min_score`, best first.
    pub async fn retrieve(&self, query: &str, history: &[String]) -> Vec<ContextChunk> {
        let keywords = extract_keywords(query);
        if keywords.is_empty() {
            debug!("No keywords extracted from query, skipping retrieval");
            return Vec::new();
        }
        debug!(keywords = ?keywords, "Retrieving context");

        let now = Utc::now();
        let mut chunks = self.search_conversation(&keywords, history, now);
        if self.config.search_files {
            chunks.extend(self.search_files(&keywords).await);
        }
        chunks.extend(self.search_recent_actions(&keywords).await);

        let total = chunks.len();
        chunks.retain(|c| c.score >= self.config.min_score);
        // stable: ties keep source order
        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));
        chunks.truncate(self.config.max_chunks);

        info!(
            scope = %self.scope,
            total,
            kept = chunks.len(),
            sources = ?chunks.iter().map(|c| c.source.as_str()).collect::<Vec<_>>(),
            "Context retrieved"
        );
        chunks
    }

    fn search_conversation(
        &self,
        keywords: &[String],
        history: &[String],
        now: DateTime<Utc>,
    ) -> Vec<ContextChunk> {
        let n = history.len() as i64;
        history
            .iter()
            .enumerate()
            .filter_map(|(i, message)| {
                let score = relevance_score(keywords, message);
                (score > 0.0).then(|| {
                    // most recent turn gets `now`
                    let timestamp = (n - 1 - i as i64)
                        .checked_mul(self.config.turn_offset_secs)
                        .and_then(Duration::try_seconds)
                        .and_then(|age| now.checked_sub_signed(age));
                    ContextChunk {
                        source: ChunkSource::Conversation,
                        content: truncate_content(message, self.config.chunk_char_limit),
                        score,
                        metadata: ChunkMetadata {
                            message_index: Some(i),
                            timestamp,
                            ..Default::default()
                        },
                    }
                })
            })
            .collect()
    }

    /// Hits are filtered after the store applies its limit, so the store is
    /// asked for `FILE_OVERFETCH` times `max_file_results` and the eligible
    /// hits are capped afterwards.
    async fn search_files(&self, keywords: &[String]) -> Vec<ContextChunk> {
        let query = keywords.join(" ");
        let limit = self.config.max_file_results.saturating_mul(FILE_OVERFETCH);
        let hits = match self.store.search_files(&self.scope, &query, limit).await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(scope = %self.scope, error = %e, "File search failed");
                return Vec::new();
            }
        };

        hits.into_iter()
            .filter_map(|hit| self.file_chunk(hit))
            .take(self.config.max_file_results)
            .collect()
    }

    fn file_chunk(&self, hit: FileHit) -> Option<ContextChunk> {
        if !self.is_searchable(&hit.path) {
            debug!(path = %hit.path, "Skipping file with unsearchable extension");
            return None;
        }
        let text = hit.content_text.unwrap_or_default();
        if text.is_empty() {
            debug!(path = %hit.path, "Skipping file without indexed text");
            return None;
        }
        if text.len() > self.config.max_file_size {
            debug!(path = %hit.path, bytes = text.len(), "Skipping oversized file");
            return None;
        }

        Some(ContextChunk {
            source: ChunkSource::File,
            content: truncate_content(&text, self.config.chunk_char_limit),
            score: self.config.file_match_score,
            metadata: ChunkMetadata {
                file_path: Some(hit.path),
                timestamp: hit.updated_at.and_then(from_millis),
                ..Default::default()
            },
        })
    }

    fn is_searchable(&self, path: &str) -> bool {
        let extensions = &self.config.searchable_extensions;
        if extensions.is_empty() {
            return true;
        }
        let lower = path.to_lowercase();
        extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    async fn search_recent_actions(&self, keywords: &[String]) -> Vec<ContextChunk> {
        let state = match self.store.get_memory_state(&self.scope).await {
            Ok(Some(state)) => state,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(scope = %self.scope, error = %e, "Memory state lookup failed");
                return Vec::new();
            }
        };
        let Some(raw) = state.last_actions_json else {
            return Vec::new();
        };

        let actions: Vec<RecentAction> = match serde_json::from_str(&raw) {
            Ok(actions) => actions,
            Err(e) => {
                warn!(scope = %self.scope, error = %e, "Could not parse recent actions");
                return Vec::new();
            }
        };

        actions
            .into_iter()
            .filter_map(|action| {
                let text = action.render();
                let score = relevance_score(keywords, &text);
                (score > 0.0).then(|| ContextChunk {
                    source: ChunkSource::Action,
                    content: text,
                    score,
                    metadata: ChunkMetadata {
                        action_type: Some(action.tool_name),
                        file_path: action.path,
                        timestamp: action.timestamp.and_then(from_millis),
                        ..Default::default()
                    },
                })
            })
            .collect()
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
