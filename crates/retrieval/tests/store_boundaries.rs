//! Retriever behavior at the storage boundary: scope isolation, skipped
//! queries, and degraded backends.

use async_trait::async_trait;
use contextweave_config::RetrievalConfig;
use contextweave_core::{ContextStore, FileHit, IsolationScope, MemoryState, StorageError};
use contextweave_retrieval::{ChunkSource, ContextRetriever, build_retrieval_context};
use contextweave_store::InMemoryContextStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts calls and optionally fails every one of them.
#[derive(Default)]
struct CountingStore {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn search_files(
        &self,
        _scope: &IsolationScope,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<FileHit>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::QueryFailed("index offline".into()));
        }
        Ok(Vec::new())
    }

    async fn get_memory_state(
        &self,
        _scope: &IsolationScope,
    ) -> Result<Option<MemoryState>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Timeout("memory state".into()));
        }
        Ok(None)
    }
}

#[tokio::test]
async fn empty_keyword_query_never_reaches_storage() {
    let store = Arc::new(CountingStore::default());
    let retriever =
        ContextRetriever::new(store.clone(), "acct-1", RetrievalConfig::default()).unwrap();

    let chunks = retriever
        .retrieve("can you do it for me?", &["earlier turn".to_string()])
        .await;
    assert!(chunks.is_empty());
    assert_eq!(store.calls(), 0);

    let chunks = retriever
        .retrieve("the and of", &["the and of it all".to_string()])
        .await;
    assert!(chunks.is_empty());
    assert_eq!(store.calls(), 0);

    retriever.retrieve("quarterly report", &[]).await;
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn failing_store_degrades_to_conversation_only() {
    let store = Arc::new(CountingStore::failing());
    let retriever =
        ContextRetriever::new(store.clone(), "acct-1", RetrievalConfig::default()).unwrap();

    let chunks = retriever
        .retrieve(
            "quarterly report",
            &["the quarterly report is due friday".to_string()],
        )
        .await;
    assert_eq!(store.calls(), 2);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].source, ChunkSource::Conversation);
}

#[tokio::test]
async fn retrieval_never_crosses_scopes() {
    let store = Arc::new(InMemoryContextStore::new());
    let alice = IsolationScope::new("0xalice").unwrap();
    let bob = IsolationScope::new("0xbob").unwrap();
    store
        .insert_file(
            &alice,
            FileHit {
                path: "plans/launch.md".into(),
                content_text: Some("Launch plan for the spring release".into()),
                updated_at: None,
            },
        )
        .await;
    store
        .insert_file(
            &bob,
            FileHit {
                path: "plans/garden.md".into(),
                content_text: Some("Garden launch checklist".into()),
                updated_at: None,
            },
        )
        .await;

    let for_bob =
        ContextRetriever::new(store.clone(), "0xbob", RetrievalConfig::default()).unwrap();
    let chunks = for_bob.retrieve("launch", &[]).await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(
        chunks[0].metadata.file_path.as_deref(),
        Some("plans/garden.md")
    );

    let rendered = build_retrieval_context(&chunks);
    assert!(rendered.starts_with("<RELEVANT_FILES>"));
    assert!(!rendered.contains("spring release"));
}
