//! No-op store: disables file and recent-action retrieval entirely.

use async_trait::async_trait;
use contextweave_core::error::StorageError;
use contextweave_core::scope::IsolationScope;
use contextweave_core::storage::{ContextStore, FileHit, MemoryState};

/// A store that holds nothing. Every query succeeds with no results.
pub struct NoopContextStore;

#[async_trait]
impl ContextStore for NoopContextStore {
    fn name(&self) -> &str { "none" }

    async fn search_files(
        &self,
        _scope: &IsolationScope,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<FileHit>, StorageError> {
        Ok(Vec::new())
    }

    async fn get_memory_state(
        &self,
        _scope: &IsolationScope,
    ) -> Result<Option<MemoryState>, StorageError> {
        Ok(None)
    }
}
