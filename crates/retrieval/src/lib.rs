//! Context retrieval for ContextWeave.
//!
//! Given the current user query, the [`ContextRetriever`] extracts
//! keywords, scores prior conversation turns and recent tool actions
//! against them, asks the injected [`ContextStore`] for matching files,
//! and returns a ranked, capped list of [`ContextChunk`]s.
//! [`build_retrieval_context`] renders those chunks as tagged prompt
//! sections.
//!
//! [`ContextStore`]: contextweave_core::ContextStore

pub mod chunk;
pub mod keywords;
pub mod render;
pub mod retriever;
pub mod scoring;

pub use chunk::{ChunkMetadata, ChunkSource, ContextChunk, truncate_content};
pub use keywords::{STOP_WORDS, extract_keywords};
pub use render::build_retrieval_context;
pub use retriever::ContextRetriever;
pub use scoring::relevance_score;
