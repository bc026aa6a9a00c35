//! # ContextWeave Core
//!
//! Domain types, traits, and error definitions for the ContextWeave prompt
//! and context orchestration core. This crate has **no framework
//! dependencies**: it defines the canonical message and tool model, the
//! isolation scope, and the storage abstraction that the other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Everything provider-specific is decoded into the canonical types here
//! exactly once, at the boundary. Downstream components (retrieval,
//! cognitive scaffolding, token budgeting) only ever see canonical values.

pub mod cognitive;
pub mod error;
pub mod message;
pub mod scope;
pub mod storage;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use cognitive::{CognitiveMetadata, CognitiveResult, CognitiveTool, TaskContext, Verbosity};
pub use error::{Error, NormalizeError, Result, RetrievalError, StorageError};
pub use message::{CanonicalMessage, ContentBlock, ImageDetail, Role};
pub use scope::IsolationScope;
pub use storage::{ContextStore, FileHit, MemoryState, RecentAction};
pub use tool::NormalizedTool;
