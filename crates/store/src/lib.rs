//! Context storage implementations for ContextWeave.
//!
//! Both backends implement [`ContextStore`] and are meant for tests,
//! demos and ephemeral sessions. Durable backends live with the host
//! application.
//!
//! [`ContextStore`]: contextweave_core::ContextStore

pub mod in_memory;
pub mod noop;

pub use in_memory::InMemoryContextStore;
pub use noop::NoopContextStore;
