//! Provider-agnostic normalization.
//!
//! Two leaf components run first on every turn:
//!
//! - [`messages`] decodes raw turns (plain strings, OpenAI `tool_calls`
//!   objects, Claude content-block objects) into [`CanonicalMessage`]s,
//!   then splits and merges them into a strictly alternating sequence.
//! - [`tools`] decodes tool definitions from either provider convention
//!   into [`NormalizedTool`]s and re-serializes them per provider.
//!
//! Both operate on `serde_json::Value` input and fail fast on malformed
//! shapes rather than dropping content.
//!
//! [`CanonicalMessage`]: contextweave_core::CanonicalMessage
//! [`NormalizedTool`]: contextweave_core::NormalizedTool

pub mod messages;
pub mod tools;

pub use messages::{
    MessageDefaults, extract_and_remove_system_messages, extract_canonical_text, extract_text,
    normalize_messages, normalize_single_message,
};
pub use tools::{
    ClaudeTool, OpenAiFunction, OpenAiTool, make_claude_tools, make_openai_tools,
    normalize_json_schema, normalize_tools_object,
};
