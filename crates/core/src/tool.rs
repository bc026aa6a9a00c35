//! Canonical tool definition.
//!
//! Tool schemas arrive in either the OpenAI convention
//! (`{type: "function", function: {...}}`) or the Claude convention
//! (`{name, input_schema}`). Both are decoded into [`NormalizedTool`] and
//! re-serialized per provider on the way out.

use serde::{Deserialize, Serialize};

/// A tool definition in canonical form.
///
/// Invariant (enforced by the normalizer): `parameters` is a JSON Schema
/// object with `type == "object"`, and every `array` node has `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTool {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl NormalizedTool {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            parameters,
        }
    }
}
