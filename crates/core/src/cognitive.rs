//! Cognitive scaffolding domain types.
//!
//! The toolkit itself lives in `contextweave-agent`; the vocabulary lives
//! here so configuration can name tools and verbosity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One reasoning template. Declaration order is rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CognitiveTool {
    /// Parse and clarify user intent
    Understand,
    /// Break the task into steps
    Plan,
    /// Carry out planned actions
    Execute,
    /// Confirm results match expectations
    Verify,
    /// Learn from outcomes
    Reflect,
}

impl CognitiveTool {
    pub const ALL: [CognitiveTool; 5] = [
        Self::Understand,
        Self::Plan,
        Self::Execute,
        Self::Verify,
        Self::Reflect,
    ];

    /// The tag rendered around the template, e.g. `PLAN`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Understand => "UNDERSTAND",
            Self::Plan => "PLAN",
            Self::Execute => "EXECUTE",
            Self::Verify => "VERIFY",
            Self::Reflect => "REFLECT",
        }
    }
}

impl fmt::Display for CognitiveTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Template verbosity. Serialized as the integers 1, 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Verbosity {
    /// Single-line prompts
    #[default]
    Minimal,
    /// Structured checklists
    Standard,
    /// Fully detailed, with tables
    Detailed,
}

impl TryFrom<u8> for Verbosity {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Standard),
            3 => Ok(Self::Detailed),
            other => Err(format!("verbosity must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl From<Verbosity> for u8 {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Minimal => 1,
            Verbosity::Standard => 2,
            Verbosity::Detailed => 3,
        }
    }
}

/// Read-only input to the cognitive toolkit for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContext {
    pub user_message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_context: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_tools: Vec<String>,
}

impl TaskContext {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }
}

/// Advisory annotation produced by task analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveResult {
    pub tool: CognitiveTool,
    pub output: String,
    #[serde(default)]
    pub metadata: CognitiveMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CognitiveMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_identified: Option<u8>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities_found: Vec<String>,
}
