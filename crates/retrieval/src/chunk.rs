//! Retrieved context chunks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSource {
    Conversation,
    File,
    Action,
}

impl ChunkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::File => "file",
            Self::Action => "action",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Position in the conversation history (conversation chunks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_index: Option<usize>,

    /// File path (file chunks, and actions that touched a path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Tool name (action chunks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A scored snippet of context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub source: ChunkSource,
    pub content: String,
    /// Relevance in `[0, 1]`
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Cap `content` at `limit` characters.
///
/// The cut moves back to the last space when that space lies past 80% of
/// the cap; `...` is appended whenever anything was removed.
pub fn truncate_content(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }

    let head: Vec<char> = content.chars().take(limit).collect();
    let cut = match head.iter().rposition(|c| *c == ' ') {
        Some(space) if space as f64 > limit as f64 * 0.8 => space,
        _ => head.len(),
    };
    let mut truncated: String = head[..cut].iter().collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_unchanged() {
        assert_eq!(truncate_content("hello world", 500), "hello world");
        assert_eq!(truncate_content("", 10), "");
    }

    #[test]
    fn cuts_at_late_space() {
        // last space at index 9, past 80% of 10
        let text = "abcdefghi jklmnop";
        assert_eq!(truncate_content(text, 10), "abcdefghi...");
    }

    #[test]
    fn hard_cut_when_space_is_early() {
        let text = "ab cdefghijklmnop";
        assert_eq!(truncate_content(text, 10), "ab cdefghi...");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(20);
        let out = truncate_content(&text, 10);
        assert_eq!(out.chars().count(), 13);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ChunkSource::File).unwrap(), "file");
        assert_eq!(ChunkSource::Action.as_str(), "action");
    }
}
