//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token, rounded up.
//! Close enough for budgeting against BPE tokenizers on English text;
//! nothing here calls a real tokenizer.

use contextweave_core::message::{CanonicalMessage, ContentBlock, ImageDetail};
use contextweave_core::tool::NormalizedTool;
use contextweave_normalize::make_openai_tools;

/// Structural overhead charged per message (role name, delimiters).
pub const MESSAGE_OVERHEAD: usize = 4;

/// Flat cost of an image block.
pub const IMAGE_TOKENS: usize = 765;

/// Cost of an image block with `detail: low`.
pub const LOW_DETAIL_IMAGE_TOKENS: usize = 85;

/// Estimate the token count for a string: `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Estimate one content block. Tool blocks are costed by their JSON.
pub fn estimate_block_tokens(block: &ContentBlock) -> usize {
    match block {
        ContentBlock::Text { text } => estimate_tokens(text),
        ContentBlock::Image { detail, .. } => match detail {
            Some(ImageDetail::Low) => LOW_DETAIL_IMAGE_TOKENS,
            _ => IMAGE_TOKENS,
        },
        ContentBlock::ToolUse { .. } | ContentBlock::ToolResult { .. } => {
            let json = serde_json::to_string(block).unwrap_or_default();
            estimate_tokens(&json)
        }
    }
}

/// Overhead + role + content.
pub fn estimate_message_tokens(message: &CanonicalMessage) -> usize {
    MESSAGE_OVERHEAD
        + estimate_tokens(message.role.as_str())
        + message
            .content
            .iter()
            .map(estimate_block_tokens)
            .sum::<usize>()
}

pub fn estimate_messages_tokens(messages: &[CanonicalMessage]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

/// Tools are costed in the OpenAI wire shape, the larger of the two.
pub fn estimate_tools_tokens(tools: &[NormalizedTool]) -> usize {
    make_openai_tools(tools)
        .iter()
        .map(|tool| estimate_tokens(&serde_json::to_string(tool).unwrap_or_default()))
        .sum()
}
