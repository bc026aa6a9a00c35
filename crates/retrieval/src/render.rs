//! Prompt rendering for retrieved chunks.

use crate::chunk::{ChunkSource, ContextChunk};

/// Render chunks as tagged sections, one per source that has chunks,
/// separated by a blank line. No chunks renders as `""`.
pub fn build_retrieval_context(chunks: &[ContextChunk]) -> String {
    let mut sections = Vec::with_capacity(3);

    let conversation = bullets(chunks, ChunkSource::Conversation, |c| {
        format!(
            "- [Message {}]: {}",
            c.metadata.message_index.unwrap_or_default(),
            c.content
        )
    });
    if let Some(items) = conversation {
        sections.push(format!(
            "<RELEVANT_CONVERSATION>\n{items}\n</RELEVANT_CONVERSATION>"
        ));
    }

    let files = bullets(chunks, ChunkSource::File, |c| {
        format!(
            "- [{}]: {}",
            c.metadata.file_path.as_deref().unwrap_or_default(),
            c.content
        )
    });
    if let Some(items) = files {
        sections.push(format!("<RELEVANT_FILES>\n{items}\n</RELEVANT_FILES>"));
    }

    let actions = bullets(chunks, ChunkSource::Action, |c| format!("- {}", c.content));
    if let Some(items) = actions {
        sections.push(format!(
            "<RECENT_RELATED_ACTIONS>\n{items}\n</RECENT_RELATED_ACTIONS>"
        ));
    }

    sections.join("\n\n")
}

fn bullets(
    chunks: &[ContextChunk],
    source: ChunkSource,
    line: impl Fn(&ContextChunk) -> String,
) -> Option<String> {
    let lines: Vec<String> = chunks
        .iter()
        .filter(|c| c.source == source)
        .map(line)
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
