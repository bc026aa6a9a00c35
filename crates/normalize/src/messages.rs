//! Message normalization.
//!
//! Raw input is decoded in one explicit classification step
//! ([`classify`]) with a fixed priority:
//!
//! 1. a bare string is a single text block;
//! 2. an object with non-empty `content` is decoded block by block, and
//!    any `tool_calls` alongside it become trailing `tool_use` blocks;
//! 3. an object without `content` but with a `tool_calls` array has every
//!    call rewritten into a `tool_use` block;
//! 4. anything else is rejected.
//!
//! [`normalize_messages`] then splits every message into one message per
//! block and merges consecutive same-role runs. Applying it to its own
//! output is a no-op.

use contextweave_core::error::NormalizeError;
use contextweave_core::message::{CanonicalMessage, ContentBlock, ImageDetail, Role};
use serde_json::{Map, Value};
use tracing::debug;

/// Top-level fields consumed by decoding; everything else passes through.
const CONSUMED_FIELDS: [&str; 3] = ["role", "content", "tool_calls"];

/// Defaults applied to inputs that do not carry the field themselves.
#[derive(Debug, Clone, Copy)]
pub struct MessageDefaults {
    pub role: Role,
}

impl Default for MessageDefaults {
    fn default() -> Self {
        Self { role: Role::User }
    }
}

/// How a raw message is interpreted.
enum MessageShape<'a> {
    Bare(&'a str),
    Content {
        fields: &'a Map<String, Value>,
        content: &'a Value,
    },
    ToolCalls {
        fields: &'a Map<String, Value>,
        calls: &'a [Value],
    },
}

fn classify(input: &Value) -> Result<MessageShape<'_>, NormalizeError> {
    let fields = match input {
        Value::String(text) => return Ok(MessageShape::Bare(text)),
        Value::Object(fields) => fields,
        _ => {
            return Err(NormalizeError::InvalidMessageShape(
                "each message must be a string or object".into(),
            ));
        }
    };

    match fields.get("content") {
        Some(content) if !is_absent(content) => Ok(MessageShape::Content { fields, content }),
        _ => match fields.get("tool_calls") {
            Some(Value::Array(calls)) => Ok(MessageShape::ToolCalls { fields, calls }),
            Some(_) => Err(NormalizeError::InvalidMessageShape(
                "'tool_calls' must be an array".into(),
            )),
            None => Err(NormalizeError::InvalidMessageShape(
                "each message must have a 'content' property".into(),
            )),
        },
    }
}

/// `tool_calls` carried next to non-empty content.
fn trailing_tool_calls(fields: &Map<String, Value>) -> Result<&[Value], NormalizeError> {
    match fields.get("tool_calls") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(calls)) => Ok(calls),
        Some(_) => Err(NormalizeError::InvalidMessageShape(
            "'tool_calls' must be an array".into(),
        )),
    }
}

/// `null` and `""` count as no content at all.
fn is_absent(content: &Value) -> bool {
    content.is_null() || content.as_str() == Some("")
}

/// Normalize one raw message (string or object) into canonical form.
pub fn normalize_single_message(
    input: &Value,
    defaults: &MessageDefaults,
) -> Result<CanonicalMessage, NormalizeError> {
    let message = match classify(input)? {
        MessageShape::Bare(text) => CanonicalMessage::text(defaults.role, text),
        MessageShape::Content { fields, content } => {
            let mut blocks = match content {
                Value::Array(items) => items
                    .iter()
                    .map(decode_block)
                    .collect::<Result<Vec<_>, _>>()?,
                single => vec![decode_block(single)?],
            };
            for call in trailing_tool_calls(fields)? {
                blocks.push(decode_tool_call(call)?);
            }
            CanonicalMessage {
                role: resolve_role(fields, defaults)?,
                content: blocks,
                extra: passthrough(fields),
            }
        }
        MessageShape::ToolCalls { fields, calls } => CanonicalMessage {
            role: resolve_role(fields, defaults)?,
            content: calls
                .iter()
                .map(decode_tool_call)
                .collect::<Result<Vec<_>, _>>()?,
            extra: passthrough(fields),
        },
    };

    if message.content.is_empty() {
        return Err(NormalizeError::InvalidMessageShape(
            "message content must not be empty".into(),
        ));
    }
    Ok(message)
}

fn resolve_role(
    fields: &Map<String, Value>,
    defaults: &MessageDefaults,
) -> Result<Role, NormalizeError> {
    match fields.get("role") {
        None | Some(Value::Null) => Ok(defaults.role),
        Some(Value::String(role)) => role
            .parse()
            .map_err(NormalizeError::InvalidMessageShape),
        Some(_) => Err(NormalizeError::InvalidMessageShape(
            "'role' must be a string".into(),
        )),
    }
}

fn passthrough(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(key, _)| !CONSUMED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// Decode one content entry. Stray `text` on `tool_use` blocks is dropped
/// simply by never being read.
fn decode_block(entry: &Value) -> Result<ContentBlock, NormalizeError> {
    let fields = match entry {
        Value::String(text) => return Ok(ContentBlock::text(text.clone())),
        Value::Object(fields) => fields,
        _ => {
            return Err(NormalizeError::InvalidMessageShape(
                "each message content item must be a string or object".into(),
            ));
        }
    };

    let kind = match fields.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        None | Some(Value::Null) if str_field(fields, "text").is_some() => "text",
        None | Some(Value::Null) => {
            return Err(NormalizeError::InvalidMessageShape(
                "content block has neither a 'type' nor a string 'text'".into(),
            ));
        }
        Some(_) => {
            return Err(NormalizeError::InvalidMessageShape(
                "content block 'type' must be a string".into(),
            ));
        }
    };

    match kind {
        "text" => str_field(fields, "text")
            .map(ContentBlock::text)
            .ok_or_else(|| {
                NormalizeError::InvalidMessageShape("text block requires a string 'text'".into())
            }),
        "tool_use" => {
            let name = str_field(fields, "name")
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    NormalizeError::InvalidToolCall("tool_use block requires a 'name'".into())
                })?;
            Ok(ContentBlock::ToolUse {
                id: str_field(fields, "id").unwrap_or_default().to_string(),
                name: name.to_string(),
                input: fields
                    .get("input")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            })
        }
        "tool_result" => {
            let tool_use_id = str_field(fields, "tool_use_id").ok_or_else(|| {
                NormalizeError::InvalidMessageShape(
                    "tool_result block requires a 'tool_use_id'".into(),
                )
            })?;
            Ok(ContentBlock::ToolResult {
                tool_use_id: tool_use_id.to_string(),
                content: fields.get("content").cloned().unwrap_or(Value::Null),
                is_error: fields.get("is_error").and_then(Value::as_bool),
            })
        }
        "image" => {
            let source = fields.get("source").cloned().ok_or_else(|| {
                NormalizeError::InvalidMessageShape("image block requires a 'source'".into())
            })?;
            Ok(ContentBlock::Image {
                source,
                detail: parse_detail(fields.get("detail")),
            })
        }
        // OpenAI-style image parts: {type: "image_url", image_url: {url, detail}}
        "image_url" => {
            let source = fields.get("image_url").cloned().ok_or_else(|| {
                NormalizeError::InvalidMessageShape(
                    "image_url block requires an 'image_url'".into(),
                )
            })?;
            let detail = parse_detail(source.get("detail"));
            Ok(ContentBlock::Image { source, detail })
        }
        other => Err(NormalizeError::InvalidMessageShape(format!(
            "unsupported content block type '{other}'"
        ))),
    }
}

fn parse_detail(value: Option<&Value>) -> Option<ImageDetail> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Rewrite one OpenAI-style `tool_calls` entry into a `tool_use` block.
fn decode_tool_call(call: &Value) -> Result<ContentBlock, NormalizeError> {
    let fields = call.as_object().ok_or_else(|| {
        NormalizeError::InvalidToolCall("each tool call must be an object".into())
    })?;
    let function = fields
        .get("function")
        .and_then(Value::as_object)
        .ok_or_else(|| NormalizeError::InvalidToolCall("tool call is missing 'function'".into()))?;
    let name = str_field(function, "name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| NormalizeError::InvalidToolCall("tool call function has no name".into()))?;

    let input = match function.get("arguments") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Map::new()),
        Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
            NormalizeError::InvalidToolCall(format!(
                "arguments for '{name}' are not valid JSON: {e}"
            ))
        })?,
        Some(structured) => structured.clone(),
    };

    Ok(ContentBlock::ToolUse {
        id: str_field(fields, "id").unwrap_or_default().to_string(),
        name: name.to_string(),
        input,
    })
}

/// Normalize a sequence of raw messages, then split and merge.
pub fn normalize_messages(
    inputs: &[Value],
    defaults: &MessageDefaults,
) -> Result<Vec<CanonicalMessage>, NormalizeError> {
    let normalized = inputs
        .iter()
        .map(|input| normalize_single_message(input, defaults))
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge_same_role(split_blocks(normalized));
    debug!(
        input_count = inputs.len(),
        output_count = merged.len(),
        "Messages normalized"
    );
    Ok(merged)
}

/// One message per content block, role and passthrough fields preserved.
fn split_blocks(messages: Vec<CanonicalMessage>) -> Vec<CanonicalMessage> {
    let mut separated = Vec::with_capacity(messages.len());
    for message in messages {
        let CanonicalMessage {
            role,
            content,
            extra,
        } = message;
        for block in content {
            separated.push(CanonicalMessage {
                role,
                content: vec![block],
                extra: extra.clone(),
            });
        }
    }
    separated
}

/// Concatenate the content of consecutive same-role messages. The first
/// message of a run keeps its passthrough fields.
fn merge_same_role(messages: Vec<CanonicalMessage>) -> Vec<CanonicalMessage> {
    let mut merged: Vec<CanonicalMessage> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(last) if last.role == message.role => last.content.extend(message.content),
            _ => merged.push(message),
        }
    }
    merged
}

/// Partition into `(system, rest)`, preserving relative order in both.
pub fn extract_and_remove_system_messages(
    messages: Vec<CanonicalMessage>,
) -> (Vec<CanonicalMessage>, Vec<CanonicalMessage>) {
    messages.into_iter().partition(CanonicalMessage::is_system)
}

/// Flatten raw messages to a display string.
///
/// Fails with `NonTextContent` when an object `content` that is not
/// explicitly typed as something other than text lacks a string `text`.
pub fn extract_text(inputs: &[Value]) -> Result<String, NormalizeError> {
    let mut pieces = Vec::with_capacity(inputs.len());
    for input in inputs {
        let piece = text_of(input)?;
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }
    Ok(pieces.join(" "))
}

fn text_of(input: &Value) -> Result<String, NormalizeError> {
    let fields = match input {
        Value::String(text) => return Ok(text.clone()),
        Value::Object(fields) => fields,
        _ => return Ok(String::new()),
    };

    match fields.get("content") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.as_str()),
                Value::Object(block) if is_text_typed(block) => str_field(block, "text"),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")),
        Some(Value::Object(block)) if is_text_typed(block) => str_field(block, "text")
            .map(str::to_string)
            .ok_or_else(|| {
                NormalizeError::NonTextContent("text content must be a string".into())
            }),
        _ => Ok(String::new()),
    }
}

fn is_text_typed(block: &Map<String, Value>) -> bool {
    match block.get("type") {
        None | Some(Value::Null) => true,
        Some(kind) => kind.as_str() == Some("text"),
    }
}

/// Flatten canonical messages to a display string.
pub fn extract_canonical_text(messages: &[CanonicalMessage]) -> String {
    messages
        .iter()
        .map(CanonicalMessage::text_content)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> MessageDefaults {
        MessageDefaults::default()
    }

    fn renormalize(messages: &[CanonicalMessage]) -> Vec<CanonicalMessage> {
        let raw: Vec<Value> = messages
            .iter()
            .map(|m| serde_json::to_value(m).unwrap())
            .collect();
        normalize_messages(&raw, &defaults()).unwrap()
    }

    #[test]
    fn bare_string_becomes_text_block_with_default_role() {
        let msg = normalize_single_message(&json!("hello"), &defaults()).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, vec![ContentBlock::text("hello")]);

        let assistant = MessageDefaults {
            role: Role::Assistant,
        };
        let msg = normalize_single_message(&json!("hi"), &assistant).unwrap();
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn consecutive_same_role_messages_merge() {
        let raw = vec![
            json!({"role": "user", "content": "a"}),
            json!({"role": "user", "content": "b"}),
            json!({"role": "assistant", "content": "c"}),
        ];
        let out = normalize_messages(&raw, &defaults()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, Role::User);
        assert_eq!(
            out[0].content,
            vec![ContentBlock::text("a"), ContentBlock::text("b")]
        );
        assert_eq!(out[1].role, Role::Assistant);
        assert_eq!(out[1].content, vec![ContentBlock::text("c")]);
    }

    #[test]
    fn tool_calls_rewritten_into_tool_use_blocks() {
        let raw = json!({
            "role": "assistant",
            "tool_calls": [{"id": "1", "function": {"name": "f", "arguments": "{\"x\":1}"}}]
        });
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(
            msg.content,
            vec![ContentBlock::ToolUse {
                id: "1".into(),
                name: "f".into(),
                input: json!({"x": 1}),
            }]
        );
        assert!(!msg.extra.contains_key("tool_calls"));
        let wire = serde_json::to_value(&msg).unwrap();
        assert!(wire.get("tool_calls").is_none());
    }

    #[test]
    fn empty_content_with_tool_calls_is_rewritten() {
        let raw = json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [{"id": "c1", "type": "function", "function": {"name": "list_files", "arguments": {"path": "~"}}}]
        });
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        assert!(msg.has_tool_use());
        assert_eq!(msg.content.len(), 1);
    }

    #[test]
    fn content_with_tool_calls_keeps_both() {
        let raw = json!({
            "role": "assistant",
            "content": "Let me check that folder.",
            "tool_calls": [{"id": "c1", "type": "function", "function": {"name": "list_files", "arguments": "{\"path\":\"~/Documents\"}"}}]
        });
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        assert_eq!(
            msg.content,
            vec![
                ContentBlock::text("Let me check that folder."),
                ContentBlock::ToolUse {
                    id: "c1".into(),
                    name: "list_files".into(),
                    input: json!({"path": "~/Documents"}),
                },
            ]
        );
        assert!(!msg.extra.contains_key("tool_calls"));

        let once = normalize_messages(&[raw], &defaults()).unwrap();
        assert_eq!(once.len(), 1);
        assert!(once[0].has_tool_use());
        assert_eq!(renormalize(&once), once);
    }

    #[test]
    fn non_array_tool_calls_next_to_content_fail() {
        let raw = json!({"role": "assistant", "content": "hi", "tool_calls": {"id": "c1"}});
        let err = normalize_single_message(&raw, &defaults()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidMessageShape(_)));
    }

    #[test]
    fn malformed_tool_call_arguments_fail() {
        let raw = json!({
            "tool_calls": [{"id": "1", "function": {"name": "f", "arguments": "{not json"}}]
        });
        let err = normalize_single_message(&raw, &defaults()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidToolCall(_)));
    }

    #[test]
    fn object_without_content_or_tool_calls_fails() {
        let err = normalize_single_message(&json!({"role": "user"}), &defaults()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidMessageShape(_)));

        let err = normalize_single_message(&json!(42), &defaults()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidMessageShape(_)));
    }

    #[test]
    fn empty_content_array_rejected() {
        let err =
            normalize_single_message(&json!({"role": "user", "content": []}), &defaults())
                .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn unknown_role_rejected() {
        let err =
            normalize_single_message(&json!({"role": "robot", "content": "x"}), &defaults())
                .unwrap_err();
        assert!(err.to_string().contains("robot"));
    }

    #[test]
    fn non_array_content_is_wrapped_and_text_type_inferred() {
        let raw = json!({"role": "user", "content": {"text": "inferred"}});
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        assert_eq!(msg.content, vec![ContentBlock::text("inferred")]);
    }

    #[test]
    fn stray_text_on_tool_use_is_stripped() {
        let raw = json!({
            "role": "assistant",
            "content": [{"type": "tool_use", "id": "t1", "name": "read_file", "input": {"path": "a.md"}, "text": "let me read it"}]
        });
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        let wire = serde_json::to_value(&msg.content[0]).unwrap();
        assert_eq!(wire["type"], "tool_use");
        assert!(wire.get("text").is_none());
    }

    #[test]
    fn unsupported_block_type_rejected() {
        let raw = json!({"content": [{"type": "hologram", "data": 1}]});
        let err = normalize_single_message(&raw, &defaults()).unwrap_err();
        assert!(err.to_string().contains("hologram"));
    }

    #[test]
    fn openai_image_parts_decode_with_detail() {
        let raw = json!({
            "role": "user",
            "content": [
                "what is this?",
                {"type": "image_url", "image_url": {"url": "https://example.com/cat.png", "detail": "low"}}
            ]
        });
        let msg = normalize_single_message(&raw, &defaults()).unwrap();
        assert_eq!(msg.content.len(), 2);
        match &msg.content[1] {
            ContentBlock::Image { detail, source } => {
                assert_eq!(*detail, Some(ImageDetail::Low));
                assert_eq!(source["url"], "https://example.com/cat.png");
            }
            other => panic!("expected image block, got {other:?}"),
        }
    }

    #[test]
    fn split_preserves_passthrough_fields() {
        let raw = vec![json!({
            "role": "tool",
            "tool_call_id": "c1",
            "content": [
                {"type": "tool_result", "tool_use_id": "c1", "content": "ok"},
                {"type": "text", "text": "done"}
            ]
        })];
        let out = normalize_messages(&raw, &defaults()).unwrap();
        // split then merged back into one tool message
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content.len(), 2);
        assert_eq!(out[0].extra["tool_call_id"], "c1");
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = vec![
            json!("first"),
            json!({"role": "user", "content": ["second", {"text": "third"}]}),
            json!({"role": "assistant", "content": "", "tool_calls": [
                {"id": "a", "function": {"name": "create_folder", "arguments": "{\"path\":\"~/Projects\"}"}},
                {"id": "b", "function": {"name": "write_file", "arguments": "{}"}}
            ]}),
            json!({"role": "tool", "name": "create_folder", "content": [{"type": "tool_result", "tool_use_id": "a", "content": "ok"}]}),
            json!({"role": "system", "content": "be brief"}),
            json!({"role": "assistant", "content": [{"type": "image", "source": {"url": "x"}, "detail": "high"}]}),
        ];
        let once = normalize_messages(&raw, &defaults()).unwrap();
        let twice = renormalize(&once);
        assert_eq!(once, twice);
        assert_eq!(renormalize(&twice), twice);
    }

    #[test]
    fn system_messages_partitioned_in_order() {
        let messages = vec![
            CanonicalMessage::system("rule one"),
            CanonicalMessage::user("hi"),
            CanonicalMessage::system("rule two"),
            CanonicalMessage::assistant("hello"),
        ];
        let (system, rest) = extract_and_remove_system_messages(messages);
        assert_eq!(system.len(), 2);
        assert_eq!(system[0].text_content(), "rule one");
        assert_eq!(system[1].text_content(), "rule two");
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].role, Role::User);
    }

    #[test]
    fn extract_text_joins_with_single_spaces() {
        let raw = vec![
            json!("alpha"),
            json!({"content": "beta"}),
            json!({"content": [{"type": "text", "text": "gamma"}, {"type": "tool_use", "name": "x"}, "delta"]}),
            json!({"content": {"type": "image", "source": {}}}),
        ];
        assert_eq!(extract_text(&raw).unwrap(), "alpha beta gamma delta");
    }

    #[test]
    fn extract_text_rejects_untyped_object_without_text() {
        let raw = vec![json!({"content": {"text": 5}})];
        let err = extract_text(&raw).unwrap_err();
        assert!(matches!(err, NormalizeError::NonTextContent(_)));
    }

    #[test]
    fn canonical_text_flattening() {
        let messages = vec![
            CanonicalMessage::user("show me"),
            CanonicalMessage::assistant("here it is"),
        ];
        assert_eq!(extract_canonical_text(&messages), "show me here it is");
    }
}
