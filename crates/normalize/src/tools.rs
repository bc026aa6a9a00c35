//! Tool schema normalization and per-provider re-serialization.

use contextweave_core::error::NormalizeError;
use contextweave_core::tool::NormalizedTool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

/// OpenAI `tools` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: OpenAiFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiFunction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Claude `tools` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaudeTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Where a raw tool definition's fields live.
enum ToolShape<'a> {
    /// `{name, description, input_schema}`, read as a whole
    Claude(&'a Map<String, Value>),
    /// `{type: "function", function: {...}}`, read from `.function`
    OpenAi(&'a Map<String, Value>),
    /// A bare function definition
    Bare(&'a Map<String, Value>),
}

impl<'a> ToolShape<'a> {
    fn classify(raw: &'a Value) -> Result<Self, NormalizeError> {
        let fields = raw.as_object().ok_or_else(|| {
            NormalizeError::InvalidToolShape("each tool must be an object".into())
        })?;

        if fields.contains_key("input_schema") {
            return Ok(Self::Claude(fields));
        }
        if fields.get("type").and_then(Value::as_str) == Some("function") {
            let function = fields
                .get("function")
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    NormalizeError::InvalidToolShape(
                        "function tool requires an object 'function'".into(),
                    )
                })?;
            return Ok(Self::OpenAi(function));
        }
        Ok(Self::Bare(fields))
    }

    fn definition(&self) -> &'a Map<String, Value> {
        match self {
            Self::Claude(def) | Self::OpenAi(def) | Self::Bare(def) => def,
        }
    }
}

/// Decode tool definitions from either provider convention.
///
/// Pure: the input is only read, never modified.
pub fn normalize_tools_object(tools: &[Value]) -> Result<Vec<NormalizedTool>, NormalizeError> {
    let normalized = tools
        .iter()
        .map(normalize_tool)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = normalized.len(), "Tools normalized");
    Ok(normalized)
}

fn normalize_tool(raw: &Value) -> Result<NormalizedTool, NormalizeError> {
    let def = ToolShape::classify(raw)?.definition();

    let name = def
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| NormalizeError::InvalidToolShape("tool requires a non-empty 'name'".into()))?;

    let description = def
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    let parameters = match ["parameters", "input_schema"]
        .iter()
        .find_map(|key| def.get(*key).filter(|v| !v.is_null()))
    {
        None => json!({"type": "object", "properties": {}}),
        Some(Value::Object(schema)) => {
            let mut schema = schema.clone();
            match schema.get("type") {
                None | Some(Value::Null) => {
                    schema.insert("type".into(), Value::String("object".into()));
                }
                Some(kind) if kind.as_str() == Some("object") => {}
                Some(kind) => {
                    return Err(NormalizeError::InvalidToolShape(format!(
                        "parameters of tool '{name}' must have type 'object', got {kind}"
                    )));
                }
            }
            normalize_json_schema(&Value::Object(schema))
        }
        Some(_) => {
            return Err(NormalizeError::InvalidToolShape(format!(
                "parameters of tool '{name}' must be an object"
            )));
        }
    };

    Ok(NormalizedTool::new(name, description, parameters))
}

/// Give every `array` node an `items` schema, recursing through object
/// properties and array items. Returns a new value.
pub fn normalize_json_schema(schema: &Value) -> Value {
    let mut out = schema.clone();
    normalize_node(&mut out);
    out
}

fn normalize_node(node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for subschema in properties.values_mut() {
            normalize_node(subschema);
        }
    }

    if has_type(map, "array") {
        match map.get_mut("items") {
            None | Some(Value::Null) => {
                map.insert("items".into(), json!({"type": "string"}));
            }
            // tuple form
            Some(Value::Array(items)) => items.iter_mut().for_each(normalize_node),
            Some(items) => normalize_node(items),
        }
    }
}

/// `type` equal to `kind`, or a union list containing it.
fn has_type(map: &Map<String, Value>, kind: &str) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == kind,
        Some(Value::Array(union)) => union.iter().any(|t| t.as_str() == Some(kind)),
        _ => false,
    }
}

pub fn make_openai_tools(tools: &[NormalizedTool]) -> Vec<OpenAiTool> {
    tools
        .iter()
        .map(|tool| OpenAiTool {
            kind: "function".into(),
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        })
        .collect()
}

/// `None` in, `None` out.
pub fn make_claude_tools(tools: Option<&[NormalizedTool]>) -> Option<Vec<ClaudeTool>> {
    tools.map(|tools| {
        tools
            .iter()
            .map(|tool| ClaudeTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.parameters.clone(),
            })
            .collect()
    })
}
