//! `contextweave normalize` — Canonical messages and tool payloads.

use anyhow::Context;
use contextweave_agent::budget::token;
use contextweave_normalize::{
    MessageDefaults, make_claude_tools, make_openai_tools, normalize_messages,
    normalize_tools_object,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct NormalizeInput {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub tools: Vec<Value>,
}

/// Normalize `input` into a report with canonical messages, both tool
/// payloads, and token estimates.
pub fn normalize_report(input: &NormalizeInput) -> anyhow::Result<Value> {
    let messages = normalize_messages(&input.messages, &MessageDefaults::default())?;
    let tools = normalize_tools_object(&input.tools)?;

    Ok(json!({
        "messages": messages,
        "tools": {
            "openai": make_openai_tools(&tools),
            "claude": make_claude_tools(Some(&tools)),
        },
        "tokens": {
            "messages": token::estimate_messages_tokens(&messages),
            "tools": token::estimate_tools_tokens(&tools),
        },
    }))
}

pub fn run(file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let input: NormalizeInput = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a {{messages, tools}} object", file.display()))?;

    let report = normalize_report(&input)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
