//! `contextweave assemble` — Run a full turn from a JSON fixture.
//!
//! A fixture carries the turn input plus the account state to seed an
//! in-memory store with:
//!
//! ```json
//! {
//!   "account": "acct-1",
//!   "model": "gpt-4o",
//!   "system_prompt": "You are a file assistant.",
//!   "messages": ["show the quarterly budget"],
//!   "tools": [{"name": "read_file"}],
//!   "files": [{"path": "reports/budget.md", "content_text": "..."}],
//!   "actions": [{"toolName": "create_folder", "path": "~/Projects"}]
//! }
//! ```

use anyhow::Context;
use contextweave_agent::{AssembledTurn, ProviderFormat, TurnAssembler, TurnInput};
use contextweave_config::AppConfig;
use contextweave_core::{FileHit, IsolationScope, RecentAction};
use contextweave_retrieval::ContextRetriever;
use contextweave_store::InMemoryContextStore;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default = "default_account")]
    pub account: String,
    /// Overrides the configured default model.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(flatten)]
    pub input: TurnInput,
    #[serde(default)]
    pub files: Vec<FileHit>,
    #[serde(default)]
    pub actions: Vec<RecentAction>,
}

fn default_account() -> String {
    "local".into()
}

pub fn load_fixture(path: &Path) -> anyhow::Result<Fixture> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid fixture {}", path.display()))
}

/// Seed an in-memory store from the fixture and assemble its turn.
pub async fn assemble_fixture(config: &AppConfig, fixture: Fixture) -> anyhow::Result<AssembledTurn> {
    let store = Arc::new(InMemoryContextStore::new());
    let scope = IsolationScope::new(fixture.account.as_str())?;
    for file in fixture.files {
        store.insert_file(&scope, file).await;
    }
    if !fixture.actions.is_empty() {
        store.record_actions(&scope, &fixture.actions).await?;
    }

    let retriever = ContextRetriever::new(store, fixture.account, config.retrieval.clone())?;
    let mut assembler = TurnAssembler::from_config(config).with_retriever(retriever);
    if let Some(model) = fixture.model {
        assembler = assembler.with_model(model);
    }

    Ok(assembler.assemble(fixture.input).await?)
}

pub async fn run(
    config: &AppConfig,
    file: &Path,
    format: ProviderFormat,
    json: bool,
) -> anyhow::Result<()> {
    let fixture = load_fixture(file)?;
    let turn = assemble_fixture(config, fixture).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turn)?);
        return Ok(());
    }

    println!("🧵 Turn {}", turn.turn_id);
    println!("─────────────────────────────────────");
    println!("  Model:       {} ({})", turn.model_info.name, turn.model);
    println!("  Messages:    {} ({} pruned)", turn.messages.len(), turn.pruned_messages);
    println!("  Tools:       {}", turn.tools.len());
    println!("  Chunks:      {}", turn.chunks.len());
    println!(
        "  Scaffold:    {}",
        if turn.cognitive.is_empty() { "none" } else { "injected" }
    );
    println!(
        "  Tokens:      {}/{} ({:.1}%)",
        turn.usage.total,
        turn.budget.input_budget(),
        turn.usage.utilization_percent
    );
    if turn.critical {
        println!("  ⛔ Context usage critical");
    } else if turn.approaching_limit {
        println!("  ⚠️  Approaching context limit");
    }

    println!();
    println!("── System prompt ──");
    println!("{}", turn.system_prompt());
    println!();
    println!("── Messages ──");
    println!("{}", serde_json::to_string_pretty(&turn.messages)?);
    if !turn.tools.is_empty() {
        println!();
        println!("── Tools ({}) ──", format.as_str());
        println!("{}", serde_json::to_string_pretty(&turn.tools_payload(format)?)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextweave_retrieval::ChunkSource;

    fn fixture(value: serde_json::Value) -> Fixture {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn fixture_defaults() {
        let f = fixture(serde_json::json!({"messages": ["hi"]}));
        assert_eq!(f.account, "local");
        assert!(f.model.is_none());
        assert_eq!(f.input.messages.len(), 1);
        assert!(f.files.is_empty());
    }

    #[tokio::test]
    async fn seeded_files_and_actions_are_retrieved() {
        let f = fixture(serde_json::json!({
            "account": "acct-9",
            "model": "gpt-4o",
            "messages": ["check the quarterly budget projects"],
            "files": [{"path": "reports/budget.md", "content_text": "Quarterly budget is on track"}],
            "actions": [{"toolName": "create_folder", "summary": "Created Projects", "path": "~/Projects"}],
        }));

        let turn = assemble_fixture(&AppConfig::default(), f).await.unwrap();
        assert_eq!(turn.model, "gpt-4o");
        assert!(turn.chunks.iter().any(|c| c.source == ChunkSource::File));
        assert!(turn.chunks.iter().any(|c| c.source == ChunkSource::Action));
    }

    #[tokio::test]
    async fn blank_account_is_rejected() {
        let f = fixture(serde_json::json!({"account": " ", "messages": ["hi"]}));
        assert!(assemble_fixture(&AppConfig::default(), f).await.is_err());
    }

    #[test]
    fn load_fixture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turn.json");
        std::fs::write(&path, r#"{"model": "llava", "messages": ["hello"]}"#).unwrap();
        let f = load_fixture(&path).unwrap();
        assert_eq!(f.model.as_deref(), Some("llava"));

        std::fs::write(&path, "not json").unwrap();
        assert!(load_fixture(&path).is_err());
    }
}
