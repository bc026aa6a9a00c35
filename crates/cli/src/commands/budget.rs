//! `contextweave budget` — Model limits and budget partition.

use contextweave_agent::{BudgetComponent, ModelCatalog, TokenBudgetManager};
use contextweave_config::AppConfig;
use std::sync::Arc;

pub fn catalog(config: &AppConfig) -> Arc<ModelCatalog> {
    Arc::new(ModelCatalog::with_defaults().with_overrides(&config.models))
}

pub fn run(config: &AppConfig, model: Option<&str>) -> anyhow::Result<()> {
    let catalog = catalog(config);
    match model {
        Some(model) => show(config, catalog, model),
        None => list(&catalog),
    }
    Ok(())
}

fn list(catalog: &ModelCatalog) {
    println!("📐 Known Models");
    println!("─────────────────────────────────────────────────────────────");
    println!("{:<32} {:>10} {:>10}", "Model", "Context", "Output");
    println!("{:<32} {:>10} {:>10}", "─────", "───────", "──────");
    for name in catalog.models() {
        if let Some(limits) = catalog.lookup(name) {
            println!(
                "{:<32} {:>10} {:>10}",
                name, limits.context_window, limits.max_output_tokens
            );
        }
    }
}

fn show(config: &AppConfig, catalog: Arc<ModelCatalog>, model: &str) {
    let known = catalog.contains(model);
    let manager = TokenBudgetManager::with_config(model, catalog, config.budget.clone());
    let limits = manager.model_info();
    let budget = manager.budget();
    let input = budget.input_budget();

    println!("📐 {} ({model})", limits.name);
    println!("─────────────────────────────────────");
    if !known {
        println!("  ⚠️  Unknown model, using fallback limits");
    }
    println!("  Context window:  {}", limits.context_window);
    println!("  Response buffer: {}", budget.response_buffer);
    println!("  Input budget:    {input}");
    println!();
    for component in BudgetComponent::ALL {
        let slice = budget.slice(component);
        println!(
            "  {:<14} {:>8} ({:.1}%)",
            format!("{component}:"),
            slice,
            percent(slice, input)
        );
    }
    println!("  {:<14} {:>8}", "Allocated:", budget.allocated());
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextweave_config::ModelLimitsConfig;

    #[test]
    fn catalog_includes_config_rows() {
        let config = AppConfig {
            models: vec![ModelLimitsConfig {
                model: "house-model".into(),
                context_window: 10_000,
                max_output_tokens: 1000,
                name: None,
            }],
            ..Default::default()
        };
        let catalog = catalog(&config);
        assert!(catalog.contains("house-model"));
        assert!(catalog.contains("gpt-4o"));
    }

    #[test]
    fn percent_handles_empty_budget() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(15, 100), 15.0);
    }
}
