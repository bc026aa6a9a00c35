//! `contextweave analyze` — Complexity scoring and cognitive scaffold.

use contextweave_agent::CognitiveToolkit;
use contextweave_agent::cognitive::estimate_steps;
use contextweave_config::AppConfig;
use contextweave_core::cognitive::TaskContext;

pub fn run(config: &AppConfig, message: &str, minimal: bool) -> anyhow::Result<()> {
    let toolkit = CognitiveToolkit::new(config.cognitive.clone());
    let ctx = TaskContext::new(message);

    let complexity = toolkit.analyze_complexity(&ctx);
    let active = toolkit.should_activate(&ctx);

    println!("🧠 Task Analysis");
    println!("─────────────────────────────────────");
    println!("  Complexity:  {complexity}/10");
    println!("  Threshold:   {}", toolkit.config().complexity_threshold);
    println!("  Steps:       {}", estimate_steps(message));
    println!("  Scaffold:    {}", if active { "active" } else { "inactive" });

    for result in toolkit.analyze_task(&ctx) {
        println!("  {:<11}  {}", format!("{}:", result.tool.tag()), result.output);
        if !result.metadata.entities_found.is_empty() {
            println!("  Entities:    {}", result.metadata.entities_found.join(", "));
        }
    }

    let scaffold = if minimal {
        toolkit.build_minimal_cognitive_prompt(&ctx)
    } else {
        toolkit.build_cognitive_prompt(&ctx)
    };
    if !scaffold.is_empty() {
        println!();
        println!("{scaffold}");
    }

    Ok(())
}
