//! `wardline research` — Run the research loop and print the tool trace.

use wardline_config::AppConfig;
use wardline_core::Query;

pub async fn run(config: AppConfig, text: String) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = super::build_orchestrator(&config)?;

    let answer = orchestrator.research(Query::new(text)).await;

    if !answer.records.is_empty() {
        println!("Tool trace:");
        for record in &answer.records {
            println!(
                "  {}. {}({})",
                record.iteration,
                record.tool,
                serde_json::to_string(&record.arguments).unwrap_or_default()
            );
            println!("     → {}", record.result_summary);
        }
        println!();
    }

    println!("{}", answer.text);
    if !answer.complete {
        std::process::exit(2);
    }

    Ok(())
}
