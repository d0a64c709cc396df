//! `wardline ask` — Route a single question from the terminal.

use std::str::FromStr;
use wardline_config::AppConfig;
use wardline_core::{Query, StaffRole};

pub async fn run(
    config: AppConfig,
    text: String,
    role: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = super::build_orchestrator(&config)?;

    let mut query = Query::new(text);
    if let Some(role) = role {
        query = query.with_role(StaffRole::from_str(&role)?);
    }

    let answer = orchestrator.route(query).await;

    println!("{}", answer.text);
    if !answer.citations.is_empty() {
        println!();
        println!("Sources: {}", answer.citations.join(", "));
    }
    println!();
    println!(
        "  [{} · {:?} · {:?} confidence · {}]",
        answer.responder, answer.decision.method, answer.decision.confidence, answer.language
    );

    Ok(())
}
