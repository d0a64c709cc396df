//! Command implementations and shared wiring.

pub mod ask;
pub mod research;
pub mod serve;

use std::path::Path;
use std::sync::Arc;
use wardline_agent::Orchestrator;
use wardline_config::AppConfig;
use wardline_engines::HttpEngine;
use wardline_retrieval::MemoryIndex;
use wardline_session::SessionStore;

/// Load configuration from an explicit path, or defaults plus environment
/// overrides when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load(path)
            .map_err(|e| format!("failed to load config from {}: {e}", path.display()))?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Build an orchestrator with the seeded in-memory indexes, for the
/// terminal commands. The gateway builds its own (possibly HTTP-backed)
/// retrieval stack.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let engine = Arc::new(HttpEngine::from_config(&config.engine)?);
    Ok(Orchestrator::new(
        engine,
        config,
        Arc::new(MemoryIndex::nursing()),
        Arc::new(MemoryIndex::hr()),
        Arc::new(MemoryIndex::pharmacy()),
        Arc::new(SessionStore::new()),
    ))
}
