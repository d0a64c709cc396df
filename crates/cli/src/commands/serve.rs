//! `wardline serve` — Start the HTTP gateway.

use wardline_config::AppConfig;

pub async fn run(
    mut config: AppConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Wardline gateway");
    println!("  Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!("  Engine:     {} ({})", config.engine.api_url, config.engine.model);
    println!("  Retrieval:  {}", config.retrieval.backend);

    wardline_gateway::start(config).await?;

    Ok(())
}
