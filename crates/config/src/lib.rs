//! Configuration loading and validation for Wardline.
//!
//! Loads configuration from a TOML file with environment variable overrides.
//! Every field has a serde default so a missing or partial file still yields
//! a runnable configuration. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Reasoning engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Routing and classification settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Research loop settings
    #[serde(default)]
    pub research: ResearchConfig,

    /// Conversation session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Retrieval backend settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("engine", &self.engine)
            .field("routing", &self.routing)
            .field("research", &self.research)
            .field("session", &self.session)
            .field("gateway", &self.gateway)
            .field("retrieval", &self.retrieval)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint
    #[serde(default = "default_engine_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Bound on every single engine call (classification fallback and each
    /// reasoning step alike)
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
}

fn default_engine_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_engine_timeout() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: default_engine_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_engine_timeout(),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Domain used when classification cannot resolve confidently
    /// ("nursing", "hr", or "pharmacy")
    #[serde(default = "default_domain")]
    pub default_domain: String,

    /// Keyword-score margin required to accept the heuristic without
    /// consulting the engine
    #[serde(default = "default_heuristic_margin")]
    pub heuristic_margin: u32,
}

fn default_domain() -> String {
    "hr".into()
}
fn default_heuristic_margin() -> u32 {
    2
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_domain: default_domain(),
            heuristic_margin: default_heuristic_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Iteration ceiling for the research loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Bound on each tool execution
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_tool_timeout() -> u64 {
    30
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle longer than this are eligible for the sweep
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
}

fn default_idle_timeout() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// "memory" for the seeded demo index, "http" for remote backends
    #[serde(default = "default_retrieval_backend")]
    pub backend: String,

    /// Per-domain search endpoints, used when backend = "http"
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
}

fn default_retrieval_backend() -> String {
    "memory".into()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
            endpoints: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment
    /// overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults + environment overrides, for running without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WARDLINE_API_KEY") {
            self.engine.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("WARDLINE_ENGINE_URL") {
            self.engine.api_url = url;
        }
        if let Ok(model) = std::env::var("WARDLINE_MODEL") {
            self.engine.model = model;
        }
        if let Ok(port) = std::env::var("WARDLINE_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
    }

    /// Validate all settings. Called at startup so misconfiguration fails
    /// fast instead of surfacing mid-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.research.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "research.max_iterations must be at least 1".into(),
            ));
        }
        if !matches!(self.routing.default_domain.as_str(), "nursing" | "hr" | "pharmacy") {
            return Err(ConfigError::Invalid(format!(
                "routing.default_domain must be nursing, hr, or pharmacy (got '{}')",
                self.routing.default_domain
            )));
        }
        if !matches!(self.retrieval.backend.as_str(), "memory" | "http") {
            return Err(ConfigError::Invalid(format!(
                "retrieval.backend must be memory or http (got '{}')",
                self.retrieval.backend
            )));
        }
        if self.engine.timeout_secs == 0 || self.research.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.research.max_iterations, 10);
        assert_eq!(config.routing.default_domain, "hr");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[research]\nmax_iterations = 5\n\n[gateway]\nport = 9000"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.research.max_iterations, 5);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.engine.model, "gemini-2.5-flash");
    }

    #[test]
    fn zero_iterations_rejected() {
        let config = AppConfig {
            research: ResearchConfig {
                max_iterations: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_default_domain_rejected() {
        let config = AppConfig {
            routing: RoutingConfig {
                default_domain: "billing".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            engine: EngineConfig {
                api_key: Some("super-secret".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
