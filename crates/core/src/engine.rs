//! Engine trait — the abstraction over the reasoning-engine service.
//!
//! One opaque network call per reasoning step: given a history and a set of
//! schema-typed tools, the engine either names one tool with arguments or
//! returns free text. Classification fallback and the research loop both go
//! through this trait, which is what makes them testable with a scripted
//! mock.

use crate::error::EngineError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tool made visible to the engine.
///
/// Registered once at process start; read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Unique tool name
    pub name: String,

    /// Natural-language description sent to the engine
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// One reasoning step request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    pub model: String,

    /// Ordered history: system instruction, user query, prior proposals,
    /// prior observations.
    pub messages: Vec<Message>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the engine may call; empty for plain completions
    /// (classification, grounded synthesis).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclaration>,
}

fn default_temperature() -> f32 {
    0.1
}

impl EngineRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A complete response from the engine: either a tool proposal or a text
/// answer, never both interpreted at once — `message.proposes_tools()`
/// decides which.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub message: Message,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// The core Engine trait.
///
/// The HTTP implementation lives in `wardline-engines`; tests use a
/// scripted sequential mock.
#[async_trait]
pub trait Engine: Send + Sync {
    /// A human-readable name for this engine backend.
    fn name(&self) -> &str;

    /// Run one reasoning step.
    async fn complete(&self, request: EngineRequest) -> Result<EngineResponse, EngineError>;

    /// Health check — can we reach the engine?
    async fn health_check(&self) -> Result<bool, EngineError> {
        Ok(true)
    }
}
