//! OpenAI-compatible HTTP engine.
//!
//! Works with any endpoint exposing `/v1/chat/completions`: OpenAI, the
//! Gemini compatibility layer, Ollama, vLLM. Non-streaming only — every
//! reasoning step in the routing and research paths is a single
//! request/response exchange.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wardline_config::EngineConfig;
use wardline_core::{
    Engine, EngineError, EngineRequest, EngineResponse, Message, MessageToolCall, Role,
    ToolDeclaration,
};

/// An OpenAI-compatible reasoning engine client.
pub struct HttpEngine {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpEngine {
    /// Create an engine client for the given endpoint.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from the `[engine]` configuration section.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        Self::new(
            "http",
            &config.api_url,
            config.api_key.as_deref().unwrap_or(""),
            config.timeout_secs,
        )
    }

    /// Convert our message types to the chat-completions wire format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "tool".into(),
                },
                content: Some(m.content.clone()),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.clone(),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool declarations to the wire format.
    fn to_api_tools(tools: &[ToolDeclaration]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    fn map_transport_error(e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout(e.to_string())
        } else {
            EngineError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl Engine for HttpEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        debug!(engine = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(EngineError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(EngineError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Engine returned error");
            return Err(EngineError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(format!("failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::MalformedResponse("no choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            tool_call_id: None,
            timestamp: chrono::Utc::now(),
        };

        Ok(EngineResponse {
            message,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> Result<bool, EngineError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- Wire types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HttpEngine {
        HttpEngine::new("http", "http://localhost:11434/v1/", "test-key", 60).unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let engine = engine();
        assert_eq!(engine.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn from_config_defaults() {
        let config = EngineConfig::default();
        let engine = HttpEngine::from_config(&config).unwrap();
        assert_eq!(engine.name(), "http");
    }

    #[test]
    fn message_conversion() {
        let messages = vec![
            Message::system("You are a hospital staff assistant"),
            Message::user("Is ibuprofen in stock?"),
        ];
        let api_messages = HttpEngine::to_api_messages(&messages);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, "system");
        assert_eq!(api_messages[1].role, "user");
    }

    #[test]
    fn message_conversion_with_tool_calls() {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "patient_lookup".into(),
            arguments: r#"{"patient_name":"Juan de Marco"}"#.into(),
        }];
        let api_msgs = HttpEngine::to_api_messages(&[msg]);
        let tc = api_msgs[0].tool_calls.as_ref().unwrap();
        assert_eq!(tc.len(), 1);
        assert_eq!(tc[0].function.name, "patient_lookup");
        assert_eq!(tc[0].r#type, "function");
    }

    #[test]
    fn message_conversion_tool_result() {
        let msg = Message::tool_result("call_1", "{\"age\": 65}");
        let api_msgs = HttpEngine::to_api_messages(&[msg]);
        assert_eq!(api_msgs[0].role, "tool");
        assert_eq!(api_msgs[0].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn tool_declaration_conversion() {
        let tools = vec![ToolDeclaration {
            name: "protocol_search".into(),
            description: "Search nursing protocols".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        }];
        let api_tools = HttpEngine::to_api_tools(&tools);
        assert_eq!(api_tools.len(), 1);
        assert_eq!(api_tools[0].function.name, "protocol_search");
        assert_eq!(api_tools[0].r#type, "function");
    }

    #[test]
    fn parse_completion_with_tool_call() {
        let data = r#"{
            "model": "gemini-2.5-flash",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "inventory_search",
                            "arguments": "{\"medication\":\"ibuprofen\"}"
                        }
                    }]
                }
            }]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let tc = &parsed.choices[0].message.tool_calls.as_ref().unwrap()[0];
        assert_eq!(tc.function.name, "inventory_search");
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn parse_plain_text_completion() {
        let data = r#"{
            "model": "gemini-2.5-flash",
            "choices": [{
                "message": { "role": "assistant", "content": "pharmacy" }
            }]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("pharmacy")
        );
        assert!(parsed.choices[0].message.tool_calls.is_none());
    }
}
