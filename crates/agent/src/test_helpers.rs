//! Shared test helpers: a scripted engine for loop and orchestrator tests.

use std::sync::Mutex;
use wardline_core::{
    Engine, EngineError, EngineRequest, EngineResponse, Message, MessageToolCall,
};

/// A mock engine that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue. With
/// `looping`, the last response repeats forever (useful for ceiling tests).
/// Panics if a non-looping mock runs out of responses.
pub struct SequentialMockEngine {
    responses: Mutex<Vec<EngineResponse>>,
    call_count: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
    looping: bool,
}

impl SequentialMockEngine {
    pub fn new(responses: Vec<EngineResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
            looping: false,
        }
    }

    /// A single text response, no tool calls.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![text_response(text)])
    }

    /// First a tool proposal, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, thought: &str, answer: &str) -> Self {
        Self::new(vec![tool_response(tool_calls, thought), text_response(answer)])
    }

    /// Repeat the last scripted response once the queue is exhausted.
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Last message content of the most recent request.
    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Engine for SequentialMockEngine {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        if let Some(message) = request.messages.last() {
            self.prompts.lock().unwrap().push(message.content.clone());
        }

        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        let index = if *count >= responses.len() {
            if !self.looping {
                panic!(
                    "SequentialMockEngine: no more responses (call #{}, have {})",
                    *count,
                    responses.len()
                );
            }
            responses.len() - 1
        } else {
            *count
        };

        let response = responses[index].clone();
        *count += 1;
        Ok(response)
    }
}

/// A plain text response.
pub fn text_response(text: &str) -> EngineResponse {
    EngineResponse {
        message: Message::assistant(text),
        model: "mock-model".into(),
    }
}

/// A response proposing tool calls, with optional thought content.
pub fn tool_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> EngineResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = tool_calls;
    EngineResponse {
        message: msg,
        model: "mock-model".into(),
    }
}

/// Build a tool call with serialized arguments.
pub fn tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}
