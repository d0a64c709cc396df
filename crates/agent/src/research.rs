//! The bounded research loop.
//!
//! Reason → act → observe, with a hard iteration ceiling. Each engine step
//! either proposes tool calls (executed, observations fed back) or returns
//! free text (the final answer). Every tool execution is appended to an
//! ordered audit trace regardless of outcome.
//!
//! The loop never panics and never propagates mid-loop failures: tool
//! errors become observations the engine can correct, engine failures and
//! the iteration ceiling produce a structured incomplete result.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wardline_core::{
    Engine, EngineRequest, Message, ToolCall, ToolCallRecord, ToolError, ToolRegistry,
};

const RESEARCH_SYSTEM_PROMPT: &str = "You are a hospital research assistant helping clinical staff \
answer questions that span patient records, nursing protocols, and pharmacy inventory.

Use the available tools to gather the facts you need. Call one tool at a time, read the result, \
and decide whether you need more information. When you have enough to answer confidently, reply \
with the final answer as plain text and no further tool calls.

Always check a patient's current medications and allergies before answering questions about drug \
interactions or new medications. Cite which lookups your answer is based on.";

/// Cap on how much of a tool result is kept in the audit trace.
const SUMMARY_LEN: usize = 200;

/// Where the loop is, and where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting on the engine for the next step.
    Reasoning,
    /// Executing proposed tool calls.
    Executing,
    /// Finished with a final answer.
    Done,
    /// Stopped at the ceiling or on an unreachable engine.
    Aborted,
}

/// The bounded reason-act-observe loop.
pub struct ResearchAgent {
    engine: Arc<dyn Engine>,
    model: String,
    tools: Arc<ToolRegistry>,
    max_iterations: u32,
    tool_timeout: Duration,
}

/// The outcome of one research invocation.
#[derive(Debug, Clone)]
pub struct ResearchResult {
    /// Final answer, or an explanation of why research stopped early.
    pub answer: String,

    /// Audit trace of every tool execution, in order.
    pub records: Vec<ToolCallRecord>,

    /// Reasoning steps consumed.
    pub iterations: usize,

    /// Terminal state: `Done` or `Aborted`.
    pub state: LoopState,

    /// False when the loop hit the ceiling or the engine became
    /// unreachable.
    pub complete: bool,
}

impl ResearchAgent {
    pub fn new(
        engine: Arc<dyn Engine>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        max_iterations: u32,
        tool_timeout_secs: u64,
    ) -> Self {
        Self {
            engine,
            model: model.into(),
            tools,
            max_iterations,
            tool_timeout: Duration::from_secs(tool_timeout_secs),
        }
    }

    /// Run the loop for one question.
    pub async fn run(&self, question: &str) -> ResearchResult {
        let declarations = self.tools.declarations();
        let mut messages = vec![
            Message::system(RESEARCH_SYSTEM_PROMPT),
            Message::user(question),
        ];
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut state = LoopState::Reasoning;

        info!(model = %self.model, max_iter = self.max_iterations, "Research loop starting");

        for iteration in 1..=self.max_iterations as usize {
            debug!(iteration, state = ?state, "Research iteration");

            let request = EngineRequest::new(&self.model, messages.clone())
                .with_tools(declarations.clone());

            let response = match self.engine.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, iteration, "Engine failed mid-loop");
                    return ResearchResult {
                        answer: format!(
                            "Research unavailable: the reasoning engine could not be \
                             reached ({e}). Please try again shortly."
                        ),
                        records,
                        iterations: iteration,
                        state: LoopState::Aborted,
                        complete: false,
                    };
                }
            };

            if !response.message.proposes_tools() {
                let answer = response.message.content.clone();
                info!(
                    iterations = iteration,
                    tool_calls = records.len(),
                    "Research loop completed"
                );
                return ResearchResult {
                    answer,
                    records,
                    iterations: iteration,
                    state: LoopState::Done,
                    complete: true,
                };
            }

            state = LoopState::Executing;

            // Engines sometimes propose several calls in one response. Only
            // the first is executed this step: one tool call per iteration
            // keeps the trace aligned with the reasoning steps, and the
            // engine re-proposes anything it still needs next time around.
            let mut assistant = response.message;
            if assistant.tool_calls.len() > 1 {
                debug!(
                    proposed = assistant.tool_calls.len(),
                    "Multiple tool calls proposed; executing the first"
                );
                assistant.tool_calls.truncate(1);
            }
            let proposal = assistant.tool_calls[0].clone();
            messages.push(assistant);

            let arguments: serde_json::Value =
                serde_json::from_str(&proposal.arguments).unwrap_or_default();

            let observation = self
                .execute_bounded(&ToolCall {
                    id: proposal.id.clone(),
                    name: proposal.name.clone(),
                    arguments: arguments.clone(),
                })
                .await;

            records.push(ToolCallRecord {
                iteration,
                tool: proposal.name,
                arguments,
                result_summary: summarize(&observation),
                timestamp: chrono::Utc::now(),
            });

            messages.push(Message::tool_result(&proposal.id, observation));
            state = LoopState::Reasoning;
        }

        warn!(
            max_iterations = self.max_iterations,
            "Research loop hit the iteration ceiling"
        );
        ResearchResult {
            answer: format!(
                "Research incomplete: I could not reach a confident answer within \
                 {} reasoning steps. The partial findings are in the call trace; \
                 try narrowing the question.",
                self.max_iterations
            ),
            records,
            iterations: self.max_iterations as usize,
            state: LoopState::Aborted,
            complete: false,
        }
    }

    /// Execute one tool call with the configured timeout. Failures come back
    /// as observation text, never as errors — the engine gets a chance to
    /// correct course.
    async fn execute_bounded(&self, call: &ToolCall) -> String {
        let timed = tokio::time::timeout(self.tool_timeout, self.tools.execute(call)).await;

        match timed {
            Ok(Ok(output)) => output.output,
            Ok(Err(e)) => format!("Error: {e}"),
            Err(_) => format!(
                "Error: {}",
                ToolError::Timeout {
                    tool_name: call.name.clone(),
                    timeout_secs: self.tool_timeout.as_secs(),
                }
            ),
        }
    }
}

/// Truncate an observation for the audit trace.
fn summarize(text: &str) -> String {
    if text.chars().count() <= SUMMARY_LEN {
        return text.to_string();
    }
    let truncated: String = text.chars().take(SUMMARY_LEN).collect();
    format!("{truncated}…")
}
