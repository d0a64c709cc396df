//! The orchestrator: one entry point from query to answer.
//!
//! Routing precedence, checked in order:
//! 1. explicit responder override from the caller;
//! 2. the priority-1 help gate;
//! 3. domain classification (role map, heuristic, engine fallback).
//!
//! Dispatch is a single exhaustive match over [`ResponderKind`], so a new
//! responder variant cannot be added without this module taking a position
//! on it. Every completed query is appended to its conversation session.

use crate::research::{ResearchAgent, ResearchResult};
use crate::responders::{help_text, DomainResponder};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use wardline_config::AppConfig;
use wardline_core::{
    Engine, EngineError, Language, Query, ResponderKind, RoutingDecision, SearchBackend,
    SessionId, ToolCallRecord,
};
use wardline_router::{detect, detect_role, DomainClassifier, DomainLexicon, HelpDetector};
use wardline_session::SessionStore;
use wardline_tools::research_registry;

/// A fully routed and answered query.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    /// Short form of the answer, at most the first two sentences.
    pub summary: String,
    pub responder: ResponderKind,
    pub decision: RoutingDecision,
    pub language: Language,
    pub session: SessionId,

    /// Sources of the passages the answer was grounded on; empty for the
    /// help and research responders.
    pub citations: Vec<String>,

    /// Tool audit trace; empty unless the research responder ran.
    pub records: Vec<ToolCallRecord>,

    /// False when research stopped at the ceiling or lost the engine.
    pub complete: bool,
}

/// Static description of one responder, for the discovery endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub tools: Vec<String>,
}

pub struct Orchestrator {
    engine: Arc<dyn Engine>,
    help: HelpDetector,
    classifier: DomainClassifier,
    nursing: DomainResponder,
    hr: DomainResponder,
    pharmacy: DomainResponder,
    research: ResearchAgent,
    sessions: Arc<SessionStore>,
    research_tools: Vec<String>,
}

impl Orchestrator {
    /// Wire the orchestrator from configuration and explicit backends.
    pub fn new(
        engine: Arc<dyn Engine>,
        config: &AppConfig,
        protocols: Arc<dyn SearchBackend>,
        policies: Arc<dyn SearchBackend>,
        inventory: Arc<dyn SearchBackend>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        // Config validation already constrains this to a domain label.
        let default_domain = ResponderKind::from_str(&config.routing.default_domain)
            .unwrap_or(ResponderKind::Hr);

        let classifier = DomainClassifier::new(
            DomainLexicon::default(),
            Arc::clone(&engine),
            &config.engine.model,
            default_domain,
        )
        .with_heuristic_margin(config.routing.heuristic_margin)
        .with_engine_timeout(std::time::Duration::from_secs(config.engine.timeout_secs));

        let registry = Arc::new(research_registry(
            Arc::clone(&protocols),
            Arc::clone(&inventory),
        ));
        let research_tools = registry.names().iter().map(|s| s.to_string()).collect();

        let research = ResearchAgent::new(
            Arc::clone(&engine),
            &config.engine.model,
            registry,
            config.research.max_iterations,
            config.research.tool_timeout_secs,
        );

        Self {
            help: HelpDetector::default(),
            classifier,
            nursing: DomainResponder::new(
                ResponderKind::Nursing,
                protocols,
                Arc::clone(&engine),
                &config.engine.model,
            ),
            hr: DomainResponder::new(
                ResponderKind::Hr,
                policies,
                Arc::clone(&engine),
                &config.engine.model,
            ),
            pharmacy: DomainResponder::new(
                ResponderKind::Pharmacy,
                inventory,
                Arc::clone(&engine),
                &config.engine.model,
            ),
            research,
            engine,
            sessions,
            research_tools,
        }
    }

    /// Route one query and produce an answer.
    pub async fn route(&self, query: Query) -> Answer {
        let language = detect(&query.text);

        let decision = if let Some(kind) = query.responder {
            RoutingDecision::overridden(kind)
        } else if self.help.is_help_query(&query.text) {
            RoutingDecision::help_detected()
        } else {
            self.classifier.classify(&query.text, query.role).await
        };

        info!(
            category = %decision.category,
            method = ?decision.method,
            language = %language,
            "Query routed"
        );

        // Prior turns give the domain responders follow-up context. A fresh
        // session simply has none.
        let session = query.session.clone().unwrap_or_default();
        let history = self.sessions.history(&session).await.unwrap_or_default();

        let (text, citations, records, complete) = match decision.category {
            ResponderKind::Help => {
                let role = query.role.unwrap_or_else(|| detect_role(&query.text));
                (help_text(role, language), Vec::new(), Vec::new(), true)
            }
            ResponderKind::Nursing => {
                let answer = self.nursing.answer(&query.text, &history).await;
                (answer.text, answer.citations, Vec::new(), true)
            }
            ResponderKind::Hr => {
                let answer = self.hr.answer(&query.text, &history).await;
                (answer.text, answer.citations, Vec::new(), true)
            }
            ResponderKind::Pharmacy => {
                let answer = self.pharmacy.answer(&query.text, &history).await;
                (answer.text, answer.citations, Vec::new(), true)
            }
            ResponderKind::Research => {
                let ResearchResult {
                    answer,
                    records,
                    complete,
                    ..
                } = self.research.run(&query.text).await;
                (answer, Vec::new(), records, complete)
            }
        };

        self.sessions
            .append_turn(&session, &query.text, &text, decision.category)
            .await;

        Answer {
            summary: summarize(&text),
            text,
            responder: decision.category,
            decision,
            language,
            session,
            citations,
            records,
            complete,
        }
    }

    /// Run the query through the research responder regardless of what the
    /// classifier would say.
    pub async fn research(&self, query: Query) -> Answer {
        self.route(query.with_responder(ResponderKind::Research)).await
    }

    /// Can we reach the reasoning engine?
    pub async fn health_check(&self) -> Result<bool, EngineError> {
        self.engine.health_check().await
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Static descriptions of every responder.
    pub fn agent_info(&self) -> Vec<AgentInfo> {
        vec![
            AgentInfo {
                name: "help",
                description: "Explains what the assistant can do, in the caller's language",
                tools: Vec::new(),
            },
            AgentInfo {
                name: "nursing",
                description: "Answers protocol and clinical-procedure questions from the \
                              nursing document set",
                tools: Vec::new(),
            },
            AgentInfo {
                name: "hr",
                description: "Answers leave, benefits, and policy questions from the HR \
                              document set",
                tools: Vec::new(),
            },
            AgentInfo {
                name: "pharmacy",
                description: "Answers stock and medication questions from the pharmacy \
                              inventory",
                tools: Vec::new(),
            },
            AgentInfo {
                name: "research",
                description: "Multi-step research across patients, protocols, and inventory",
                tools: self.research_tools.clone(),
            },
        ]
    }
}

/// First two sentences of the answer, for list views and logs.
fn summarize(text: &str) -> String {
    let mut end = text.len();
    let mut sentences = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            sentences += 1;
            if sentences == 2 {
                end = i + c.len_utf8();
                break;
            }
        }
    }
    let summary = text[..end].trim();
    if summary.is_empty() {
        text.chars().take(200).collect()
    } else {
        summary.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use wardline_core::{Confidence, RouteMethod, StaffRole};
    use wardline_retrieval::MemoryIndex;

    fn orchestrator(engine: Arc<SequentialMockEngine>) -> Orchestrator {
        Orchestrator::new(
            engine,
            &AppConfig::default(),
            Arc::new(MemoryIndex::nursing()),
            Arc::new(MemoryIndex::hr()),
            Arc::new(MemoryIndex::pharmacy()),
            Arc::new(SessionStore::new()),
        )
    }

    #[tokio::test]
    async fn help_query_is_answered_without_the_engine() {
        let engine = Arc::new(SequentialMockEngine::new(vec![]));
        let orchestrator = orchestrator(engine.clone());

        let answer = orchestrator
            .route(Query::new("How do I use this system?"))
            .await;

        assert_eq!(answer.responder, ResponderKind::Help);
        assert_eq!(answer.decision.priority, 1);
        assert_eq!(answer.decision.method, RouteMethod::HelpDetected);
        assert!(answer.text.contains("hospital staff assistant"));
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn help_answers_follow_query_language() {
        let engine = Arc::new(SequentialMockEngine::new(vec![]));
        let orchestrator = orchestrator(engine);

        let answer = orchestrator
            .route(Query::new("¿Cómo puedo usar esto?"))
            .await;

        assert_eq!(answer.responder, ResponderKind::Help);
        assert_eq!(answer.language, Language::Es);
        assert!(answer.text.contains("asistente"));
    }

    #[tokio::test]
    async fn stock_question_routes_to_pharmacy_by_keywords() {
        // One scripted response: the pharmacy synthesis call. The classifier
        // must not use the engine for this query.
        let engine = Arc::new(SequentialMockEngine::single_text(
            "Yes — ibuprofen 200 mg has 480 units in stock.",
        ));
        let orchestrator = orchestrator(engine.clone());

        let answer = orchestrator.route(Query::new("Is ibuprofen in stock?")).await;

        assert_eq!(answer.responder, ResponderKind::Pharmacy);
        assert_eq!(answer.decision.method, RouteMethod::Heuristic);
        assert!(answer.text.contains("480 units"));
        assert!(!answer.citations.is_empty());
        assert_eq!(engine.call_count(), 1, "only the synthesis call");
    }

    #[tokio::test]
    async fn declared_role_short_circuits_classification() {
        let engine = Arc::new(SequentialMockEngine::single_text(
            "Check capillary glucose before meals and at bedtime.",
        ));
        let orchestrator = orchestrator(engine.clone());

        let answer = orchestrator
            .route(Query::new("When should glucose be checked?").with_role(StaffRole::Nurse))
            .await;

        assert_eq!(answer.responder, ResponderKind::Nursing);
        assert_eq!(answer.decision.method, RouteMethod::RoleMapped);
        assert_eq!(answer.decision.confidence, Confidence::High);
        assert_eq!(engine.call_count(), 1, "only the synthesis call");
    }

    #[tokio::test]
    async fn explicit_override_beats_everything() {
        let engine = Arc::new(SequentialMockEngine::single_text("Done."));
        let orchestrator = orchestrator(engine);

        // The text would trip the help gate, but the override wins.
        let answer = orchestrator
            .route(Query::new("How do I use this system?").with_responder(ResponderKind::Research))
            .await;

        assert_eq!(answer.responder, ResponderKind::Research);
        assert_eq!(answer.decision.method, RouteMethod::Override);
        assert_eq!(answer.decision.confidence, Confidence::Explicit);
    }

    #[tokio::test]
    async fn research_answer_carries_the_tool_trace() {
        let engine = Arc::new(SequentialMockEngine::tool_then_answer(
            vec![tool_call(
                "patient_lookup",
                serde_json::json!({"patient_name": "Juan de Marco"}),
            )],
            "Checking current medications and allergies.",
            "Juan de Marco has a penicillin allergy; amoxicillin is contraindicated. \
             Consult pharmacy for a macrolide alternative.",
        ));
        let orchestrator = orchestrator(engine);

        let answer = orchestrator
            .research(Query::new("Can Juan de Marco take amoxicillin?"))
            .await;

        assert!(answer.complete);
        assert_eq!(answer.records.len(), 1);
        assert_eq!(answer.records[0].tool, "patient_lookup");
        assert!(answer.text.contains("penicillin"));
    }

    #[tokio::test]
    async fn follow_up_in_a_session_sees_the_prior_turn() {
        let engine = Arc::new(SequentialMockEngine::new(vec![
            text_response("Yes — ibuprofen 200 mg has 480 units in stock."),
            text_response("The 400 mg tablets: 220 units, dispensary only."),
        ]));
        let orchestrator = orchestrator(engine.clone());
        let session = SessionId::from("shift-7");

        orchestrator
            .route(Query::new("Is ibuprofen in stock?").with_session(session.clone()))
            .await;

        let answer = orchestrator
            .route(
                Query::new("What about the 400 mg tablets?")
                    .with_role(StaffRole::Pharmacist)
                    .with_session(session),
            )
            .await;

        assert!(answer.text.contains("220 units"));
        let prompt = engine.last_prompt();
        assert!(prompt.contains("Conversation so far"));
        assert!(prompt.contains("480 units"), "prior answer feeds the follow-up");
    }

    #[tokio::test]
    async fn every_answer_lands_in_its_session() {
        let engine = Arc::new(SequentialMockEngine::new(vec![]));
        let orchestrator = orchestrator(engine);
        let session = SessionId::from("shift-42");

        let answer = orchestrator
            .route(Query::new("help me use the system").with_session(session.clone()))
            .await;

        assert_eq!(answer.session, session);
        let turns = orchestrator.sessions().history(&session).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].responder, ResponderKind::Help);
    }

    #[tokio::test]
    async fn ambiguous_query_with_engine_down_degrades_to_default() {
        struct DownEngine;

        #[async_trait::async_trait]
        impl Engine for DownEngine {
            fn name(&self) -> &str {
                "down"
            }
            async fn complete(
                &self,
                _r: wardline_core::EngineRequest,
            ) -> Result<wardline_core::EngineResponse, EngineError> {
                Err(EngineError::Unavailable("down".into()))
            }
        }

        let orchestrator = Orchestrator::new(
            Arc::new(DownEngine),
            &AppConfig::default(),
            Arc::new(MemoryIndex::nursing()),
            Arc::new(MemoryIndex::hr()),
            Arc::new(MemoryIndex::pharmacy()),
            Arc::new(SessionStore::new()),
        );

        let answer = orchestrator.route(Query::new("What should I do?")).await;

        // Default domain is hr; the hr responder then also degrades.
        assert_eq!(answer.responder, ResponderKind::Hr);
        assert_eq!(answer.decision.method, RouteMethod::Fallback);
        assert_eq!(answer.decision.confidence, Confidence::Low);
        assert!(!answer.text.is_empty());
    }

    #[test]
    fn summaries_stop_after_two_sentences() {
        let text = "First sentence. Second sentence! Third sentence.";
        assert_eq!(summarize(text), "First sentence. Second sentence!");

        let short = "No terminator here";
        assert_eq!(summarize(short), "No terminator here");
    }

    #[test]
    fn agent_info_lists_all_responders() {
        let orchestrator = orchestrator(Arc::new(SequentialMockEngine::new(vec![])));
        let info = orchestrator.agent_info();

        let names: Vec<_> = info.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["help", "nursing", "hr", "pharmacy", "research"]);

        let research = info.last().unwrap();
        assert_eq!(research.tools.len(), 3);
    }
}
