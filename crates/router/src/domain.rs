//! Priority-2 domain classification.
//!
//! Resolution order, short-circuiting on the first hit:
//! 1. declared role maps straight to a domain (no network call);
//! 2. keyword heuristic over the lexicon, accepted when one domain wins by
//!    a configured margin;
//! 3. engine fallback with a constrained single-label prompt.
//!
//! Classification never fails: engine errors, timeouts, and unparsable
//! labels all degrade to the configured default domain with low confidence.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wardline_core::{
    Confidence, Engine, EngineRequest, Message, ResponderKind, RouteMethod, RoutingDecision,
    StaffRole,
};

const CLASSIFICATION_PROMPT: &str = "Analyze the following query and classify it into ONE category:

Categories:
- nursing: Medical procedures, nursing protocols, patient care, clinical procedures, IV insertion, wound care, medication administration, vital signs
- hr: Holidays, vacation, benefits, HR policies, employment questions, workplace policies, leave requests, sick leave, parental leave, time off
- pharmacy: Medications, drug inventory, prescriptions, pharmaceutical information, medication availability, drug storage, controlled substances

Examples:
- \"How do I insert an IV?\" -> nursing
- \"How many vacation days do I have?\" -> hr
- \"Is ibuprofen available?\" -> pharmacy
- \"¿Cuántos días festivos tenemos?\" -> hr
- \"Ist Paracetamol auf Lager?\" -> pharmacy

Query: {query}

Respond with ONLY the category name: nursing, hr, or pharmacy
No explanation, just the category word.";

/// Keyword sets for the fast heuristic. Constructed explicitly so tests can
/// substitute smaller sets; `Default` carries the curated cross-language
/// vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainLexicon {
    pub nursing: Vec<String>,
    pub hr: Vec<String>,
    pub pharmacy: Vec<String>,
}

impl Default for DomainLexicon {
    fn default() -> Self {
        let nursing = [
            "iv", "intravenous", "vía", "wound", "herida", "dressing", "apósito", "patient",
            "paciente", "procedure", "procedimiento", "protocol", "protocolo", "nursing",
            "enfermería", "vital signs", "signos vitales", "medication administration", "curar",
            "cuidado", "insertar", "glucose", "blood pressure",
        ];
        let hr = [
            "vacation", "holiday", "leave", "congé", "vacances", "días", "jours", "benefits",
            "policy", "policies", "employee", "empleado", "sick leave", "parental", "time off",
            "avantages", "urlaub", "ferien", "politique", "beneficios",
        ];
        let pharmacy = [
            "medication", "drug", "pharmacy", "stock", "inventory", "available", "ibuprofen",
            "acetaminophen", "paracetamol", "insulin", "antibiotic", "oxycodone", "medikament",
            "apotheke", "lager", "verfügbar", "médicament", "pharmacie", "disponible",
            "medicamento", "farmacia",
        ];

        Self {
            nursing: nursing.iter().map(|s| s.to_string()).collect(),
            hr: hr.iter().map(|s| s.to_string()).collect(),
            pharmacy: pharmacy.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DomainLexicon {
    /// Count keyword hits per domain for the lowercased query.
    fn scores(&self, lower: &str) -> [(ResponderKind, u32); 3] {
        let count = |keywords: &[String]| -> u32 {
            keywords.iter().filter(|kw| lower.contains(kw.as_str())).count() as u32
        };
        [
            (ResponderKind::Nursing, count(&self.nursing)),
            (ResponderKind::Hr, count(&self.hr)),
            (ResponderKind::Pharmacy, count(&self.pharmacy)),
        ]
    }
}

/// The priority-2 classifier: role map, keyword heuristic, engine fallback.
pub struct DomainClassifier {
    lexicon: DomainLexicon,
    engine: Arc<dyn Engine>,
    model: String,
    default_domain: ResponderKind,
    heuristic_margin: u32,
    engine_timeout: Duration,
}

impl DomainClassifier {
    pub fn new(
        lexicon: DomainLexicon,
        engine: Arc<dyn Engine>,
        model: impl Into<String>,
        default_domain: ResponderKind,
    ) -> Self {
        Self {
            lexicon,
            engine,
            model: model.into(),
            default_domain,
            heuristic_margin: 2,
            engine_timeout: Duration::from_secs(60),
        }
    }

    /// Set the score margin required to accept the heuristic.
    pub fn with_heuristic_margin(mut self, margin: u32) -> Self {
        self.heuristic_margin = margin;
        self
    }

    /// Bound the engine fallback call.
    pub fn with_engine_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout = timeout;
        self
    }

    /// Classify a query into a domain responder.
    ///
    /// Always returns a decision — degradation shows up as
    /// `method: Fallback, confidence: Low`, never as an error.
    pub async fn classify(&self, text: &str, role_override: Option<StaffRole>) -> RoutingDecision {
        // 1. Declared role wins outright; the engine is never consulted.
        if let Some(domain) = role_override.and_then(|r| r.domain()) {
            debug!(role = ?role_override, category = %domain, "Role-mapped routing");
            return RoutingDecision::role_mapped(domain);
        }

        // 2. Keyword heuristic.
        let lower = text.to_lowercase();
        let mut scores = self.lexicon.scores(&lower);
        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (top_domain, top) = scores[0];
        let (_, second) = scores[1];

        if top > 0 && top - second >= self.heuristic_margin {
            info!(category = %top_domain, score = top, "Query classified by keywords");
            return RoutingDecision {
                priority: 2,
                method: RouteMethod::Heuristic,
                category: top_domain,
                confidence: Confidence::High,
            };
        }

        // 3. Engine fallback with a constrained prompt.
        match self.classify_by_engine(text).await {
            Some(category) => {
                info!(category = %category, "Query classified by engine");
                RoutingDecision {
                    priority: 2,
                    method: RouteMethod::EngineClassified,
                    category,
                    confidence: Confidence::High,
                }
            }
            None => {
                warn!(default = %self.default_domain, "Classification degraded to default domain");
                RoutingDecision {
                    priority: 2,
                    method: RouteMethod::Fallback,
                    category: self.default_domain,
                    confidence: Confidence::Low,
                }
            }
        }
    }

    /// One constrained engine call; `None` on any failure, timeout, or
    /// unrecognized label.
    async fn classify_by_engine(&self, text: &str) -> Option<ResponderKind> {
        let prompt = CLASSIFICATION_PROMPT.replace("{query}", text);
        let request = EngineRequest::new(&self.model, vec![Message::user(prompt)])
            .with_temperature(0.1)
            .with_max_tokens(10);

        let response =
            match tokio::time::timeout(self.engine_timeout, self.engine.complete(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(error = %e, "Engine classification failed");
                    return None;
                }
                Err(_) => {
                    warn!("Engine classification timed out");
                    return None;
                }
            };

        let label = response.message.content.trim().to_lowercase();
        ResponderKind::DOMAINS
            .iter()
            .find(|d| label.contains(d.as_str()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wardline_core::{EngineError, EngineResponse};

    /// Scripted engine that counts calls — used to prove short-circuits.
    struct CountingEngine {
        reply: String,
        calls: Mutex<usize>,
        fail: bool,
    }

    impl CountingEngine {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.into(),
                calls: Mutex::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: String::new(),
                calls: Mutex::new(0),
                fail: true,
            })
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Engine for CountingEngine {
        fn name(&self) -> &str {
            "counting_mock"
        }

        async fn complete(&self, _request: EngineRequest) -> Result<EngineResponse, EngineError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(EngineError::Unavailable("mock outage".into()));
            }
            Ok(EngineResponse {
                message: Message::assistant(&self.reply),
                model: "mock-model".into(),
            })
        }
    }

    fn classifier(engine: Arc<CountingEngine>) -> DomainClassifier {
        DomainClassifier::new(
            DomainLexicon::default(),
            engine,
            "mock-model",
            ResponderKind::Hr,
        )
    }

    #[tokio::test]
    async fn role_override_short_circuits_engine() {
        let engine = CountingEngine::replying("nursing");
        let classifier = classifier(engine.clone());

        let decision = classifier
            .classify("What about blood glucose monitoring?", Some(StaffRole::Nurse))
            .await;

        assert_eq!(decision.method, RouteMethod::RoleMapped);
        assert_eq!(decision.category, ResponderKind::Nursing);
        assert_eq!(decision.confidence, Confidence::High);
        assert_eq!(engine.call_count(), 0, "engine fallback must never run");
    }

    #[tokio::test]
    async fn keyword_heuristic_resolves_pharmacy() {
        let engine = CountingEngine::replying("unused");
        let classifier = classifier(engine.clone());

        let decision = classifier.classify("Is ibuprofen in stock?", None).await;

        assert_eq!(decision.method, RouteMethod::Heuristic);
        assert_eq!(decision.category, ResponderKind::Pharmacy);
        assert_eq!(decision.priority, 2);
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn ambiguous_query_falls_through_to_engine() {
        let engine = CountingEngine::replying("nursing");
        let classifier = classifier(engine.clone());

        let decision = classifier.classify("What should I do today?", None).await;

        assert_eq!(decision.method, RouteMethod::EngineClassified);
        assert_eq!(decision.category, ResponderKind::Nursing);
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn unrecognized_label_degrades_to_default() {
        let engine = CountingEngine::replying("astrology");
        let classifier = classifier(engine);

        let decision = classifier.classify("What should I do today?", None).await;

        assert_eq!(decision.method, RouteMethod::Fallback);
        assert_eq!(decision.category, ResponderKind::Hr);
        assert_eq!(decision.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn engine_outage_degrades_to_default() {
        let engine = CountingEngine::failing();
        let classifier = classifier(engine);

        let decision = classifier.classify("What should I do today?", None).await;

        assert_eq!(decision.method, RouteMethod::Fallback);
        assert_eq!(decision.category, ResponderKind::Hr);
    }

    #[tokio::test]
    async fn unknown_role_does_not_short_circuit() {
        let engine = CountingEngine::replying("pharmacy");
        let classifier = classifier(engine.clone());

        let decision = classifier
            .classify("something vague", Some(StaffRole::Unknown))
            .await;

        // Unknown role has no domain mapping — falls through to the engine.
        assert_eq!(decision.method, RouteMethod::EngineClassified);
        assert_eq!(engine.call_count(), 1);
    }
}
