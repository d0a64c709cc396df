//! Help and domain responders.
//!
//! The help responder is fully templated — no engine, no I/O. Domain
//! responders retrieve passages from their search backend and ask the
//! engine to synthesize a grounded answer; when the engine is unreachable
//! they degrade to quoting the passages directly rather than failing.

use std::sync::Arc;
use tracing::warn;
use wardline_core::{
    Engine, EngineRequest, Language, Message, Passage, ResponderKind, SearchBackend, StaffRole,
    Turn,
};

/// How many prior turns are carried into the synthesis prompt.
const HISTORY_TURNS: usize = 4;

/// The templated usage guide, varied by language and the caller's role.
pub fn help_text(role: StaffRole, language: Language) -> String {
    let role_hint = match (role, language) {
        (StaffRole::Nurse, Language::En) => "As a nurse you will mostly want protocol questions.",
        (StaffRole::Nurse, Language::Es) => {
            "Como enfermera, probablemente le interesen los protocolos."
        }
        (StaffRole::Nurse, Language::Fr) => {
            "En tant qu'infirmier(ère), les protocoles vous seront les plus utiles."
        }
        (StaffRole::Nurse, Language::De) => {
            "Als Pflegekraft sind die Protokollfragen am relevantesten."
        }
        (StaffRole::Pharmacist, Language::En) => {
            "As a pharmacist you can query stock levels directly."
        }
        (StaffRole::Pharmacist, Language::Es) => {
            "Como farmacéutico, puede consultar el inventario directamente."
        }
        (StaffRole::Pharmacist, Language::Fr) => {
            "En tant que pharmacien, vous pouvez interroger les stocks directement."
        }
        (StaffRole::Pharmacist, Language::De) => {
            "Als Apotheker können Sie die Lagerbestände direkt abfragen."
        }
        _ => "",
    };

    let body = match language {
        Language::En => {
            "I am the hospital staff assistant. You can ask me about:\n\
             \n\
             - Nursing protocols and clinical procedures (\"How do I insert an IV?\")\n\
             - HR policies, leave, and benefits (\"How many vacation days do I have?\")\n\
             - Pharmacy inventory and medications (\"Is ibuprofen in stock?\")\n\
             - Cross-domain research (\"Can Juan de Marco take amoxicillin?\")\n\
             \n\
             Ask in English, Spanish, French, or German."
        }
        Language::Es => {
            "Soy el asistente del personal del hospital. Puede preguntarme sobre:\n\
             \n\
             - Protocolos de enfermería y procedimientos clínicos\n\
             - Políticas de RRHH, vacaciones y beneficios\n\
             - Inventario de farmacia y medicamentos\n\
             - Investigación entre áreas (pacientes, protocolos e inventario)\n\
             \n\
             Puede preguntar en español, inglés, francés o alemán."
        }
        Language::Fr => {
            "Je suis l'assistant du personnel hospitalier. Vous pouvez me demander :\n\
             \n\
             - Protocoles de soins infirmiers et procédures cliniques\n\
             - Politiques RH, congés et avantages\n\
             - Inventaire de la pharmacie et médicaments\n\
             - Recherches croisées (patients, protocoles, stocks)\n\
             \n\
             Posez vos questions en français, anglais, espagnol ou allemand."
        }
        Language::De => {
            "Ich bin der Assistent für das Krankenhauspersonal. Sie können mich fragen zu:\n\
             \n\
             - Pflegeprotokollen und klinischen Verfahren\n\
             - Personalrichtlinien, Urlaub und Leistungen\n\
             - Apothekenbestand und Medikamenten\n\
             - Bereichsübergreifender Recherche (Patienten, Protokolle, Bestände)\n\
             \n\
             Fragen Sie auf Deutsch, Englisch, Spanisch oder Französisch."
        }
    };

    if role_hint.is_empty() {
        body.to_string()
    } else {
        format!("{body}\n\n{role_hint}")
    }
}

/// What a domain responder produces: the answer plus the sources of the
/// passages it was grounded on.
#[derive(Debug, Clone)]
pub struct DomainAnswer {
    pub text: String,
    pub citations: Vec<String>,
}

impl DomainAnswer {
    fn ungrounded(text: String) -> Self {
        Self {
            text,
            citations: Vec::new(),
        }
    }
}

/// A retrieval-grounded responder for one domain.
pub struct DomainResponder {
    kind: ResponderKind,
    backend: Arc<dyn SearchBackend>,
    engine: Arc<dyn Engine>,
    model: String,
}

impl DomainResponder {
    pub fn new(
        kind: ResponderKind,
        backend: Arc<dyn SearchBackend>,
        engine: Arc<dyn Engine>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            backend,
            engine,
            model: model.into(),
        }
    }

    pub fn kind(&self) -> ResponderKind {
        self.kind
    }

    /// Answer a query, with the conversation so far for follow-up context.
    /// Infallible: retrieval and engine failures degrade, they never
    /// propagate.
    pub async fn answer(&self, text: &str, history: &[Turn]) -> DomainAnswer {
        let passages = match self.backend.search(text).await {
            Ok(passages) => passages,
            Err(e) => {
                warn!(domain = %self.kind, error = %e, "Retrieval failed");
                Vec::new()
            }
        };

        if passages.is_empty() {
            return DomainAnswer::ungrounded(format!(
                "I could not find anything in the {} documents for that question. \
                 Try rephrasing, or contact the {} department directly.",
                self.kind, self.kind
            ));
        }

        let mut citations: Vec<String> = Vec::new();
        for passage in &passages {
            if !citations.contains(&passage.source) {
                citations.push(passage.source.clone());
            }
        }

        let text = match self.synthesize(text, history, &passages).await {
            Some(answer) => answer,
            None => extractive_answer(self.kind, &passages),
        };

        DomainAnswer { text, citations }
    }

    /// Ask the engine for a grounded synthesis. `None` on any failure.
    async fn synthesize(
        &self,
        question: &str,
        history: &[Turn],
        passages: &[Passage],
    ) -> Option<String> {
        let context = passages
            .iter()
            .map(|p| format!("[{}] {}\n{}", p.source, p.title, p.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut prompt = String::new();
        if !history.is_empty() {
            let skip = history.len().saturating_sub(HISTORY_TURNS);
            prompt.push_str("Conversation so far:\n");
            for turn in &history[skip..] {
                prompt.push_str(&format!(
                    "Staff: {}\nAssistant: {}\n",
                    turn.query, turn.answer
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!(
            "Answer the staff member's question using ONLY the passages below. \
             Quote specific numbers and requirements where they appear. If the \
             passages do not contain the answer, say so.\n\n\
             Passages:\n{context}\n\nQuestion: {question}"
        ));

        let request = EngineRequest::new(&self.model, vec![Message::user(prompt)]);
        match self.engine.complete(request).await {
            Ok(response) if !response.message.content.trim().is_empty() => {
                Some(response.message.content)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(domain = %self.kind, error = %e, "Synthesis failed, degrading to passages");
                None
            }
        }
    }
}

/// The degraded answer: quote the retrieved passages verbatim.
fn extractive_answer(kind: ResponderKind, passages: &[Passage]) -> String {
    let quoted = passages
        .iter()
        .map(|p| format!("• {} — {}", p.title, p.snippet))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "The assistant is running in degraded mode; here is what the {kind} \
         documents say:\n\n{quoted}"
    )
}
