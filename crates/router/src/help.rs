//! Priority-1 help-query detection.
//!
//! Two independent strategies combined with OR:
//! 1. explicit-phrase match against a curated cross-language list;
//! 2. compound match: an interrogative opener AND a self-referential noun.
//!
//! Strategy 2 can misfire on domain questions that happen to mention "this
//! chat" — a known trade-off kept as-is, because the help tier is checked
//! before any domain classification, so a false positive costs one
//! clarifying turn rather than a wrong domain answer.

use serde::{Deserialize, Serialize};

/// The phrase lists the detector matches against.
///
/// Constructed explicitly and passed in at build time so tests can
/// substitute smaller sets; `Default` carries the curated en/es/fr/de lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpLexicon {
    /// Canonical "how do I use this" phrasings
    pub phrases: Vec<String>,

    /// Interrogative openers for the compound match
    pub question_words: Vec<String>,

    /// Self-referential nouns for the compound match
    pub system_refs: Vec<String>,
}

impl Default for HelpLexicon {
    fn default() -> Self {
        let phrases = [
            // English
            "how to use",
            "how do i use",
            "how can i use",
            "what can i ask",
            "what questions can i ask",
            "can i check",
            "can i find",
            "can i get",
            "how does this work",
            "how does this tool work",
            "what is this",
            "what does this do",
            "help me",
            "guide me",
            "show me how",
            // Spanish
            "cómo usar",
            "cómo puedo usar",
            "cómo utilizar",
            "qué preguntas puedo",
            "qué puedo preguntar",
            "puedo consultar",
            "puedo verificar",
            "cómo funciona",
            "ayúdame",
            "guíame",
            // French
            "comment utiliser",
            "comment puis-je utiliser",
            "quelles questions puis-je",
            "que puis-je demander",
            "puis-je vérifier",
            "puis-je consulter",
            "comment ça marche",
            "aidez-moi",
            "guidez-moi",
            // German
            "wie benutze",
            "wie kann ich",
            "wie verwende",
            "welche fragen kann ich",
            "was kann ich fragen",
            "kann ich prüfen",
            "kann ich überprüfen",
            "wie funktioniert",
            "hilf mir",
            "zeig mir",
        ];

        let question_words = [
            "how", "what", "can", "cómo", "qué", "puedo", "comment", "que", "puis-je", "wie",
            "was", "kann",
        ];

        let system_refs = [
            "system", "tool", "chat", "chatbot", "assistant", "sistema", "herramienta",
            "asistente", "système", "outil", "werkzeug",
        ];

        Self {
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
            question_words: question_words.iter().map(|s| s.to_string()).collect(),
            system_refs: system_refs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The priority-1 gate: is this query asking how to use the system?
///
/// Pure, deterministic, case-insensitive, total.
#[derive(Debug, Clone)]
pub struct HelpDetector {
    lexicon: HelpLexicon,
}

impl HelpDetector {
    pub fn new(lexicon: HelpLexicon) -> Self {
        Self { lexicon }
    }

    pub fn is_help_query(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        // Strategy 1: explicit phrase
        if self.lexicon.phrases.iter().any(|p| lower.contains(p)) {
            return true;
        }

        // Strategy 2: interrogative opener + self-referential noun.
        // Question words match whole tokens; system refs match substrings.
        let has_question = lower
            .split_whitespace()
            .any(|word| self.lexicon.question_words.iter().any(|q| q == word));
        let has_system_ref = self.lexicon.system_refs.iter().any(|r| lower.contains(r));

        has_question && has_system_ref
    }
}

impl Default for HelpDetector {
    fn default() -> Self {
        Self::new(HelpLexicon::default())
    }
}
