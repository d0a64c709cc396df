//! Query and routing value objects.
//!
//! A [`Query`] enters the orchestrator, a [`RoutingDecision`] comes out
//! attached to every answer. The decision is produced exactly once per query
//! and never mutated — it is the observability record of *why* a responder
//! was chosen.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};

/// An inbound staff question.
///
/// Immutable once constructed; the orchestrator reads it, never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Raw question text.
    pub text: String,

    /// Role the caller declared (not detected — declared).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,

    /// Conversation to continue, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,

    /// Explicit responder override — bypasses all classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responder: Option<ResponderKind>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: None,
            session: None,
            responder: None,
        }
    }

    pub fn with_role(mut self, role: StaffRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_responder(mut self, responder: ResponderKind) -> Self {
        self.responder = Some(responder);
        self
    }
}

/// Detected query language. Informational only — never gates routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    De,
}

impl Language {
    /// Full language name, for display and templated responses.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A staff role, declared by the caller or inferred from vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Nurse,
    Employee,
    Pharmacist,
    Unknown,
}

impl StaffRole {
    /// The domain responder this role maps to directly, if any.
    ///
    /// A known role short-circuits domain classification entirely.
    pub fn domain(&self) -> Option<ResponderKind> {
        match self {
            StaffRole::Nurse => Some(ResponderKind::Nursing),
            StaffRole::Employee => Some(ResponderKind::Hr),
            StaffRole::Pharmacist => Some(ResponderKind::Pharmacy),
            StaffRole::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Nurse => "nurse",
            StaffRole::Employee => "employee",
            StaffRole::Pharmacist => "pharmacist",
            StaffRole::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nurse" => Ok(StaffRole::Nurse),
            "employee" => Ok(StaffRole::Employee),
            "pharmacist" => Ok(StaffRole::Pharmacist),
            other => Err(format!("unknown staff role: {other}")),
        }
    }
}

/// The closed set of responders.
///
/// Dispatch goes through a single exhaustive match in the orchestrator, so
/// adding a variant forces every routing site to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderKind {
    Help,
    Nursing,
    Hr,
    Pharmacy,
    Research,
}

impl ResponderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponderKind::Help => "help",
            ResponderKind::Nursing => "nursing",
            ResponderKind::Hr => "hr",
            ResponderKind::Pharmacy => "pharmacy",
            ResponderKind::Research => "research",
        }
    }

    /// The three classifiable domain categories (help and research are
    /// selected by other mechanisms, never by the domain classifier).
    pub const DOMAINS: [ResponderKind; 3] = [
        ResponderKind::Nursing,
        ResponderKind::Hr,
        ResponderKind::Pharmacy,
    ];
}

impl std::fmt::Display for ResponderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "help" => Ok(ResponderKind::Help),
            "nursing" => Ok(ResponderKind::Nursing),
            "hr" => Ok(ResponderKind::Hr),
            "pharmacy" => Ok(ResponderKind::Pharmacy),
            "research" => Ok(ResponderKind::Research),
            other => Err(format!("unknown responder: {other}")),
        }
    }
}

/// How a routing decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMethod {
    /// Caller forced a responder explicitly.
    Override,
    /// Declared role mapped directly to a domain.
    RoleMapped,
    /// Priority-1 help detector fired.
    HelpDetected,
    /// Keyword heuristic resolved the domain.
    Heuristic,
    /// Engine fallback returned a validated label.
    EngineClassified,
    /// Everything else degraded to the configured default domain.
    Fallback,
}

/// Qualifier attached to a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
    /// Caller said so — not a guess at all.
    Explicit,
}

/// The routing decision for one query. Produced once, immutable, attached to
/// the final result for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// 1 = help tier, 2 = domain tier.
    pub priority: u8,
    pub method: RouteMethod,
    pub category: ResponderKind,
    pub confidence: Confidence,
}

impl RoutingDecision {
    pub fn help_detected() -> Self {
        Self {
            priority: 1,
            method: RouteMethod::HelpDetected,
            category: ResponderKind::Help,
            confidence: Confidence::High,
        }
    }

    pub fn overridden(category: ResponderKind) -> Self {
        Self {
            priority: 2,
            method: RouteMethod::Override,
            category,
            confidence: Confidence::Explicit,
        }
    }

    pub fn role_mapped(category: ResponderKind) -> Self {
        Self {
            priority: 2,
            method: RouteMethod::RoleMapped,
            category,
            confidence: Confidence::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_maps_to_domain() {
        assert_eq!(StaffRole::Nurse.domain(), Some(ResponderKind::Nursing));
        assert_eq!(StaffRole::Employee.domain(), Some(ResponderKind::Hr));
        assert_eq!(StaffRole::Pharmacist.domain(), Some(ResponderKind::Pharmacy));
        assert_eq!(StaffRole::Unknown.domain(), None);
    }

    #[test]
    fn responder_round_trips_through_str() {
        for kind in [
            ResponderKind::Help,
            ResponderKind::Nursing,
            ResponderKind::Hr,
            ResponderKind::Pharmacy,
            ResponderKind::Research,
        ] {
            assert_eq!(ResponderKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(ResponderKind::from_str("billing").is_err());
    }

    #[test]
    fn decision_constructors_set_priority() {
        assert_eq!(RoutingDecision::help_detected().priority, 1);
        assert_eq!(RoutingDecision::overridden(ResponderKind::Hr).priority, 2);
        assert_eq!(
            RoutingDecision::overridden(ResponderKind::Hr).confidence,
            Confidence::Explicit
        );
    }

    #[test]
    fn decision_serializes_with_lowercase_category() {
        let json =
            serde_json::to_string(&RoutingDecision::role_mapped(ResponderKind::Nursing)).unwrap();
        assert!(json.contains("\"nursing\""));
        assert!(json.contains("\"role_mapped\""));
    }
}
