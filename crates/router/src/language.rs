//! Language and role detection.
//!
//! Pure, deterministic, total functions: ordered keyword/diacritic matching
//! with an English fallback. No I/O, no failure path. The detected language
//! is informational only and never gates routing.

use wardline_core::{Language, StaffRole};

/// Detect the language of a query.
///
/// Patterns are checked in order — Spanish first because its inverted
/// punctuation is unambiguous, then French, then German. Anything
/// unmatched is English.
pub fn detect(text: &str) -> Language {
    let lower = text.to_lowercase();

    const SPANISH: &[&str] = &[
        "¿", "¡", "cómo", "cuál", "cuántos", "qué", "puedo", "usar", "días", "festivos",
    ];
    const FRENCH: &[&str] = &[
        "comment", "puis-je", "utiliser", "système", "combien", "congé", "médicament",
    ];
    const GERMAN: &[&str] = &[
        "wie", "kann ich", "benutzen", "verfügbar", "auf lager", "urlaub", "medikament",
    ];

    if SPANISH.iter().any(|w| lower.contains(w)) {
        Language::Es
    } else if FRENCH.iter().any(|w| lower.contains(w)) {
        Language::Fr
    } else if GERMAN.iter().any(|w| lower.contains(w)) {
        Language::De
    } else {
        Language::En
    }
}

/// Infer a staff role from role-indicative vocabulary.
///
/// Returns [`StaffRole::Unknown`] when nothing matches. Checked in the same
/// order the original routing favored: clinical vocabulary first, then
/// pharmacy, then HR.
pub fn detect_role(text: &str) -> StaffRole {
    let lower = text.to_lowercase();

    const NURSE: &[&str] = &[
        "nurse", "nursing", "enfermera", "enfermería", "infirmier", "infirmière",
        "krankenschwester", "pflege", "patient", "clinical",
    ];
    const PHARMACIST: &[&str] = &[
        "pharmacist", "pharmacy", "farmacia", "pharmacie", "apotheke", "apotheker",
        "medication", "drug", "inventory", "stock",
    ];
    const EMPLOYEE: &[&str] = &[
        "employee", "hr", "vacation", "holiday", "leave", "benefits", "empleado",
        "vacaciones", "congé", "urlaub", "mitarbeiter",
    ];

    if NURSE.iter().any(|w| lower.contains(w)) {
        StaffRole::Nurse
    } else if PHARMACIST.iter().any(|w| lower.contains(w)) {
        StaffRole::Pharmacist
    } else if EMPLOYEE.iter().any(|w| lower.contains(w)) {
        StaffRole::Employee
    } else {
        StaffRole::Unknown
    }
}
