//! Query routing for Wardline: language/role detection and the two-tier
//! classifier (help gate first, then domain).
//!
//! Everything here is either a pure function over the query text or a
//! classifier that degrades gracefully — classification never returns an
//! error to the caller.

pub mod domain;
pub mod help;
pub mod language;

pub use domain::{DomainClassifier, DomainLexicon};
pub use help::{HelpDetector, HelpLexicon};
pub use language::{detect, detect_role};
