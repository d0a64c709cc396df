//! The reasoning layer of Wardline: the bounded research loop, the
//! per-domain responders, and the orchestrator that ties routing to
//! answering.

pub mod orchestrator;
pub mod research;
pub mod responders;

#[cfg(test)]
mod test_helpers;

pub use orchestrator::{AgentInfo, Answer, Orchestrator};
pub use research::{LoopState, ResearchAgent, ResearchResult};
pub use responders::{help_text, DomainAnswer, DomainResponder};
