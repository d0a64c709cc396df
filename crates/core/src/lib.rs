//! # Wardline Core
//!
//! Domain types, traits, and error definitions for the Wardline hospital
//! staff assistant. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (reasoning engine, retrieval backend, lookup
//! tool) is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted mock engines and seeded backends
//! - Clean dependency graph (all crates depend inward on core)

pub mod engine;
pub mod error;
pub mod message;
pub mod query;
pub mod retrieval;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use engine::{Engine, EngineRequest, EngineResponse, ToolDeclaration};
pub use error::{EngineError, Error, Result, RetrievalError, SessionError, ToolError};
pub use message::{Message, MessageToolCall, Role};
pub use query::{Confidence, Language, Query, ResponderKind, RouteMethod, RoutingDecision, StaffRole};
pub use retrieval::{Passage, SearchBackend};
pub use session::{ConversationSession, SessionId, Turn};
pub use tool::{Tool, ToolCall, ToolCallRecord, ToolOutput, ToolRegistry};
