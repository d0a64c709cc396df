//! Lookup tools for the Wardline research loop.
//!
//! All tools are read-only: they look things up and report. The registry
//! built by [`research_registry`] is the complete tool surface the engine
//! sees during a research invocation.

pub mod inventory_search;
pub mod patient_lookup;
pub mod protocol_search;

pub use inventory_search::InventorySearchTool;
pub use patient_lookup::PatientLookupTool;
pub use protocol_search::ProtocolSearchTool;

use std::sync::Arc;
use wardline_core::{SearchBackend, ToolRegistry};

/// Build the standard research registry: patient lookup plus the two
/// search-backed tools.
pub fn research_registry(
    protocols: Arc<dyn SearchBackend>,
    inventory: Arc<dyn SearchBackend>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(PatientLookupTool::with_demo_records()));
    registry.register(Box::new(ProtocolSearchTool::new(protocols)));
    registry.register(Box::new(InventorySearchTool::new(inventory)));
    registry
}
