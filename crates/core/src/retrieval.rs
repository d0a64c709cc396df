//! Retrieval backend trait — ranked, cited passages for a text query.
//!
//! Ranking is opaque: given text, a backend returns passages with source
//! citations. Implementations live in `wardline-retrieval` (seeded in-memory
//! index, HTTP client).

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A ranked passage with its source citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Document title
    pub title: String,

    /// The retrieved text
    pub snippet: String,

    /// Source identifier for citation
    pub source: String,

    /// Backend-assigned relevance score (higher is better)
    pub score: f32,
}

/// A per-domain document search capability.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// A human-readable name for this backend.
    fn name(&self) -> &str;

    /// Return ranked passages for the query, best first.
    async fn search(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}
