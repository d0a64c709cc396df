//! HTTP search backend for remote document stores.
//!
//! Posts the query to a configured endpoint and expects a JSON body of
//! ranked results. Transport failures map to `Unavailable`, bad statuses
//! and unparsable bodies to `QueryFailed` — callers degrade, they don't
//! retry here.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use wardline_core::{Passage, RetrievalError, SearchBackend};

pub struct HttpSearchBackend {
    name: String,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSearchBackend {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RetrievalError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    snippet: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    score: f32,
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        debug!(backend = %self.name, query, "Remote search");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query, "limit": 5 }))
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::QueryFailed(format!(
                "search endpoint returned {status}"
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::QueryFailed(format!("unparsable search response: {e}")))?;

        Ok(body
            .results
            .into_iter()
            .map(|hit| Passage {
                title: hit.title,
                snippet: hit.snippet,
                source: hit.source,
                score: hit.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_search_response() {
        let data = r#"{
            "results": [
                {"title": "IV Insertion Protocol", "snippet": "Peripheral IV...", "source": "protocols/iv", "score": 0.92},
                {"title": "Wound Care", "snippet": "Assess the wound...", "score": 0.41}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title, "IV Insertion Protocol");
        assert!(parsed.results[1].source.is_empty());
    }

    #[test]
    fn parse_empty_response() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_empty());
    }
}
